//! User preferences applied to engine operations.

use serde::{Deserialize, Serialize};

use crate::{namespace, parse_node, Error, ExportFormat, Format, Result, Version};

/// Persisted preferences. Missing fields take their default when loaded.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_version: Version,
    pub default_format: Format,
    pub default_count: usize,
    /// Upper bound on a single bulk request.
    pub max_bulk_generation: usize,
    /// Validate each generated value before returning it.
    pub auto_validate: bool,
    /// Attach components to generated values.
    pub show_metadata: bool,
    /// Attach a creation timestamp to generated values.
    pub include_timestamp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_node: Option<String>,
    pub export_format: ExportFormat,
    /// Maximum number of history records kept.
    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_version: Version::V4,
            default_format: Format::Standard,
            default_count: 1,
            max_bulk_generation: 1000,
            auto_validate: true,
            show_metadata: true,
            include_timestamp: true,
            custom_namespace: None,
            custom_node: None,
            export_format: ExportFormat::Json,
            history_limit: 500,
        }
    }
}

/// A partial update to [`Settings`]. `None` leaves a field unchanged; an empty
/// `custom_namespace` or `custom_node` clears it.
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub default_version: Option<Version>,
    pub default_format: Option<Format>,
    pub default_count: Option<usize>,
    pub max_bulk_generation: Option<usize>,
    pub auto_validate: Option<bool>,
    pub show_metadata: Option<bool>,
    pub include_timestamp: Option<bool>,
    pub custom_namespace: Option<String>,
    pub custom_node: Option<String>,
    pub export_format: Option<ExportFormat>,
    pub history_limit: Option<usize>,
}

impl Settings {
    /// Returns a copy with `patch` applied, or an error naming the first invalid field.
    pub fn patched(&self, patch: &SettingsPatch) -> Result<Self> {
        let mut next = self.clone();
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = &patch.$field {
                    next.$field = value.clone();
                })*
            };
        }
        merge!(
            default_version,
            default_format,
            default_count,
            max_bulk_generation,
            auto_validate,
            show_metadata,
            include_timestamp,
            export_format,
            history_limit
        );
        if let Some(ns) = &patch.custom_namespace {
            next.custom_namespace = (!ns.trim().is_empty()).then(|| ns.trim().to_owned());
        }
        if let Some(node) = &patch.custom_node {
            next.custom_node = (!node.trim().is_empty()).then(|| node.trim().to_owned());
        }
        next.check()?;
        Ok(next)
    }

    /// Checks the invariants between fields.
    pub fn check(&self) -> Result<()> {
        if self.max_bulk_generation == 0 {
            return Err(Error::InvalidArgument(
                "maxBulkGeneration must be at least 1".to_owned(),
            ));
        }
        if self.default_count == 0 || self.default_count > self.max_bulk_generation {
            return Err(Error::InvalidArgument(format!(
                "defaultCount must be between 1 and {}",
                self.max_bulk_generation
            )));
        }
        if self.history_limit == 0 {
            return Err(Error::InvalidArgument(
                "historyLimit must be at least 1".to_owned(),
            ));
        }
        if let Some(ns) = &self.custom_namespace {
            namespace::resolve(ns)?;
        }
        if let Some(node) = &self.custom_node {
            parse_node(node)?;
        }
        Ok(())
    }
}
