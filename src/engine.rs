//! Stateful front end that ties generation, conversion, analysis, history, and persistence
//! together.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::history::{HistoryLog, HistoryRecord, Operation, Output};
use crate::namespace::{self, Namespace};
use crate::store::{MemoryStore, Store, StoreError, FAVORITES_KEY, HISTORY_KEY, SETTINGS_KEY};
use crate::telemetry::{EventSink, NoopSink, Properties};
use crate::{
    analyze_uuid, convert_uuid, export_uuids, validate_uuid, AnalysisResult, Components,
    ConvertOptions, Error, Export, ExportFormat, Format, GenerateOptions, GenerationMetadata,
    Generator, RandSource, RandomSource, Result, Settings, SettingsPatch, StdSystemTime,
    TimeSource, Uuid, ValidationResult, Variant, Version,
};

/// Number of generated values the engine keeps in memory.
pub const GENERATED_CAPACITY: usize = 100;

/// A single value produced by [`Engine::generate`].
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedIdentifier {
    pub id: String,
    /// The value in the requested format.
    pub value: String,
    pub uuid: Uuid,
    pub version: Version,
    pub variant: Variant,
    pub format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub metadata: GenerationMetadata,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

/// Inputs to [`Engine::generate`]. Unset fields fall back to [`Settings`].
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub version: Option<Version>,
    pub format: Option<Format>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub node: Option<String>,
    pub sequential: bool,
}

impl GenerateRequest {
    pub fn new(version: Version) -> Self {
        Self {
            version: Some(version),
            ..Default::default()
        }
    }
}

/// Inputs to [`Engine::generate_bulk`].
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkOptions {
    /// Defaults to [`Settings::default_count`].
    pub count: Option<usize>,
    pub version: Option<Version>,
    pub format: Option<Format>,
    pub namespace: Option<String>,
    /// Item `i` (1-based) is named `<prefix>_<i>`.
    pub name_prefix: Option<String>,
    pub sequential: bool,
    pub custom_node: Option<String>,
}

/// Owns a generator together with its history, favorites, settings, store, and event sink.
///
/// Operation errors are returned to the caller and recorded in the history. Failures of the
/// store or the event sink are logged and surface only through [`Engine::last_error`].
///
/// # Examples
///
/// ```rust
/// use uuidkit::{Engine, GenerateRequest, Version};
///
/// let mut engine = Engine::detect();
/// let item = engine.generate(&GenerateRequest::new(Version::V7))?;
/// assert!(item.is_valid);
/// assert_eq!(engine.history().len(), 1);
/// # Ok::<(), uuidkit::Error>(())
/// ```
pub struct Engine<R = RandomSource, T = StdSystemTime> {
    generator: Generator<R, T>,
    generated: VecDeque<GeneratedIdentifier>,
    history: HistoryLog,
    favorites: Vec<String>,
    settings: Settings,
    store: Box<dyn Store>,
    sink: Box<dyn EventSink>,
    last_error: Option<String>,
    sequence: u64,
}

impl Engine {
    /// Creates an engine with the best available random source, an in-memory store, and no
    /// telemetry.
    pub fn detect() -> Self {
        Self::new(Generator::new(RandomSource::detect()))
    }
}

impl<R: RandSource, T: TimeSource> Engine<R, T> {
    pub fn new(generator: Generator<R, T>) -> Self {
        let settings = Settings::default();
        Self {
            generator,
            generated: VecDeque::with_capacity(GENERATED_CAPACITY),
            history: HistoryLog::new(settings.history_limit),
            favorites: Vec::new(),
            settings,
            store: Box::new(MemoryStore::new()),
            sink: Box::new(NoopSink),
            last_error: None,
            sequence: 0,
        }
    }

    pub fn with_store(mut self, store: impl Store + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Restores settings, history, and favorites from the store.
    ///
    /// Missing or unreadable entries leave the current state in place.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&mut self) {
        if let Some(settings) = self.read::<Settings>(SETTINGS_KEY) {
            match settings.check() {
                Ok(()) => self.settings = settings,
                Err(err) => self.report(&format!("Ignoring stored settings: {err}")),
            }
        }
        let limit = self.settings.history_limit;
        match self.read::<Vec<HistoryRecord>>(HISTORY_KEY) {
            Some(records) => self.history = HistoryLog::from_records(records, limit),
            None => self.history.set_limit(limit),
        }
        if let Some(favorites) = self.read::<Vec<String>>(FAVORITES_KEY) {
            self.favorites = favorites;
        }
        debug!(
            history = self.history.len(),
            favorites = self.favorites.len(),
            "loaded engine state"
        );
    }

    /// Generates one identifier, filling unset request fields from the settings.
    #[instrument(level = "debug", skip_all, fields(version = ?request.version))]
    pub fn generate(&mut self, request: &GenerateRequest) -> Result<GeneratedIdentifier> {
        let version = request.version.unwrap_or(self.settings.default_version);
        let format = request.format.unwrap_or(self.settings.default_format);
        match self.generate_one(version, format, request) {
            Ok(item) => {
                self.generated.push_front(item.clone());
                self.generated.truncate(GENERATED_CAPACITY);
                self.record(
                    HistoryRecord::new(Operation::Generate, Output::One(item.value.clone()), 1)
                        .with_version(version.number())
                        .with_format(format),
                );
                self.track(
                    "uuid_generated",
                    json!({ "version": version, "format": format, "method": item.metadata.method }),
                );
                debug!(value = %item.value, "generated");
                Ok(item)
            }
            Err(err) => Err(self.fail(Operation::Generate, None, err)),
        }
    }

    fn generate_one(
        &mut self,
        version: Version,
        format: Format,
        request: &GenerateRequest,
    ) -> Result<GeneratedIdentifier> {
        let options = GenerateOptions {
            namespace: request
                .namespace
                .clone()
                .or_else(|| self.settings.custom_namespace.clone()),
            name: request.name.clone(),
            node: request
                .node
                .clone()
                .or_else(|| self.settings.custom_node.clone()),
            sequential: request.sequential,
        };
        let (uuid, metadata) = self.generator.generate(version, &options)?;
        let value = uuid.format(format);
        let is_valid = !self.settings.auto_validate || validate_uuid(&value).is_valid;

        let now = Utc::now();
        self.sequence += 1;
        Ok(GeneratedIdentifier {
            id: format!("uuid_{}_{}", now.timestamp_millis(), self.sequence),
            value,
            uuid,
            version,
            variant: uuid.variant(),
            format,
            timestamp: self.settings.include_timestamp.then_some(now),
            metadata,
            is_valid,
            components: self.settings.show_metadata.then(|| uuid.components()),
        })
    }

    /// Generates `count` identifiers one after another, stopping at the first failure.
    ///
    /// Requests for zero values or above [`Settings::max_bulk_generation`] fail before anything
    /// is generated.
    #[instrument(level = "debug", skip_all, fields(count = ?options.count))]
    pub fn generate_bulk(&mut self, options: &BulkOptions) -> Result<Vec<GeneratedIdentifier>> {
        let count = options.count.unwrap_or(self.settings.default_count);
        let limit = self.settings.max_bulk_generation;
        if count == 0 {
            let err = Error::InvalidArgument("count must be at least 1".to_owned());
            return Err(self.fail(Operation::Generate, None, err));
        }
        if count > limit {
            let err = Error::LimitExceeded {
                requested: count,
                limit,
            };
            return Err(self.fail(Operation::Generate, None, err));
        }

        let version = options.version.unwrap_or(self.settings.default_version);
        let format = options.format.unwrap_or(self.settings.default_format);
        let mut items = Vec::with_capacity(count);
        for i in 1..=count {
            let request = GenerateRequest {
                version: Some(version),
                format: Some(format),
                namespace: options.namespace.clone(),
                name: options.name_prefix.as_ref().map(|p| format!("{p}_{i}")),
                node: options.custom_node.clone(),
                sequential: options.sequential,
            };
            items.push(self.generate(&request)?);
        }

        let values = items.iter().map(|e| e.value.clone()).collect();
        self.record(
            HistoryRecord::new(Operation::Generate, Output::Many(values), count)
                .with_version(version.number())
                .with_format(format),
        );
        self.track(
            "bulk_uuid_generated",
            json!({ "count": count, "version": version, "format": format }),
        );
        Ok(items)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn validate(&mut self, input: &str) -> ValidationResult {
        let result = validate_uuid(input);
        let mut record = match result.version {
            Some(version) if result.is_valid => HistoryRecord::new(
                Operation::Validate,
                Output::One(format!("Valid v{version} UUID")),
                1,
            )
            .with_version(version),
            _ => {
                let mut record = HistoryRecord::failure(Operation::Validate, result.errors.join("; "));
                record.output = Output::One("Invalid UUID".to_owned());
                record.count = 1;
                record
            }
        };
        record = record.with_input(input).with_format(result.format);
        self.record(record);
        self.track(
            "uuid_validated",
            json!({ "isValid": result.is_valid, "version": result.version, "format": result.format }),
        );
        result
    }

    #[instrument(level = "debug", skip(self))]
    pub fn convert(&mut self, input: &str, options: &ConvertOptions) -> Result<String> {
        match convert_uuid(input, options) {
            Ok(converted) => {
                self.record(
                    HistoryRecord::new(Operation::Convert, Output::One(converted.clone()), 1)
                        .with_input(input)
                        .with_format(options.target_format),
                );
                self.track(
                    "uuid_converted",
                    json!({
                        "sourceFormat": crate::detect_format(input),
                        "targetFormat": options.target_format,
                    }),
                );
                Ok(converted)
            }
            Err(err) => Err(self.fail(Operation::Convert, Some(input), err)),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn analyze(&mut self, input: &str) -> Result<AnalysisResult> {
        match analyze_uuid(input) {
            Ok(analysis) => {
                self.record(
                    HistoryRecord::new(Operation::Analyze, Output::One(analysis.uuid.clone()), 1)
                        .with_input(input)
                        .with_version(analysis.version)
                        .with_format(analysis.format),
                );
                self.track(
                    "uuid_analyzed",
                    json!({
                        "version": analysis.version,
                        "securityScore": analysis.security.entropy_bits,
                        "entropyScore": analysis.entropy.quality_score,
                    }),
                );
                Ok(analysis)
            }
            Err(err) => Err(self.fail(Operation::Analyze, Some(input), err)),
        }
    }

    /// Adds the canonical form of `input` to the favorites. Returns `false` if already present.
    pub fn add_favorite(&mut self, input: &str) -> Result<bool> {
        let canonical = self.canonical(input)?;
        if self.favorites.contains(&canonical) {
            return Ok(false);
        }
        self.favorites.push(canonical.clone());
        self.save_favorites();
        self.track("uuid_favorited", json!({ "uuid": canonical }));
        Ok(true)
    }

    /// Removes the canonical form of `input` from the favorites. Returns `false` if absent.
    pub fn remove_favorite(&mut self, input: &str) -> Result<bool> {
        let canonical = self.canonical(input)?;
        let Some(index) = self.favorites.iter().position(|e| *e == canonical) else {
            return Ok(false);
        };
        self.favorites.remove(index);
        self.save_favorites();
        self.track("uuid_unfavorited", json!({ "uuid": canonical }));
        Ok(true)
    }

    /// Renders `values` in `format`, or in [`Settings::export_format`] when `None`.
    pub fn export(&mut self, values: &[String], format: Option<ExportFormat>) -> Result<Export> {
        let format = format.unwrap_or(self.settings.export_format);
        let export = export_uuids(values, format, Utc::now())?;
        self.track(
            "uuids_exported",
            json!({ "format": format, "count": values.len() }),
        );
        Ok(export)
    }

    /// Applies a validated partial update and persists the result.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<&Settings> {
        self.settings = self.settings.patched(patch)?;
        let before = self.history.len();
        self.history.set_limit(self.settings.history_limit);
        if self.history.len() < before {
            self.save(HISTORY_KEY, self.history.to_json());
        }
        self.save(SETTINGS_KEY, serde_json::to_string(&self.settings));

        let changes: Vec<String> = match serde_json::to_value(patch) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k)
                .collect(),
            _ => Vec::new(),
        };
        self.track("settings_updated", json!({ "changes": changes }));
        Ok(&self.settings)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.save(HISTORY_KEY, self.history.to_json());
        self.track("history_cleared", json!({}));
    }

    pub fn standard_namespaces(&self) -> &'static [Namespace] {
        &namespace::STANDARD
    }

    /// Returns whether generation draws from the operating-system random source.
    pub fn is_randomness_secure(&self) -> bool {
        self.generator.is_secure()
    }

    /// Generated values, newest first.
    pub fn generated(&self) -> impl Iterator<Item = &GeneratedIdentifier> {
        self.generated.iter()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Message of the most recent failure, if not yet cleared.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn canonical(&self, input: &str) -> Result<String> {
        let validation = validate_uuid(input);
        match validation.uuid {
            Some(uuid) => Ok(uuid.to_string()),
            None => Err(Error::InvalidIdentifier(format!("'{input}' is not a valid UUID"))),
        }
    }

    fn record(&mut self, record: HistoryRecord) {
        self.history.push(record);
        self.save(HISTORY_KEY, self.history.to_json());
    }

    fn fail(&mut self, operation: Operation, input: Option<&str>, err: Error) -> Error {
        debug!(?operation, %err, "operation failed");
        let mut record = HistoryRecord::failure(operation, &err);
        record.input = input.map(str::to_owned);
        self.record(record);
        self.last_error = Some(err.to_string());
        err
    }

    fn save_favorites(&mut self) {
        self.save(FAVORITES_KEY, serde_json::to_string(&self.favorites));
    }

    fn save(&mut self, key: &str, json: serde_json::Result<String>) {
        let result = json
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(key, &json));
        if let Err(err) = result {
            self.report(&format!("Failed to save {key}: {err}"));
        }
    }

    fn read<V: serde::de::DeserializeOwned>(&mut self, key: &str) -> Option<V> {
        let result = self.store.get(key).and_then(|stored| {
            stored
                .map(|json| serde_json::from_str(&json))
                .transpose()
                .map_err(StoreError::from)
        });
        match result {
            Ok(value) => value,
            Err(err) => {
                self.report(&format!("Failed to load {key}: {err}"));
                None
            }
        }
    }

    fn track(&mut self, event: &str, properties: Value) {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        if let Err(err) = self.sink.emit(event, &properties) {
            self.report(&err.to_string());
        }
    }

    fn report(&mut self, message: &str) {
        warn!("{message}");
        self.last_error = Some(message.to_owned());
    }
}

#[cfg(test)]
mod tests;
