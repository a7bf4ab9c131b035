//! Validation and parsing of identifiers given in any supported format.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::analysis::{entropy_bits, estimate_collision_probability, timing_info, TimingInfo};
use crate::{detect_format, normalize_uuid, Components, Format, Uuid, Variant};

const CANONICAL_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-7][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

fn canonical_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(CANONICAL_PATTERN).ok())
        .as_ref()
}

/// Outcome of [`validate_uuid`]. Never an error: problems are listed in `errors`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub format: Format,
    /// The input after [`normalize_uuid`], whether or not it is valid.
    pub normalized: String,
    #[serde(skip)]
    pub uuid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ValidationMetadata>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Version-specific facts attached to a valid identifier.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationMetadata {
    /// v1 and v6.
    Timing(TimingInfo),
    /// v4.
    #[serde(rename_all = "camelCase")]
    Randomness {
        entropy_bits: u32,
        collision_probability: String,
    },
    /// v7.
    #[serde(rename_all = "camelCase")]
    Timestamp {
        unix_ts_ms: u64,
        datetime: Option<DateTime<Utc>>,
        random_bits: u32,
    },
}

/// Validates `input` after detecting its format and normalizing it.
///
/// # Examples
///
/// ```rust
/// use uuidkit::{validate_uuid, Format};
///
/// let result = validate_uuid("{886313E1-3B8A-5372-9B90-0C9AEE199E5D}");
/// assert!(result.is_valid);
/// assert_eq!(result.format, Format::Braces);
/// assert_eq!(result.version, Some(5));
///
/// let result = validate_uuid("886313e1-3b8a-5372-9b90");
/// assert!(!result.is_valid);
/// assert_eq!(result.errors, ["Invalid UUID format"]);
/// ```
pub fn validate_uuid(input: &str) -> ValidationResult {
    let normalized = normalize_uuid(input);
    let mut result = ValidationResult {
        is_valid: false,
        format: detect_format(input),
        normalized,
        uuid: None,
        version: None,
        variant: None,
        components: None,
        metadata: None,
        errors: Vec::new(),
        warnings: Vec::new(),
        suggestions: Vec::new(),
    };

    let matched = canonical_pattern().is_some_and(|re| re.is_match(&result.normalized));
    let parsed = matched.then(|| result.normalized.parse::<Uuid>().ok()).flatten();
    let Some(uuid) = parsed else {
        result.errors.push("Invalid UUID format".to_owned());
        result.suggestions = suggestions(&result.normalized);
        return result;
    };

    let version = uuid.version();
    result.is_valid = true;
    result.uuid = Some(uuid);
    result.version = Some(version);
    result.variant = Some(uuid.variant());
    result.components = Some(uuid.components());

    match version {
        1 | 6 => result.metadata = timing_info(&uuid).map(ValidationMetadata::Timing),
        3 | 5 => result
            .warnings
            .push("Name-based UUID - ensure proper namespace usage".to_owned()),
        4 => {
            result.metadata = Some(ValidationMetadata::Randomness {
                entropy_bits: entropy_bits(4).unwrap_or_default(),
                collision_probability: estimate_collision_probability(4, 1).unwrap_or_default(),
            })
        }
        7 => {
            let unix_ts_ms = uuid.unix_ts_ms().unwrap_or_default();
            result.metadata = Some(ValidationMetadata::Timestamp {
                unix_ts_ms,
                datetime: DateTime::from_timestamp_millis(unix_ts_ms as i64),
                random_bits: entropy_bits(7).unwrap_or_default(),
            })
        }
        _ => result
            .warnings
            .push(format!("Unusual UUID version: {version}")),
    }
    result
}

/// Explains how a normalized but invalid value differs from the canonical layout.
fn suggestions(normalized: &str) -> Vec<String> {
    let digits: Vec<char> = normalized.chars().filter(|c| *c != '-').collect();
    if digits.is_empty() {
        return vec!["Enter a UUID such as 6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_owned()];
    }
    if digits.len() != 32 {
        return vec![format!(
            "Expected 32 hexadecimal digits, found {}",
            digits.len()
        )];
    }

    let mut suggestions = Vec::new();
    let hyphens: Vec<usize> = normalized.match_indices('-').map(|(i, _)| i).collect();
    if hyphens != [8, 13, 18, 23] {
        suggestions.push("Group the digits as 8-4-4-4-12 separated by hyphens".to_owned());
    }
    if !matches!(digits[12], '1'..='7') {
        suggestions.push(format!(
            "Version digit '{}' is outside the supported range 1-7",
            digits[12]
        ));
    }
    if !matches!(digits[16], '8' | '9' | 'a' | 'b') {
        suggestions.push(format!(
            "Variant digit '{}' should be one of 8, 9, a, or b",
            digits[16]
        ));
    }
    suggestions
}
