//! Structural, temporal, and statistical analysis of identifiers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{validate_uuid, Components, Error, Format, Result, Uuid, Variant, GREGORIAN_OFFSET_MS};

/// Full breakdown of a valid identifier.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub uuid: String,
    pub version: u8,
    pub variant: Variant,
    pub format: Format,
    pub structure: Structure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingInfo>,
    pub security: SecurityAnalysis,
    pub entropy: EntropyAnalysis,
    pub recommendations: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub components: Components,
    pub bit_layout: BitLayout,
    pub field_sizes: FieldSizes,
    pub encoding: &'static str,
}

/// Human-readable description of where each field lives.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BitLayout {
    pub version: String,
    pub variant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_sequence: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<&'static str>,
}

/// Widths of the five canonical groups, in bits.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSizes {
    pub time_low: u8,
    pub time_mid: u8,
    pub time_hi: u8,
    pub clock_seq: u8,
    pub node: u8,
}

impl FieldSizes {
    pub const CANONICAL: Self = Self {
        time_low: 32,
        time_mid: 16,
        time_hi: 16,
        clock_seq: 16,
        node: 48,
    };
}

/// The clock reading embedded in a v1 or v6 identifier.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingInfo {
    /// 100-nanosecond intervals since the Gregorian epoch.
    pub gregorian_ticks: u64,
    pub unix_ts_ms: i64,
    /// `None` when the value falls outside the calendar range `chrono` can represent.
    pub timestamp: Option<DateTime<Utc>>,
    pub gregorian_epoch: DateTime<Utc>,
    pub resolution: &'static str,
    pub accuracy: &'static str,
    pub clock_sequence: u16,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Predictability {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionResistance {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAnalysis {
    pub predictability: Predictability,
    pub entropy_bits: u32,
    pub collision_resistance: CollisionResistance,
    pub information_leakage: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntropyAnalysis {
    pub total_bits: u32,
    pub effective_bits: u32,
    pub randomness_sources: Vec<&'static str>,
    /// 0 to 100, from the number of distinct hexadecimal digits.
    pub quality_score: f64,
    pub distribution: String,
    pub patterns: Vec<String>,
}

/// Analyzes a valid identifier given in any supported format.
///
/// # Examples
///
/// ```rust
/// use uuidkit::{analyze_uuid, analysis::Predictability};
///
/// let analysis = analyze_uuid("urn:uuid:c232ab00-9414-11ec-b3c8-9f6bdeced846")?;
/// assert_eq!(analysis.security.predictability, Predictability::High);
/// assert_eq!(analysis.timing.unwrap().unix_ts_ms, 1_645_557_742_000);
/// # Ok::<(), uuidkit::Error>(())
/// ```
pub fn analyze_uuid(input: &str) -> Result<AnalysisResult> {
    let validation = validate_uuid(input);
    let (Some(uuid), true) = (validation.uuid, validation.is_valid) else {
        return Err(Error::InvalidIdentifier(format!(
            "cannot analyze invalid UUID '{input}'"
        )));
    };

    let version = uuid.version();
    let security = security_analysis(version);
    let entropy = entropy_analysis(&uuid, security.entropy_bits);
    let recommendations = recommendations(version, &security, &entropy);
    Ok(AnalysisResult {
        uuid: validation.normalized,
        version,
        variant: uuid.variant(),
        format: validation.format,
        structure: Structure {
            components: uuid.components(),
            bit_layout: bit_layout(version, uuid.variant()),
            field_sizes: FieldSizes::CANONICAL,
            encoding: "hexadecimal",
        },
        timing: timing_info(&uuid),
        security,
        entropy,
        recommendations,
    })
}

/// Decodes the timestamp and clock sequence of a v1 or v6 identifier.
pub fn timing_info(uuid: &Uuid) -> Option<TimingInfo> {
    let ticks = uuid.gregorian_ticks()?;
    let unix_ts_ms = (ticks / 10_000) as i64 - GREGORIAN_OFFSET_MS as i64;
    Some(TimingInfo {
        gregorian_ticks: ticks,
        unix_ts_ms,
        timestamp: DateTime::from_timestamp_millis(unix_ts_ms),
        gregorian_epoch: DateTime::from_timestamp_millis(-(GREGORIAN_OFFSET_MS as i64))
            .unwrap_or_default(),
        resolution: "100 nanoseconds",
        accuracy: "System clock dependent",
        clock_sequence: uuid.clock_seq(),
    })
}

/// Unpredictable bits of each version; `None` for versions without a fixed figure.
pub(crate) const fn entropy_bits(version: u8) -> Option<u32> {
    match version {
        1 | 2 | 6 => Some(47),
        3 | 5 => Some(0),
        4 => Some(122),
        7 => Some(74),
        _ => None,
    }
}

/// Estimates the chance of any collision among `count` values of `version`.
///
/// Uses the birthday bound `n² / 2^(bits + 1)`. Returns `None` for name-based versions, whose
/// values collide only when their inputs do.
pub fn estimate_collision_probability(version: u8, count: u64) -> Option<String> {
    let bits = match version {
        1 | 6 => 47,
        4 => 122,
        7 => 74,
        _ => return None,
    };
    let probability = (count as f64).powi(2) / 2f64.powi(bits + 1);
    Some(if probability < 1e-15 {
        "< 1 in 10^15".to_owned()
    } else if probability < 1e-12 {
        "< 1 in 10^12".to_owned()
    } else if probability < 1e-9 {
        "< 1 in 10^9".to_owned()
    } else {
        format!("≈ {probability:.2e}")
    })
}

fn bit_layout(version: u8, variant: Variant) -> BitLayout {
    let time_based = matches!(version, 1 | 2 | 6);
    BitLayout {
        version: format!("{version} (bits 12-15 of time_hi_and_version)"),
        variant: format!("{variant} (top bits of clock_seq_hi_and_reserved)"),
        timestamp: match version {
            1 | 2 => Some("60 bits, low field first"),
            6 => Some("60 bits, most significant first"),
            7 => Some("48-bit Unix milliseconds"),
            _ => None,
        },
        clock_sequence: time_based.then_some("14 bits in clock_seq fields"),
        node: time_based.then_some("48 bits (MAC address or random)"),
        random: match version {
            4 => Some("122 bits of random data"),
            7 => Some("74 bits of random data"),
            _ => None,
        },
        hash: match version {
            3 => Some("122 bits of an MD5 digest"),
            5 => Some("122 bits of a SHA-1 digest"),
            _ => None,
        },
    }
}

fn security_analysis(version: u8) -> SecurityAnalysis {
    let mut analysis = SecurityAnalysis {
        predictability: Predictability::Low,
        entropy_bits: entropy_bits(version).unwrap_or_default(),
        collision_resistance: CollisionResistance::Excellent,
        information_leakage: Vec::new(),
        recommendations: Vec::new(),
    };
    match version {
        1 | 2 | 6 => {
            analysis.predictability = Predictability::High;
            analysis.information_leakage = vec!["MAC address", "timestamp"];
            analysis.recommendations.push("Consider using v4 for better privacy");
        }
        3 | 5 => {
            analysis.predictability = Predictability::High;
            analysis.collision_resistance = CollisionResistance::Good;
            analysis.information_leakage = vec!["namespace", "name"];
            analysis
                .recommendations
                .push("Do not derive identifiers from secret names");
        }
        7 => {
            analysis.predictability = Predictability::Medium;
            analysis.information_leakage = vec!["timestamp"];
        }
        _ => {}
    }
    analysis
}

fn entropy_analysis(uuid: &Uuid, effective_bits: u32) -> EntropyAnalysis {
    let hex = uuid.format(Format::NoHyphens);
    let mut seen = [false; 16];
    for c in hex.chars() {
        if let Some(d) = c.to_digit(16) {
            seen[d as usize] = true;
        }
    }
    let distinct = seen.iter().filter(|e| **e).count();
    let bonus = if distinct > 10 { 20.0 } else { 0.0 };
    let quality_score = (distinct as f64 / 16.0 * 80.0 + bonus).min(100.0);

    EntropyAnalysis {
        total_bits: 128,
        effective_bits,
        randomness_sources: match uuid.version() {
            4 => vec!["CSPRNG"],
            7 => vec!["timestamp", "CSPRNG"],
            1 | 2 | 6 => vec!["timestamp", "clock sequence", "MAC/random node"],
            _ => vec!["hash function"],
        },
        quality_score,
        distribution: format!("{distinct}/16 unique characters"),
        patterns: detect_patterns(&hex),
    }
}

/// Flags the first repeated 4-digit substring and runs of 4+ ascending or descending digits.
fn detect_patterns(hex: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    for i in 0..hex.len().saturating_sub(3) {
        let sequence = &hex[i..i + 4];
        if hex[i + 1..].contains(sequence) {
            patterns.push(format!("Repeated sequence: {sequence}"));
            break;
        }
    }

    let digits: Vec<i32> = hex
        .chars()
        .filter_map(|c| c.to_digit(16).map(|d| d as i32))
        .collect();
    let (mut ascending, mut descending) = (false, false);
    let (mut up, mut down) = (0, 0);
    for pair in digits.windows(2) {
        up = if pair[1] == pair[0] + 1 { up + 1 } else { 0 };
        down = if pair[1] == pair[0] - 1 { down + 1 } else { 0 };
        // three steps span four digits
        ascending |= up >= 3;
        descending |= down >= 3;
    }
    if ascending {
        patterns.push("Contains ascending sequences".to_owned());
    }
    if descending {
        patterns.push("Contains descending sequences".to_owned());
    }
    patterns
}

fn recommendations(
    version: u8,
    security: &SecurityAnalysis,
    entropy: &EntropyAnalysis,
) -> Vec<String> {
    let mut recommendations = Vec::new();
    if matches!(version, 1 | 2 | 6) {
        recommendations.push("Consider using v4 UUIDs for better privacy".to_owned());
        recommendations.push("Ensure system clock is properly synchronized".to_owned());
    }
    if matches!(version, 3 | 5) {
        recommendations.push("Use a namespace dedicated to your application".to_owned());
    }
    if security.entropy_bits < 100 {
        recommendations
            .push("Low entropy detected - ensure proper random number generation".to_owned());
    }
    if !entropy.patterns.is_empty() {
        recommendations.push("Patterns detected - verify randomness source quality".to_owned());
    }
    recommendations
}
