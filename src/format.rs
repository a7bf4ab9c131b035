//! Textual and binary representations of identifiers.

use std::{fmt, str};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{validate_uuid, Error, Result, Uuid};

/// One of the nine supported representations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// `6ba7b810-9dad-11d1-80b4-00c04fd430c8`
    #[default]
    Standard,
    /// `6ba7b8109dad11d180b400c04fd430c8`
    NoHyphens,
    /// `6BA7B810-9DAD-11D1-80B4-00C04FD430C8`
    Uppercase,
    /// `{6ba7b810-9dad-11d1-80b4-00c04fd430c8}`
    Braces,
    /// `(6ba7b810-9dad-11d1-80b4-00c04fd430c8)`
    Parentheses,
    /// `urn:uuid:6ba7b810-9dad-11d1-80b4-00c04fd430c8`
    Urn,
    /// `a6e4EJ2tEdGAtADAT9QwyA==`
    Base64,
    /// `0x6ba7b8109dad11d180b400c04fd430c8`
    Hex,
    /// 128 `0`/`1` characters, most significant bit first.
    Binary,
}

impl Format {
    pub const ALL: [Self; 9] = [
        Self::Standard,
        Self::NoHyphens,
        Self::Uppercase,
        Self::Braces,
        Self::Parentheses,
        Self::Urn,
        Self::Base64,
        Self::Hex,
        Self::Binary,
    ];

    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::NoHyphens => "no-hyphens",
            Self::Uppercase => "uppercase",
            Self::Braces => "braces",
            Self::Parentheses => "parentheses",
            Self::Urn => "urn",
            Self::Base64 => "base64",
            Self::Hex => "hex",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl str::FromStr for Format {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.tag().eq_ignore_ascii_case(src))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown format '{src}'")))
    }
}

impl Uuid {
    /// Returns the representation of this identifier in `format`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuidkit::{Format, Uuid};
    ///
    /// let x = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".parse::<Uuid>()?;
    /// assert_eq!(x.format(Format::Braces), "{6ba7b810-9dad-11d1-80b4-00c04fd430c8}");
    /// assert_eq!(x.format(Format::Hex), "0x6ba7b8109dad11d180b400c04fd430c8");
    /// # Ok::<(), uuidkit::ParseError>(())
    /// ```
    pub fn format(&self, format: Format) -> String {
        let canonical = self.encode();
        match format {
            Format::Standard => canonical.to_string(),
            Format::NoHyphens => canonical.replace('-', ""),
            Format::Uppercase => canonical.to_ascii_uppercase(),
            Format::Braces => format!("{{{canonical}}}"),
            Format::Parentheses => format!("({canonical})"),
            Format::Urn => format!("urn:uuid:{canonical}"),
            Format::Base64 => BASE64.encode(self.as_bytes()),
            Format::Hex => format!("0x{:032x}", u128::from(*self)),
            Format::Binary => format!("{:0128b}", u128::from(*self)),
        }
    }
}

/// Reformats an identifier given in any supported format.
pub fn format_uuid(input: &str, format: Format) -> Result<String> {
    let uuid: Uuid = normalize_uuid(input).parse()?;
    Ok(uuid.format(format))
}

/// Reduces any supported representation to lowercase hyphenated text.
///
/// Wrappers and prefixes are stripped and characters outside `[0-9a-f-]` are dropped. Base64
/// and binary inputs are decoded, and a bare 32-digit body gets its hyphens back. The result is
/// not guaranteed to be a valid identifier; see [`validate_uuid`].
pub fn normalize_uuid(input: &str) -> String {
    let input = input.trim();
    match detect_format(input) {
        Format::Base64 => {
            if let Some(uuid) = decode_base64(input) {
                return uuid.to_string();
            }
        }
        Format::Binary => {
            if let Ok(n) = u128::from_str_radix(input, 2) {
                return Uuid::from(n).to_string();
            }
        }
        _ => {}
    }

    let lower = input.to_ascii_lowercase();
    let unwrapped: String = lower
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '(' | ')'))
        .collect();
    let body = unwrapped
        .strip_prefix("urn:uuid:")
        .or_else(|| unwrapped.strip_prefix("0x"))
        .unwrap_or(&unwrapped);
    let filtered: String = body
        .chars()
        .filter(|c| c.is_ascii_hexdigit() || *c == '-')
        .collect();

    if filtered.len() == 32 && !filtered.contains('-') {
        format!(
            "{}-{}-{}-{}-{}",
            &filtered[..8],
            &filtered[8..12],
            &filtered[12..16],
            &filtered[16..20],
            &filtered[20..]
        )
    } else {
        filtered
    }
}

/// Guesses the representation of `input` from its wrapper, prefix, and hyphen pattern.
pub fn detect_format(input: &str) -> Format {
    let input = input.trim();
    if input.starts_with('{') && input.ends_with('}') {
        Format::Braces
    } else if input.starts_with('(') && input.ends_with(')') {
        Format::Parentheses
    } else if input
        .as_bytes()
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"urn:uuid:"))
    {
        Format::Urn
    } else if decode_base64(input).is_some() {
        Format::Base64
    } else if input.starts_with("0x") || input.starts_with("0X") {
        Format::Hex
    } else if input.len() == 128 && input.bytes().all(|c| c == b'0' || c == b'1') {
        Format::Binary
    } else if input.contains('-') {
        let upper = input.bytes().any(|c| c.is_ascii_uppercase());
        let lower = input.bytes().any(|c| c.is_ascii_lowercase());
        if upper && !lower {
            Format::Uppercase
        } else {
            Format::Standard
        }
    } else if input.len() == 32 && input.bytes().all(|c| c.is_ascii_hexdigit()) {
        Format::NoHyphens
    } else {
        Format::Standard
    }
}

fn decode_base64(input: &str) -> Option<Uuid> {
    if input.len() != 24 {
        return None;
    }
    let bytes = BASE64.decode(input).ok()?;
    <[u8; 16]>::try_from(bytes.as_slice()).ok().map(Uuid::from)
}

/// Options for [`convert_uuid`].
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    pub target_format: Format,
    /// Literal text prepended to the converted value.
    pub add_prefix: Option<String>,
    /// Literal text appended to the converted value.
    pub add_suffix: Option<String>,
}

impl ConvertOptions {
    pub fn new(target_format: Format) -> Self {
        Self {
            target_format,
            ..Default::default()
        }
    }
}

/// Validates `input` and rewrites it in the target format.
pub fn convert_uuid(input: &str, options: &ConvertOptions) -> Result<String> {
    let validation = validate_uuid(input);
    let Some(uuid) = validation.uuid else {
        return Err(Error::InvalidIdentifier(format!(
            "cannot convert invalid UUID '{input}'"
        )));
    };

    let mut converted = uuid.format(options.target_format);
    if let Some(prefix) = &options.add_prefix {
        converted.insert_str(0, prefix);
    }
    if let Some(suffix) = &options.add_suffix {
        converted.push_str(suffix);
    }
    Ok(converted)
}
