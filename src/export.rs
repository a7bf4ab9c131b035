//! Export of identifier lists as JSON, CSV, or plain text.

use std::{fmt, str};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// A pretty-printed JSON array of strings.
    #[default]
    Json,
    /// A `UUID` header line followed by one value per line.
    Csv,
    /// One value per line.
    Txt,
}

impl ExportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Txt => "text/plain",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        match src.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            _ => Err(Error::InvalidArgument(format!(
                "unknown export format '{src}'"
            ))),
        }
    }
}

/// A rendered export ready to be written out.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub format: ExportFormat,
    /// `uuids-<unix ms>.<extension>`
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Renders `values` in `format`, naming the file after `created_at`.
pub fn export_uuids(
    values: &[String],
    format: ExportFormat,
    created_at: DateTime<Utc>,
) -> Result<Export> {
    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(values)
            .map_err(|err| Error::Serialization(err.to_string()))?,
        ExportFormat::Csv => format!("UUID\n{}", values.join("\n")),
        ExportFormat::Txt => values.join("\n"),
    };
    Ok(Export {
        format,
        file_name: format!(
            "uuids-{}.{}",
            created_at.timestamp_millis(),
            format.extension()
        ),
        mime_type: format.mime_type(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::{export_uuids, ExportFormat};
    use chrono::DateTime;

    fn values() -> Vec<String> {
        vec![
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_owned(),
            "{886313e1-3b8a-5372-9b90-0c9aee199e5d}".to_owned(),
        ]
    }

    /// Renders each export format
    #[test]
    fn renders_each_export_format() {
        let at = DateTime::from_timestamp_millis(1_645_557_742_000).unwrap();

        let json = export_uuids(&values(), ExportFormat::Json, at).unwrap();
        assert_eq!(
            json.content,
            "[\n  \"6ba7b810-9dad-11d1-80b4-00c04fd430c8\",\n  \"{886313e1-3b8a-5372-9b90-0c9aee199e5d}\"\n]"
        );
        assert_eq!(json.file_name, "uuids-1645557742000.json");
        assert_eq!(json.mime_type, "application/json");
        let parsed: Vec<String> = serde_json::from_str(&json.content).unwrap();
        assert_eq!(parsed, values());

        let csv = export_uuids(&values(), ExportFormat::Csv, at).unwrap();
        assert_eq!(
            csv.content,
            "UUID\n6ba7b810-9dad-11d1-80b4-00c04fd430c8\n{886313e1-3b8a-5372-9b90-0c9aee199e5d}"
        );
        assert_eq!(csv.mime_type, "text/csv");

        let txt = export_uuids(&values(), ExportFormat::Txt, at).unwrap();
        assert_eq!(txt.content.lines().count(), 2);
        assert_eq!(txt.file_name, "uuids-1645557742000.txt");
    }

    /// Renders empty lists
    #[test]
    fn renders_empty_lists() {
        let at = DateTime::from_timestamp_millis(0).unwrap();
        assert_eq!(export_uuids(&[], ExportFormat::Json, at).unwrap().content, "[]");
        assert_eq!(export_uuids(&[], ExportFormat::Csv, at).unwrap().content, "UUID\n");
        assert_eq!(export_uuids(&[], ExportFormat::Txt, at).unwrap().content, "");
    }

    /// Parses export format names
    #[test]
    fn parses_export_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
