//! Operation history, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Format;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Generate,
    Validate,
    Convert,
    Analyze,
}

/// A single value or the values of a bulk request.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Output {
    One(String),
    Many(Vec<String>),
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub output: Output,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryRecord {
    /// Creates a successful record with no input, version, or format.
    pub fn new(operation: Operation, output: Output, count: usize) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("history_{}", timestamp.timestamp_nanos_opt().unwrap_or_default()),
            timestamp,
            operation,
            input: None,
            output,
            count,
            version: None,
            format: None,
            success: true,
            error: None,
        }
    }

    /// Creates a failed record carrying the error text.
    pub fn failure(operation: Operation, error: impl ToString) -> Self {
        let mut record = Self::new(operation, Output::One(String::new()), 0);
        record.success = false;
        record.error = Some(error.to_string());
        record
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// Bounded log of [`HistoryRecord`]s. Pushing past the limit evicts the oldest record.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct HistoryLog {
    records: VecDeque<HistoryRecord>,
    limit: usize,
}

impl HistoryLog {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    /// Rebuilds a log from records stored newest first, dropping any past `limit`.
    pub fn from_records(records: Vec<HistoryRecord>, limit: usize) -> Self {
        let mut log = Self {
            records: records.into(),
            limit,
        };
        log.records.truncate(limit);
        log
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push_front(record);
        self.records.truncate(self.limit);
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.records.truncate(limit);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryLog, HistoryRecord, Operation, Output};
    use crate::Format;

    fn record(i: usize) -> HistoryRecord {
        HistoryRecord::new(Operation::Generate, Output::One(format!("value-{i}")), 1)
    }

    /// Keeps records newest first and evicts the oldest past the limit
    #[test]
    fn keeps_records_newest_first_and_evicts_the_oldest_past_the_limit() {
        let mut log = HistoryLog::new(3);
        for i in 0..5 {
            log.push(record(i));
        }
        let outputs: Vec<_> = log.iter().map(|e| e.output.clone()).collect();
        assert_eq!(
            outputs,
            [4, 3, 2].map(|i| Output::One(format!("value-{i}")))
        );
        assert_eq!(log.len(), 3);

        log.set_limit(1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.iter().next().unwrap().output, Output::One("value-4".into()));

        log.clear();
        assert!(log.is_empty());
    }

    /// Serializes single and bulk outputs without tags
    #[test]
    fn serializes_single_and_bulk_outputs_without_tags() {
        let single = record(1)
            .with_input("{6ba7b810-9dad-11d1-80b4-00c04fd430c8}")
            .with_version(4)
            .with_format(Format::Braces);
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["operation"], "generate");
        assert_eq!(json["output"], "value-1");
        assert_eq!(json["format"], "braces");
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());

        let bulk = HistoryRecord::new(
            Operation::Generate,
            Output::Many(vec!["a".into(), "b".into()]),
            2,
        );
        let json = serde_json::to_value(&bulk).unwrap();
        assert_eq!(json["output"], serde_json::json!(["a", "b"]));
        assert_eq!(json["count"], 2);
    }

    /// Records failures with their error text
    #[test]
    fn records_failures_with_their_error_text() {
        let failed = HistoryRecord::failure(Operation::Analyze, "invalid identifier: x");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("invalid identifier: x"));
        assert_eq!(failed.count, 0);
    }

    /// Restores a stored log
    #[test]
    fn restores_a_stored_log() {
        let mut log = HistoryLog::new(10);
        for i in 0..4 {
            log.push(record(i));
        }
        let json = log.to_json().unwrap();
        let restored = HistoryLog::from_records(serde_json::from_str(&json).unwrap(), 2);
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.iter().next().unwrap().output,
            Output::One("value-3".into())
        );
    }
}
