//! Stored command records and their line encoding.
//!
//! Each record occupies exactly one line of the log: a JSON object followed
//! by `\n`. JSON string escaping guarantees that a newline inside a command
//! never appears raw, so `\n` is an unambiguous delimiter.
//!
//! ```text
//! {"ID":"0","Command":"git status","Date":"2024-03-01T10:15:30.123456789+01:00"}
//! ```

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// Line delimiter of the log.
pub const DELIMITER: u8 = b'\n';

/// One stored command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique among live records.
    #[serde(rename = "ID")]
    pub id: String,
    /// Command text.
    #[serde(rename = "Command")]
    pub command: String,
    /// Creation time. Advisory only.
    #[serde(rename = "Date")]
    pub date: DateTime<FixedOffset>,
}

impl Record {
    /// Creates a record stamped with the current local time.
    #[must_use]
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self::with_date(id, command, Local::now().fixed_offset())
    }

    /// Creates a record with an explicit timestamp.
    #[must_use]
    pub fn with_date(
        id: impl Into<String>,
        command: impl Into<String>,
        date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            date,
        }
    }

    /// Encodes the record as a delimited log line.
    pub fn encode_line(&self) -> CoreResult<Vec<u8>> {
        let mut line = serde_json::to_vec(self).map_err(|source| CoreError::Encode {
            id: self.id.clone(),
            source,
        })?;
        line.push(DELIMITER);
        Ok(line)
    }

    /// Decodes a log line without its delimiter.
    ///
    /// `offset` is only used to locate the line in error messages.
    pub fn decode_line(line: &[u8], offset: u64) -> CoreResult<Self> {
        serde_json::from_slice(line)
            .map_err(|e| CoreError::corrupt_record(offset, format!("unparseable record: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T10:15:30.123456789+01:00").unwrap()
    }

    #[test]
    fn encodes_single_line_with_original_keys() {
        let record = Record::with_date("0", "git status", date());
        let line = record.encode_line().unwrap();

        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(
            std::str::from_utf8(&line).unwrap(),
            "{\"ID\":\"0\",\"Command\":\"git status\",\"Date\":\"2024-03-01T10:15:30.123456789+01:00\"}\n"
        );
    }

    #[test]
    fn embedded_newline_stays_escaped() {
        let record = Record::with_date("multi", "echo a\necho b", date());
        let line = record.encode_line().unwrap();

        let delimiters = line.iter().filter(|&&b| b == DELIMITER).count();
        assert_eq!(delimiters, 1);

        let decoded = Record::decode_line(&line[..line.len() - 1], 0).unwrap();
        assert_eq!(decoded.command, "echo a\necho b");
    }

    #[test]
    fn decodes_go_style_utc_timestamp() {
        let line = br#"{"ID":"ls","Command":"ls -la","Date":"2021-06-01T08:00:00Z"}"#;
        let record = Record::decode_line(line, 0).unwrap();

        assert_eq!(record.id, "ls");
        assert_eq!(record.command, "ls -la");
        assert_eq!(record.date.offset().local_minus_utc(), 0);
    }

    #[test]
    fn ignores_unknown_keys() {
        let line = br#"{"ID":"a","Command":"b","Date":"2021-06-01T08:00:00Z","Extra":1}"#;
        assert!(Record::decode_line(line, 0).is_ok());
    }

    #[test]
    fn rejects_malformed_line() {
        let err = Record::decode_line(br#"{"ID":"a","Comm"#, 42).unwrap_err();
        assert!(matches!(err, CoreError::CorruptRecord { offset: 42, .. }));

        let err = Record::decode_line(br#"{"ID":"a"}"#, 7).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn new_stamps_current_time() {
        let before = Local::now();
        let record = Record::new("x", "true");
        assert!(record.date >= before.fixed_offset());
    }
}
