//! One line of the history log.
//!
//! ```text
//! <serial>. <key1>=<value1> <key2>=<value2> ... timestamp=<YYYY-MM-DD HH:MM:SS> <STATUS>
//! ```
//!
//! Field values are written verbatim. A value containing whitespace or the
//! literal `timestamp=` cannot be read back faithfully; restore reports the
//! first case as a malformed entry and truncates at the marker in the second.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use crate::error::{PbxError, PbxResult};
use crate::session::SessionConfig;

/// Separator between the field list and the timestamp
pub const TIMESTAMP_MARKER: &str = " timestamp=";

/// Timestamp layout used in the log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome recorded with each entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The build rendered and wrote its output
    Success,
    /// Validation or rendering failed, or the session was abandoned
    Fail,
}

impl EntryStatus {
    /// Log spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Success => "SUCCESS",
            EntryStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(EntryStatus::Success),
            "FAIL" => Ok(EntryStatus::Fail),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// A parsed history line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 1-based line position in the log
    pub serial: u32,
    /// Session mapping at the time of recording
    pub fields: SessionConfig,
    /// Local time of recording, as written
    pub timestamp: String,
    /// Build outcome
    pub status: EntryStatus,
}

impl HistoryEntry {
    /// Render a log line (without trailing newline)
    pub fn format_line(
        serial: u32,
        fields: &SessionConfig,
        timestamp: &NaiveDateTime,
        status: EntryStatus,
    ) -> String {
        let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!(
            "{}. {}{}{} {}",
            serial,
            parts.join(" "),
            TIMESTAMP_MARKER,
            timestamp.format(TIMESTAMP_FORMAT),
            status
        )
    }

    /// Parse a complete log line
    pub fn parse(line: &str) -> PbxResult<Self> {
        let (serial, rest) = split_serial(line)?;
        let (field_text, tail) = rest
            .split_once(TIMESTAMP_MARKER)
            .ok_or_else(|| PbxError::malformed(serial, "missing timestamp marker"))?;
        let fields = parse_fields(serial, field_text)?;

        let (timestamp, status) = tail
            .trim_end()
            .rsplit_once(' ')
            .ok_or_else(|| PbxError::malformed(serial, "missing status"))?;
        let status = status
            .parse::<EntryStatus>()
            .map_err(|e| PbxError::malformed(serial, e))?;

        Ok(Self {
            serial,
            fields,
            timestamp: timestamp.to_string(),
            status,
        })
    }
}

/// Prefix identifying the line with the given serial
pub fn serial_prefix(serial: u32) -> String {
    format!("{}. ", serial)
}

fn split_serial(line: &str) -> PbxResult<(u32, &str)> {
    let (number, rest) = line
        .split_once(". ")
        .ok_or_else(|| PbxError::malformed(0, format!("no serial in '{}'", line)))?;
    let serial = number
        .trim()
        .parse::<u32>()
        .map_err(|_| PbxError::malformed(0, format!("bad serial '{}'", number)))?;
    Ok((serial, rest))
}

/// Extract the `key=value` pairs of the line carrying `serial`.
///
/// Only the portion between the serial prefix and the first timestamp marker
/// is considered; timestamp and status are not checked.
pub fn restore_fields(serial: u32, line: &str) -> PbxResult<SessionConfig> {
    let rest = line
        .strip_prefix(&serial_prefix(serial))
        .ok_or_else(|| PbxError::malformed(serial, "serial prefix mismatch"))?;
    let (field_text, _) = rest
        .split_once(TIMESTAMP_MARKER)
        .ok_or_else(|| PbxError::malformed(serial, "missing timestamp marker"))?;
    parse_fields(serial, field_text)
}

fn parse_fields(serial: u32, text: &str) -> PbxResult<SessionConfig> {
    let mut fields = SessionConfig::new();
    for token in text.split_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| PbxError::malformed(serial, format!("token '{}' is not key=value", token)))?;
        fields.insert(key, value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn fields() -> SessionConfig {
        [("payload_type", "reverse_shell"), ("ip", "10.0.0.5"), ("port", "4444")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_format_line_layout() {
        let line = HistoryEntry::format_line(3, &fields(), &ts(), EntryStatus::Success);
        assert_eq!(
            line,
            "3. payload_type=reverse_shell ip=10.0.0.5 port=4444 timestamp=2025-03-14 09:26:53 SUCCESS"
        );
    }

    #[test]
    fn test_parse_line() {
        let line = HistoryEntry::format_line(7, &fields(), &ts(), EntryStatus::Fail);
        let entry = HistoryEntry::parse(&line).unwrap();
        assert_eq!(entry.serial, 7);
        assert_eq!(entry.fields, fields());
        assert_eq!(entry.timestamp, "2025-03-14 09:26:53");
        assert_eq!(entry.status, EntryStatus::Fail);
    }

    #[test]
    fn test_values_may_contain_equals() {
        let mut f = fields();
        f.insert("watermark", "k=v=w");
        let line = HistoryEntry::format_line(1, &f, &ts(), EntryStatus::Success);
        let restored = restore_fields(1, &line).unwrap();
        assert_eq!(restored.get("watermark"), Some("k=v=w"));
    }

    #[test]
    fn test_whitespace_in_value_is_malformed() {
        let mut f = fields();
        f.insert("watermark", "two words");
        let line = HistoryEntry::format_line(1, &f, &ts(), EntryStatus::Success);
        assert!(matches!(
            restore_fields(1, &line),
            Err(PbxError::MalformedEntry { serial: 1, .. })
        ));
    }

    #[test]
    fn test_timestamp_marker_in_value_truncates() {
        let mut f = fields();
        f.insert("watermark", "x");
        f.insert("filename", "a timestamp=b");
        let line = HistoryEntry::format_line(2, &f, &ts(), EntryStatus::Success);
        let restored = restore_fields(2, &line).unwrap();
        assert_eq!(restored.get("watermark"), Some("x"));
        assert_eq!(restored.get("filename"), Some("a"));
        assert_eq!(restored.len(), 5);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(HistoryEntry::parse("garbage").is_err());
        assert!(HistoryEntry::parse("1. payload_type=x no marker").is_err());
        assert!(HistoryEntry::parse("1. payload_type=x timestamp=2025-01-01 00:00:00 MAYBE").is_err());
        assert!(matches!(
            restore_fields(4, "4. payload_type=x"),
            Err(PbxError::MalformedEntry { serial: 4, .. })
        ));
    }
}
