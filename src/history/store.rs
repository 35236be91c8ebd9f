//! File-backed history log.

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use super::entry::{restore_fields, serial_prefix, EntryStatus, HistoryEntry};
use crate::error::{PbxError, PbxResult};
use crate::session::SessionConfig;

/// Which end of the log `range` reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Oldest entries first
    Top,
    /// Most recent entries
    Bottom,
}

impl FromStr for Direction {
    type Err = PbxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            _ => Err(PbxError::usage("history show top|bottom N")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Top => write!(f, "top"),
            Direction::Bottom => write!(f, "bottom"),
        }
    }
}

/// Result of a keyword search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    /// The log is missing or empty
    NoHistory,
    /// The log has entries but none match
    NoMatches,
    /// Matching raw lines, oldest first
    Found(Vec<String>),
}

/// Append-only history log stored as a text file
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store for the given log file. Nothing is touched on disk
    /// until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the log file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Every line, oldest first. A missing log reads as empty.
    pub fn all(&self) -> PbxResult<Vec<String>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PbxError::storage(format!(
                "Failed to read history {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Number of entries
    pub fn len(&self) -> PbxResult<usize> {
        Ok(self.all()?.len())
    }

    /// Whether the log has no entries
    pub fn is_empty(&self) -> PbxResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Append a snapshot stamped with the current local time.
    /// Returns the serial assigned to the new entry.
    pub fn append(&self, fields: &SessionConfig, status: EntryStatus) -> PbxResult<u32> {
        self.append_at(fields, status, Local::now().naive_local())
    }

    /// Append a snapshot with an explicit timestamp
    pub fn append_at(
        &self,
        fields: &SessionConfig,
        status: EntryStatus,
        timestamp: NaiveDateTime,
    ) -> PbxResult<u32> {
        let serial = self.len()? as u32 + 1;
        let line = HistoryEntry::format_line(serial, fields, &timestamp, status);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                PbxError::storage(format!(
                    "Failed to open history {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", line)
            .map_err(|e| PbxError::storage(format!("Failed to write history entry: {}", e)))?;
        file.sync_all()
            .map_err(|e| PbxError::storage(format!("Failed to sync history: {}", e)))?;

        debug!(serial, status = %status, "history entry appended");
        Ok(serial)
    }

    /// The last `n` lines
    pub fn tail(&self, n: usize) -> PbxResult<Vec<String>> {
        self.range(Direction::Bottom, n)
    }

    /// The first (`Top`) or last (`Bottom`) `n` lines
    pub fn range(&self, direction: Direction, n: usize) -> PbxResult<Vec<String>> {
        let lines = self.all()?;
        let n = n.min(lines.len());
        Ok(match direction {
            Direction::Top => lines[..n].to_vec(),
            Direction::Bottom => lines[lines.len() - n..].to_vec(),
        })
    }

    /// Lines whose `key` field equals `value`
    pub fn find(&self, key: &str, value: &str) -> PbxResult<FindOutcome> {
        let lines = self.all()?;
        if lines.is_empty() {
            return Ok(FindOutcome::NoHistory);
        }

        let needle = format!("{}={}", key, value);
        let matches: Vec<String> = lines
            .into_iter()
            .filter(|line| line.contains(&needle))
            .filter(|line| match HistoryEntry::parse(line) {
                Ok(entry) => entry.fields.get(key) == Some(value),
                Err(_) => true,
            })
            .collect();

        Ok(if matches.is_empty() {
            FindOutcome::NoMatches
        } else {
            FindOutcome::Found(matches)
        })
    }

    fn line_for(&self, serial: u32) -> PbxResult<String> {
        let prefix = serial_prefix(serial);
        self.all()?
            .into_iter()
            .find(|line| line.starts_with(&prefix))
            .ok_or(PbxError::NoSuchSerial { serial })
    }

    /// The recorded fields of `serial`, ready to replace a session mapping
    pub fn restore(&self, serial: u32) -> PbxResult<SessionConfig> {
        let line = self.line_for(serial)?;
        let fields = restore_fields(serial, &line)?;
        debug!(serial, keys = fields.len(), "history entry restored");
        Ok(fields)
    }

    /// Truncate the log if `confirm` answers yes. Returns whether it was
    /// cleared.
    pub fn clear_if<F>(&self, confirm: F) -> PbxResult<bool>
    where
        F: FnOnce() -> PbxResult<bool>,
    {
        if !confirm()? {
            return Ok(false);
        }
        if self.exists() {
            fs::write(&self.path, "")?;
        }
        debug!(path = %self.path.display(), "history cleared");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> HistoryStore {
        HistoryStore::new(tmp.path().join("history").join("history.log"))
    }

    fn fields(pairs: &[(&str, &str)]) -> SessionConfig {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(!store.exists());
        assert!(store.all().unwrap().is_empty());
        assert_eq!(store.tail(10).unwrap(), Vec::<String>::new());
        assert_eq!(store.find("port", "1").unwrap(), FindOutcome::NoHistory);
    }

    #[test]
    fn test_append_creates_and_numbers() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let f = fields(&[("payload_type", "reverse_shell")]);

        assert_eq!(store.append(&f, EntryStatus::Fail).unwrap(), 1);
        assert_eq!(store.append(&f, EntryStatus::Success).unwrap(), 2);
        assert!(store.exists());

        let lines = store.all().unwrap();
        assert!(lines[0].starts_with("1. payload_type=reverse_shell timestamp="));
        assert!(lines[0].ends_with(" FAIL"));
        assert!(lines[1].ends_with(" SUCCESS"));
        assert_eq!(HistoryEntry::parse(&lines[1]).unwrap().status, EntryStatus::Success);
    }

    #[test]
    fn test_range_top_bottom() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        for port in ["1", "2", "3", "4"] {
            store
                .append(&fields(&[("payload_type", "reverse_shell"), ("port", port)]), EntryStatus::Success)
                .unwrap();
        }

        let top = store.range(Direction::Top, 2).unwrap();
        assert!(top[0].starts_with("1. ") && top[1].starts_with("2. "));
        let bottom = store.range(Direction::Bottom, 2).unwrap();
        assert!(bottom[0].starts_with("3. ") && bottom[1].starts_with("4. "));
        assert_eq!(store.range(Direction::Bottom, 99).unwrap().len(), 4);
        assert!(store.range(Direction::Top, 0).unwrap().is_empty());
        assert_eq!("bottom".parse::<Direction>().unwrap(), Direction::Bottom);
        assert!("middle".parse::<Direction>().is_err());
    }

    #[test]
    fn test_find_is_exact_per_field() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store
            .append(&fields(&[("payload_type", "reverse_shell"), ("port", "4444")]), EntryStatus::Success)
            .unwrap();
        store
            .append(&fields(&[("payload_type", "reverse_shell"), ("port", "44")]), EntryStatus::Fail)
            .unwrap();

        match store.find("port", "44").unwrap() {
            FindOutcome::Found(lines) => {
                assert_eq!(lines.len(), 1);
                assert!(lines[0].starts_with("2. "));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.find("port", "8080").unwrap(), FindOutcome::NoMatches);
    }

    #[test]
    fn test_restore_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let f = fields(&[
            ("payload_type", "reverse_shell"),
            ("ip", "10.0.0.5"),
            ("port", "4444"),
            ("watermark", "a=b"),
        ]);
        let serial = store.append(&f, EntryStatus::Success).unwrap();
        assert_eq!(store.restore(serial).unwrap(), f);
    }

    #[test]
    fn test_restore_errors() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(matches!(store.restore(1), Err(PbxError::NoSuchSerial { serial: 1 })));

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "1. payload_type=reverse_shell\n").unwrap();
        assert!(matches!(
            store.restore(1),
            Err(PbxError::MalformedEntry { serial: 1, .. })
        ));
        assert!(matches!(store.restore(11), Err(PbxError::NoSuchSerial { serial: 11 })));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store
            .append(&fields(&[("payload_type", "downloader")]), EntryStatus::Fail)
            .unwrap();

        assert!(!store.clear_if(|| Ok(false)).unwrap());
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.clear_if(|| Err(PbxError::UserAbort)).is_err());
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.clear_if(|| Ok(true)).unwrap());
        assert!(store.is_empty().unwrap());
        assert_eq!(store.find("payload_type", "downloader").unwrap(), FindOutcome::NoHistory);

        assert_eq!(
            store.append(&fields(&[("payload_type", "downloader")]), EntryStatus::Fail).unwrap(),
            1
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_serials_are_sequential(statuses in proptest::collection::vec(any::<bool>(), 1..12)) {
            let tmp = TempDir::new().unwrap();
            let store = store(&tmp);
            for (i, ok) in statuses.iter().enumerate() {
                let status = if *ok { EntryStatus::Success } else { EntryStatus::Fail };
                let serial = store.append(&fields(&[("payload_type", "reverse_shell")]), status).unwrap();
                prop_assert_eq!(serial as usize, i + 1);
            }
            for (i, line) in store.all().unwrap().iter().enumerate() {
                let entry = HistoryEntry::parse(line).unwrap();
                prop_assert_eq!(entry.serial as usize, i + 1);
            }
        }

        #[test]
        fn prop_restore_returns_appended_fields(
            values in proptest::collection::vec("[A-Za-z0-9_./:=-]{0,12}", 1..6)
        ) {
            let tmp = TempDir::new().unwrap();
            let store = store(&tmp);
            let mut f = SessionConfig::new();
            f.insert("payload_type", "reverse_shell");
            for (i, v) in values.iter().enumerate() {
                f.insert(format!("opt{}", i), v.as_str());
            }
            let serial = store.append(&f, EntryStatus::Success).unwrap();
            let restored = store.restore(serial).unwrap();
            prop_assert_eq!(restored.len(), f.len());
            prop_assert_eq!(restored, f);
        }

        #[test]
        fn prop_find_matches_exact_field(ports in proptest::collection::vec(1u16..200, 1..10), probe in 1u16..200) {
            let tmp = TempDir::new().unwrap();
            let store = store(&tmp);
            for port in &ports {
                store.append(&fields(&[("payload_type", "reverse_shell"), ("port", port.to_string().as_str())]), EntryStatus::Success).unwrap();
            }
            let expected: Vec<usize> = ports
                .iter()
                .enumerate()
                .filter(|(_, p)| **p == probe)
                .map(|(i, _)| i + 1)
                .collect();
            match store.find("port", &probe.to_string()).unwrap() {
                FindOutcome::Found(lines) => {
                    let serials: Vec<usize> = lines
                        .iter()
                        .map(|l| HistoryEntry::parse(l).unwrap().serial as usize)
                        .collect();
                    prop_assert_eq!(serials, expected);
                }
                FindOutcome::NoMatches => prop_assert!(expected.is_empty()),
                FindOutcome::NoHistory => prop_assert!(false, "store is not empty"),
            }
        }
    }
}
