//! Insertion-ordered option mapping.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::profile::PAYLOAD_TYPE;

/// Ordered mapping of option name to string value.
///
/// Keys keep the order in which they were first inserted; overwriting a key
/// keeps its original position. Serializes as a JSON/TOML object in that
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    entries: Vec<(String, String)>,
}

impl SessionConfig {
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite `key`, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every key
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Key/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// The selected payload type, if any
    pub fn payload_type(&self) -> Option<&str> {
        self.get(PAYLOAD_TYPE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = SessionConfig::new();
        for (k, v) in iter {
            config.insert(k, v);
        }
        config
    }
}

impl Serialize for SessionConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct SessionConfigVisitor;

impl<'de> Visitor<'de> for SessionConfigVisitor {
    type Value = SessionConfig;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of option names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut config = SessionConfig::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            config.insert(key, value);
        }
        Ok(config)
    }
}

impl<'de> Deserialize<'de> for SessionConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SessionConfigVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut config = SessionConfig::new();
        config.insert("payload_type", "reverse_shell");
        config.insert("ip", "10.0.0.5");
        config.insert("port", "4444");
        assert_eq!(config.insert("ip", "10.0.0.6"), Some("10.0.0.5".to_string()));

        let keys: Vec<&str> = config.keys().collect();
        assert_eq!(keys, vec!["payload_type", "ip", "port"]);
        assert_eq!(config.get("ip"), Some("10.0.0.6"));
        assert_eq!(config.payload_type(), Some("reverse_shell"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut config: SessionConfig = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(config.remove("a"), Some("1".to_string()));
        assert_eq!(config.remove("a"), None);
        assert_eq!(config.len(), 1);
        config.clear();
        assert!(config.is_empty());
    }

    #[test]
    fn test_json_preserves_order() {
        let config: SessionConfig = [("payload_type", "downloader"), ("platform", "linux"), ("language", "bash")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"payload_type":"downloader","platform":"linux","language":"bash"}"#
        );

        let back: SessionConfig = serde_json::from_str(r#"{"z":"1","a":"2"}"#).unwrap();
        let keys: Vec<&str> = back.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_rejects_non_string_values() {
        assert!(serde_json::from_str::<SessionConfig>(r#"{"port":4444}"#).is_err());
    }
}
