//! Named session configs saved as JSON files.

use std::fs;
use std::path::PathBuf;
use tracing::debug;

use super::atomic::AtomicOps;
use crate::error::{PbxError, PbxResult};
use crate::profile::{ProfileRegistry, PAYLOAD_TYPE};
use crate::session::SessionConfig;

/// Directory of `<name>.json` session configs
#[derive(Debug, Clone)]
pub struct SavedConfigStore {
    dir: PathBuf,
}

impl SavedConfigStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn validate_name(name: &str) -> PbxResult<()> {
        let ok = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if ok {
            Ok(())
        } else {
            Err(PbxError::InvalidName {
                name: name.to_string(),
            })
        }
    }

    /// File backing `name`
    pub fn path_for(&self, name: &str) -> PbxResult<PathBuf> {
        Self::validate_name(name)?;
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Write `config` under `name`, replacing any previous save
    pub fn save(&self, name: &str, config: &SessionConfig) -> PbxResult<PathBuf> {
        let path = self.path_for(name)?;
        AtomicOps::write_json(&path, config)?;
        debug!(name, path = %path.display(), "config saved");
        Ok(path)
    }

    /// Read `name` back, checking it against the registry.
    ///
    /// The result always starts with `payload_type`, and every other key
    /// belongs to that profile.
    pub fn load(&self, name: &str, registry: &ProfileRegistry) -> PbxResult<SessionConfig> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(PbxError::ConfigNotFound {
                name: name.to_string(),
            });
        }

        let corrupt = |message: String| PbxError::CorruptConfig {
            name: name.to_string(),
            message,
        };

        let content = fs::read_to_string(&path)?;
        let loaded: SessionConfig =
            serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;

        let payload_type = loaded
            .payload_type()
            .ok_or_else(|| corrupt(format!("missing {}", PAYLOAD_TYPE)))?;
        let profile = registry
            .get_profile(payload_type)
            .map_err(|e| corrupt(e.to_string()))?;

        let mut ordered = SessionConfig::new();
        ordered.insert(PAYLOAD_TYPE, payload_type);
        for (key, value) in loaded.iter().filter(|(k, _)| *k != PAYLOAD_TYPE) {
            if !profile.allows(key) {
                return Err(corrupt(format!(
                    "option '{}' is not part of {}",
                    key, profile.name
                )));
            }
            ordered.insert(key, value);
        }

        debug!(name, keys = ordered.len(), "config loaded");
        Ok(ordered)
    }
}
