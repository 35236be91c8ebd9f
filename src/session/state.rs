//! The session state machine.
//!
//! `payload_type` is always the first key of a session. Once set it stays
//! fixed until [`Session::reset`] or a wholesale [`Session::replace`]. Every
//! other assignment is checked against the active profile and then applied
//! to a trial copy that must pass [`validate_config`] before it replaces the
//! live mapping.

use tracing::debug;

use super::config::SessionConfig;
use super::validator::validate_config;
use crate::error::{PbxError, PbxResult};
use crate::lexer::{split_segments, split_words};
use crate::profile::{Profile, ProfileRegistry, PAYLOAD_TYPE};

const SET_USAGE: &str = "set OPTION VALUE[, OPTION VALUE...] | set history SERIAL";

/// One `OPTION VALUE` pair parsed from a `set` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Lower-cased option name
    pub option: String,
    /// Value exactly as typed (quotes removed)
    pub value: String,
}

impl Assignment {
    /// Create an assignment, normalizing the option name
    pub fn new(option: &str, value: &str) -> Self {
        Self {
            option: option.to_ascii_lowercase(),
            value: value.to_string(),
        }
    }
}

/// Parse the argument text of `set` into assignments.
///
/// Segments are separated by commas outside quotes; each segment is either
/// `OPTION VALUE` or `OPTION=VALUE`. Blank segments are skipped.
pub fn parse_assignments(args: &str) -> PbxResult<Vec<Assignment>> {
    let mut assignments = Vec::new();

    for (_, segment) in split_segments(args) {
        let words = split_words(segment).map_err(|e| {
            PbxError::validation(vec![format!("Could not parse '{}': {}.", segment.trim(), e)])
        })?;

        let assignment = match words.as_slice() {
            [] => continue,
            [single] => match single.split_once('=') {
                Some((option, value)) if !option.is_empty() => Assignment::new(option, value),
                _ => {
                    return Err(PbxError::usage(format!(
                        "{} (missing value for '{}')",
                        SET_USAGE, single
                    )))
                }
            },
            [option, value] => Assignment::new(option, value),
            _ => {
                return Err(PbxError::usage(format!(
                    "{} (quote values that contain spaces)",
                    SET_USAGE
                )))
            }
        };
        assignments.push(assignment);
    }

    if assignments.is_empty() {
        return Err(PbxError::usage(SET_USAGE));
    }
    Ok(assignments)
}

/// Owned state of one shell run
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    recorded: bool,
}

impl Session {
    /// Fresh, empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mapping
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Selected payload type, if any
    pub fn payload_type(&self) -> Option<&str> {
        self.config.payload_type()
    }

    /// Profile for the selected payload type
    pub fn active_profile<'r>(&self, registry: &'r ProfileRegistry) -> PbxResult<&'r Profile> {
        let name = self.payload_type().ok_or(PbxError::NoProfileSelected)?;
        registry.get_profile(name)
    }

    /// Whether the current state has already been written to history
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// Note that the current state has a history entry
    pub fn mark_recorded(&mut self) {
        self.recorded = true;
    }

    /// Select the profile. Only allowed while no payload type is set.
    pub fn set_payload_type(&mut self, registry: &ProfileRegistry, name: &str) -> PbxResult<()> {
        let profile = registry.get_profile(name)?;
        if let Some(current) = self.payload_type() {
            return Err(PbxError::ProfileAlreadySet {
                current: current.to_string(),
            });
        }

        let mut fresh = SessionConfig::new();
        fresh.insert(PAYLOAD_TYPE, profile.name.as_str());
        for (k, v) in self.config.iter() {
            fresh.insert(k, v);
        }
        self.config = fresh;
        self.recorded = false;
        debug!(payload_type = name, "payload type selected");
        Ok(())
    }

    /// Assign one option of the active profile
    pub fn set_option(&mut self, registry: &ProfileRegistry, name: &str, value: &str) -> PbxResult<()> {
        let name = name.to_ascii_lowercase();
        if name == PAYLOAD_TYPE {
            return self.set_payload_type(registry, value);
        }

        let profile = self.active_profile(registry)?;
        if !profile.allows(&name) {
            return Err(PbxError::UnknownOption {
                option: name,
                profile: profile.name.clone(),
            });
        }

        let spec = registry.option_spec(&name);
        if !spec.accepts(value) {
            return Err(PbxError::InvalidValue {
                option: name,
                value: value.to_string(),
                allowed: spec.values().join(", "),
            });
        }

        let mut trial = self.config.clone();
        trial.insert(name.as_str(), value);
        let errors = validate_config(&trial);
        if !errors.is_empty() {
            return Err(PbxError::validation(errors));
        }

        self.config = trial;
        self.recorded = false;
        debug!(option = %name, value, "option set");
        Ok(())
    }

    /// Apply a parsed assignment
    pub fn apply(&mut self, registry: &ProfileRegistry, assignment: &Assignment) -> PbxResult<()> {
        self.set_option(registry, &assignment.option, &assignment.value)
    }

    /// Clear every key
    pub fn reset(&mut self) {
        self.config.clear();
        self.recorded = false;
    }

    /// Replace the whole mapping, bypassing the first-assignment rule
    pub fn replace(&mut self, config: SessionConfig) {
        self.config = config;
        self.recorded = false;
    }

    /// Defaults merged with the current values; current values win
    pub fn snapshot(&self, profile: &Profile) -> SessionConfig {
        let mut merged = self.config.clone();
        for (k, v) in &profile.defaults {
            if !merged.contains_key(k) {
                merged.insert(k.as_str(), v.as_str());
            }
        }
        merged
    }

    /// Required options that are still empty after merging with defaults
    pub fn missing_required(&self, profile: &Profile) -> Vec<String> {
        let merged = self.snapshot(profile);
        profile
            .required
            .iter()
            .filter(|opt| merged.get(opt).map_or(true, str::is_empty))
            .cloned()
            .collect()
    }
}
