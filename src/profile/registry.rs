//! Profile and option schema types plus the registry that owns them.

use crate::error::{PbxError, PbxResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// The option that selects the active profile. Always the first key set.
pub const PAYLOAD_TYPE: &str = "payload_type";

/// Schema for one payload type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Payload type name, e.g. `reverse_shell`
    pub name: String,
    /// Options that must have a value (after defaults) before a build
    pub required: Vec<String>,
    /// Options that may be set but are not needed for a build
    #[serde(default)]
    pub optional: Vec<String>,
    /// Values used for any option the session leaves unset
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

impl Profile {
    /// Build a profile from static slices
    pub fn new(
        name: &str,
        required: &[&str],
        optional: &[&str],
        defaults: &[(&str, &str)],
    ) -> Self {
        Self {
            name: name.to_string(),
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
            defaults: defaults
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Required then optional option names
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(String::as_str)
    }

    /// Whether `option` belongs to required ∪ optional
    pub fn allows(&self, option: &str) -> bool {
        self.options().any(|o| o == option)
    }

    /// Whether `option` is required
    pub fn is_required(&self, option: &str) -> bool {
        self.required.iter().any(|o| o == option)
    }

    /// Default value for `option`, if any
    pub fn default_for(&self, option: &str) -> Option<&str> {
        self.defaults.get(option).map(String::as_str)
    }
}

/// Description of a single option, shared by every profile that uses it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Option name
    #[serde(default)]
    pub name: String,
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// Enumerated values with their descriptions, or `None` for free text
    #[serde(default, rename = "allowed")]
    pub allowed_values: Option<BTreeMap<String, String>>,
}

impl OptionSpec {
    /// A free-text option
    pub fn free_text(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            allowed_values: None,
        }
    }

    /// An option restricted to the given values
    pub fn enumerated(name: &str, description: &str, values: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            allowed_values: Some(
                values
                    .iter()
                    .map(|(v, d)| (v.to_string(), d.to_string()))
                    .collect(),
            ),
        }
    }

    /// Fallback used for profile options that have no catalogue entry
    pub fn generic(name: &str) -> Self {
        Self::free_text(name, "No description available.")
    }

    /// Whether the option takes free text
    pub fn is_free_text(&self) -> bool {
        self.allowed_values.is_none()
    }

    /// Whether `value` is acceptable for this option's value set
    pub fn accepts(&self, value: &str) -> bool {
        match &self.allowed_values {
            Some(values) => values.contains_key(value),
            None => true,
        }
    }

    /// Enumerated values, empty for free text
    pub fn values(&self) -> Vec<&str> {
        self.allowed_values
            .as_ref()
            .map(|v| v.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    profiles: Vec<Profile>,
    #[serde(default)]
    options: BTreeMap<String, OptionSpec>,
}

/// Option names are matched after lower-casing what the operator typed, so
/// a name with upper-case letters could never be set.
fn check_option_name(name: &str, owner: &str) -> PbxResult<()> {
    if name.is_empty() || name != name.to_ascii_lowercase() {
        return Err(PbxError::registry(format!(
            "option name '{}' in '{}' must be non-empty lower case",
            name, owner
        )));
    }
    Ok(())
}

/// Read-only registry of profiles and option specs
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
    options: BTreeMap<String, OptionSpec>,
}

impl ProfileRegistry {
    /// Create a registry, checking that the profile set is well formed
    pub fn new(profiles: Vec<Profile>, options: Vec<OptionSpec>) -> PbxResult<Self> {
        if profiles.is_empty() {
            return Err(PbxError::registry("at least one profile is required"));
        }

        let mut seen = BTreeSet::new();
        for profile in &profiles {
            if profile.name.is_empty() || profile.name == PAYLOAD_TYPE {
                return Err(PbxError::registry(format!(
                    "invalid profile name '{}'",
                    profile.name
                )));
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(PbxError::registry(format!(
                    "duplicate profile '{}'",
                    profile.name
                )));
            }
            let mut names = BTreeSet::new();
            for option in profile.options().chain(profile.defaults.keys().map(String::as_str)) {
                check_option_name(option, &profile.name)?;
            }
            for option in profile.options() {
                if option == PAYLOAD_TYPE {
                    return Err(PbxError::registry(format!(
                        "profile '{}' must not list {}",
                        profile.name, PAYLOAD_TYPE
                    )));
                }
                if !names.insert(option) {
                    return Err(PbxError::registry(format!(
                        "option '{}' appears twice in profile '{}'",
                        option, profile.name
                    )));
                }
            }
        }

        for spec in &options {
            check_option_name(&spec.name, "options")?;
        }

        Ok(Self::from_parts(profiles, options))
    }

    fn from_parts(profiles: Vec<Profile>, options: Vec<OptionSpec>) -> Self {
        Self {
            profiles,
            options: options.into_iter().map(|o| (o.name.clone(), o)).collect(),
        }
    }

    /// The registry compiled into the binary
    pub fn builtin() -> Self {
        Self::from_parts(super::builtin::profiles(), super::builtin::options())
    }

    /// Parse a registry definition from TOML
    pub fn from_toml_str(content: &str) -> PbxResult<Self> {
        let file: RegistryFile = toml::from_str(content)
            .map_err(|e| PbxError::registry(format!("failed to parse profiles: {}", e)))?;

        let options = file
            .options
            .into_iter()
            .map(|(name, mut spec)| {
                spec.name = name;
                spec
            })
            .collect();

        Self::new(file.profiles, options)
    }

    /// Load a registry definition file
    pub fn load(path: &Path) -> PbxResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Look up a profile by payload type name
    pub fn get_profile(&self, name: &str) -> PbxResult<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PbxError::UnknownProfile {
                name: name.to_string(),
            })
    }

    /// Registered payload type names in definition order
    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// All profiles
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Resolve the spec for any option name. Never fails: `payload_type`
    /// enumerates the registered profiles and unknown names fall back to a
    /// generic free-text spec.
    pub fn option_spec(&self, name: &str) -> OptionSpec {
        if name == PAYLOAD_TYPE {
            let description = self
                .options
                .get(PAYLOAD_TYPE)
                .map(|s| s.description.clone())
                .unwrap_or_else(|| "Kind of payload to generate.".to_string());
            let allowed = self
                .profiles
                .iter()
                .map(|p| {
                    let req = if p.required.is_empty() {
                        "no required options".to_string()
                    } else {
                        format!("requires {}", p.required.join(", "))
                    };
                    (p.name.clone(), req)
                })
                .collect();
            return OptionSpec {
                name: PAYLOAD_TYPE.to_string(),
                description,
                allowed_values: Some(allowed),
            };
        }

        self.options
            .get(name)
            .cloned()
            .unwrap_or_else(|| OptionSpec::generic(name))
    }

    /// Every option name referenced by any profile, plus `payload_type`
    pub fn known_options(&self) -> Vec<&str> {
        let mut names = vec![PAYLOAD_TYPE];
        for profile in &self.profiles {
            for option in profile.options() {
                if !names.contains(&option) {
                    names.push(option);
                }
            }
        }
        names
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_well_formed() {
        let builtin = ProfileRegistry::builtin();
        let checked = ProfileRegistry::new(
            builtin.profiles().to_vec(),
            builtin.options.values().cloned().collect(),
        );
        assert!(checked.is_ok());
        assert_eq!(builtin.list_profiles(), vec!["reverse_shell", "downloader"]);
    }

    #[test]
    fn test_get_profile() {
        let registry = ProfileRegistry::builtin();
        let profile = registry.get_profile("reverse_shell").unwrap();
        assert!(profile.is_required("port"));
        assert!(profile.allows("watermark"));
        assert!(!profile.allows("download_url"));
        assert_eq!(profile.default_for("build_mode"), Some("debug"));

        assert!(matches!(
            registry.get_profile("keylogger"),
            Err(PbxError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn test_option_spec_fallbacks() {
        let registry = ProfileRegistry::builtin();

        let pt = registry.option_spec(PAYLOAD_TYPE);
        assert_eq!(pt.values(), vec!["downloader", "reverse_shell"]);

        let port = registry.option_spec("port");
        assert!(port.is_free_text());
        assert!(port.accepts("anything"));

        let platform = registry.option_spec("platform");
        assert!(platform.accepts("macos"));
        assert!(!platform.accepts("MACOS"));

        let unknown = registry.option_spec("not_catalogued");
        assert_eq!(unknown.name, "not_catalogued");
        assert!(unknown.is_free_text());
    }

    #[test]
    fn test_every_profile_option_resolves() {
        let registry = ProfileRegistry::builtin();
        for profile in registry.profiles() {
            for option in profile.options() {
                assert!(
                    registry.options.contains_key(option),
                    "{} has no catalogue entry",
                    option
                );
            }
        }
    }

    #[test]
    fn test_from_toml_str() {
        let registry = ProfileRegistry::from_toml_str(
            r#"
[[profiles]]
name = "beacon"
required = ["host", "interval"]
optional = ["jitter"]

[profiles.defaults]
jitter = "0"

[options.jitter]
description = "Randomization percentage"
allowed = { "0" = "none", "10" = "light" }
"#,
        )
        .unwrap();

        assert_eq!(registry.list_profiles(), vec!["beacon"]);
        let jitter = registry.option_spec("jitter");
        assert_eq!(jitter.name, "jitter");
        assert_eq!(jitter.values(), vec!["0", "10"]);
        assert!(registry.option_spec("host").is_free_text());
    }

    #[test]
    fn test_rejects_bad_definitions() {
        let dup = vec![
            Profile::new("a", &["x"], &[], &[]),
            Profile::new("a", &["y"], &[], &[]),
        ];
        assert!(ProfileRegistry::new(dup, vec![]).is_err());

        let overlap = vec![Profile::new("a", &["x"], &["x"], &[])];
        assert!(ProfileRegistry::new(overlap, vec![]).is_err());

        let reserved = vec![Profile::new("a", &[PAYLOAD_TYPE], &[], &[])];
        assert!(ProfileRegistry::new(reserved, vec![]).is_err());

        assert!(ProfileRegistry::new(vec![], vec![]).is_err());

        let upper_default = vec![Profile::new("a", &["x"], &[], &[("X", "1")])];
        assert!(ProfileRegistry::new(upper_default, vec![]).is_err());

        let upper_catalogue = vec![Profile::new("a", &["x"], &[], &[])];
        let spec = OptionSpec::free_text("Mode", "Mixed case");
        assert!(ProfileRegistry::new(upper_catalogue, vec![spec]).is_err());
        assert!(ProfileRegistry::from_toml_str("profiles = 3").is_err());
    }

    #[test]
    fn test_rejects_option_names_that_cannot_be_typed() {
        let err = ProfileRegistry::from_toml_str(
            r#"
[[profiles]]
name = "rs"
required = ["LHOST"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("LHOST"));

        let registry = ProfileRegistry::from_toml_str(
            r#"
[[profiles]]
name = "rs"
required = ["lhost"]
"#,
        )
        .unwrap();
        let mut session = crate::session::Session::new();
        session.set_option(&registry, PAYLOAD_TYPE, "rs").unwrap();
        session.set_option(&registry, "LHOST", "10.0.0.1").unwrap();
        let profile = registry.get_profile("rs").unwrap();
        assert!(session.missing_required(profile).is_empty());
    }
}
