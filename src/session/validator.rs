//! Cross-field semantic validation.
//!
//! These rules apply to any mapping regardless of profile, whenever a
//! port-like or address-like key is present.

use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;

use super::config::SessionConfig;

const PORT_KEYS: &[&str] = &["port", "lport"];
const ADDRESS_KEYS: &[&str] = &["ip", "lhost"];

static IPV4: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").expect("valid IPv4 pattern"));
static IPV6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-fA-F]{0,4}:){2,7}[0-9a-fA-F]{0,4}$").expect("valid IPv6 pattern")
});

fn is_one_of(key: &str, set: &[&str]) -> bool {
    set.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn check_port(key: &str, value: &str) -> Option<String> {
    match value.trim().parse::<i64>() {
        Ok(port) if (1..=65535).contains(&port) => None,
        Ok(_) => Some(format!("{} must be between 1 and 65535.", key)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Some(format!("{} must be between 1 and 65535.", key))
        }
        Err(_) => Some(format!("{} must be a valid integer.", key)),
    }
}

fn check_address(key: &str, value: &str) -> Option<String> {
    if IPV4.is_match(value) || IPV6.is_match(value) {
        None
    } else {
        Some(format!("{} must be a valid IPv4 or IPv6 address.", key))
    }
}

/// Run every semantic rule over `config`, returning the violations in key
/// order. An empty result means the mapping is acceptable.
pub fn validate_config(config: &SessionConfig) -> Vec<String> {
    config
        .iter()
        .filter_map(|(key, value)| {
            if is_one_of(key, PORT_KEYS) {
                check_port(key, value)
            } else if is_one_of(key, ADDRESS_KEYS) {
                check_address(key, value)
            } else {
                None
            }
        })
        .collect()
}
