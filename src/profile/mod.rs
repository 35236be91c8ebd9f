//! Profile registry: the static schema behind every payload type.
//!
//! A [`Profile`] names the required and optional options for one payload
//! type together with its default values. [`OptionSpec`]s are shared across
//! profiles and describe each option, including its enumerated values when
//! the option is not free text.

pub mod builtin;
pub mod registry;

pub use registry::{OptionSpec, Profile, ProfileRegistry, PAYLOAD_TYPE};
