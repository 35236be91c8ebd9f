//! Session state: the ordered option mapping being built in one shell run,
//! the rules that guard every assignment, and the cross-field validator.

pub mod config;
pub mod state;
pub mod validator;

pub use config::SessionConfig;
pub use state::{parse_assignments, Assignment, Session};
pub use validator::validate_config;
