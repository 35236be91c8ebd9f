//! Adapter traits for CLI commands
//!
//! Commands reach the terminal, the operator, and the artifact renderer only
//! through these traits, so a whole shell can be driven from tests.

pub mod console;
pub mod prompt;
pub mod renderer;

pub use console::{Console, TerminalConsole};
pub use prompt::{is_affirmative, Prompter};
pub use renderer::{extension_for_language, ManifestRenderer, Renderer};
