//! Whole-file persistence helpers and the named saved-config store.

pub mod atomic;
pub mod saved;

pub use atomic::{AtomicFileWriter, AtomicOps};
pub use saved::SavedConfigStore;
