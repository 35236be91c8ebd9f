//! Session transcript logging.
//!
//! Diagnostics go through `tracing`; [`Logger`] additionally keeps a
//! markdown record of what the operator did.
//!
//! # Example
//!
//! ```no_run
//! use pbx::observability::Logger;
//! use std::path::Path;
//!
//! let logger = Logger::new(None, Some("DEBUG")).unwrap();
//! logger
//!     .log_session_start(Path::new("history.txt"), &["reverse_shell"])
//!     .unwrap();
//! logger.log_session_end("exit").unwrap();
//! ```

pub mod logger;

pub use logger::Logger;
