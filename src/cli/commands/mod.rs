//! Command handlers
//!
//! Every handler has the [`Handler`](crate::cli::dispatcher::Handler)
//! signature and is reached through the dispatcher's command table.

pub mod build;
pub mod config;
pub mod history;
pub mod list;
pub mod misc;
pub mod set;
