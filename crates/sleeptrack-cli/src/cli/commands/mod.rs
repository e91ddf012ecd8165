//! CLI command handlers.

pub mod config;
pub mod history;
pub mod session;
