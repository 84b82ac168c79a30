//! CLI command implementations.

pub mod complete;
pub mod config;
pub mod credentials;
