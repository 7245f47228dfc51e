//! Pagewalk library
//!
//! Exposes the CLI plumbing for integration testing

pub mod cli;
pub mod config;
pub mod errors;

pub use config::Config;
pub use errors::ConfigError;
