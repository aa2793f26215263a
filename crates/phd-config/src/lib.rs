//! Configuration management for the PHD communication engine
//!
//! - TOML configuration file parsing
//! - Stack configuration structures (timeouts, system identity, configuration catalog)

pub mod stack_config;
pub mod toml_config;

pub use stack_config::*;
pub use toml_config::*;
