//! Core utilities for the PHD communication engine
//!
//! This crate provides fundamental types and utilities used across the
//! agent/manager stack: roles, states, the invoke-tracking error kind, and
//! logging setup.

/// Git version string, set at compile time
pub const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");
/// Stack version followed by git version string, e.g., "0.1.0-aabbccdd"
pub const STACK_VERSION: &str = const_format::formatcp!("{}-{}", env!("CARGO_PKG_VERSION"), GIT_VERSION);

pub mod debug;
pub mod error;
pub mod role;
pub mod state;
pub mod timers;

pub use error::EngineError;
pub use role::Role;
pub use state::State;
