//! Glance Config - Environment variable names and typed parse helpers
//!
//! Centralizes the environment variables read by the Glance crates so that
//! variable names and parsing behavior stay consistent across the workspace.

pub mod constants;
pub mod env;

pub use env::{
    parse_env_bool, parse_env_or_default, parse_env_or_default_with_validation,
    parse_env_with_fallback,
};
