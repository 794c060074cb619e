//! Configuration model for fsmutex.
//!
//! This module defines the [`Settings`] struct that controls where lock files
//! live and how long acquisition waits. It supports forward-compatible YAML
//! parsing (unknown fields are ignored), defaults for every field,
//! environment-variable overrides and validation.

mod model;
mod operations;


// Re-export public API
pub use model::{ENV_VAR_ENVIRONMENT, ENV_VAR_ROOT, LOCK_DIR_PREFIX, Settings};
