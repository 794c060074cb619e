//! Settings loading, validation, and path resolution.

use super::model::{ENV_VAR_ENVIRONMENT, ENV_VAR_ROOT, LOCK_DIR_PREFIX, Settings};
use crate::error::{MutexError, Result};
use crate::mutex::is_safe_segment;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Settings {
    /// Settings for `environment` with every other field at its default.
    pub fn for_environment(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..Self::default()
        }
    }

    /// Load settings from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            MutexError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| MutexError::Config(format!("failed to parse config YAML: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| MutexError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Apply `FSMUTEX_ENV` / `FSMUTEX_ROOT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup(ENV_VAR_ENVIRONMENT).filter(|v| !v.is_empty()) {
            self.environment = env;
        }
        if let Some(root) = lookup(ENV_VAR_ROOT).filter(|v| !v.is_empty()) {
            self.root = Some(PathBuf::from(root));
        }
    }

    /// Validate settings values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `environment` must be usable as a single path segment
    /// - `max_wait_ms` must be positive
    /// - `poll_interval_ms` must be positive
    pub fn validate(&self) -> Result<()> {
        if !is_safe_segment(&self.environment) {
            return Err(MutexError::Config(format!(
                "environment '{}' must be non-empty and contain only ASCII letters, digits, '.', '_' or '-'",
                self.environment
            )));
        }

        if self.max_wait_ms == 0 {
            return Err(MutexError::Config(
                "max_wait_ms must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(MutexError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Directory holding this environment's lock files.
    pub fn lock_dir(&self) -> PathBuf {
        let root = self.root.clone().unwrap_or_else(std::env::temp_dir);
        root.join(format!("{}{}", LOCK_DIR_PREFIX, self.environment))
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
