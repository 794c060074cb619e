//! Settings struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding [`Settings::environment`].
pub const ENV_VAR_ENVIRONMENT: &str = "FSMUTEX_ENV";

/// Environment variable overriding [`Settings::root`].
pub const ENV_VAR_ROOT: &str = "FSMUTEX_ROOT";

/// Prefix of the per-environment lock directory name.
pub const LOCK_DIR_PREFIX: &str = "fsmutex-";

/// Settings shared by every mutex in one deployment environment.
///
/// Lock files live in `{root}/fsmutex-{environment}/`. Unknown fields in the
/// YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deployment environment name; selects the lock directory.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Parent of the lock directory. `None` means the OS temp directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// How long acquisition polls before checking the holder's liveness.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,

    /// Delay between existence checks while waiting.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            root: None,
            max_wait_ms: default_max_wait_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_environment() -> String {
    "development".to_string()
}
pub(crate) fn default_max_wait_ms() -> u64 {
    2000
}
pub(crate) fn default_poll_interval_ms() -> u64 {
    1000
}
