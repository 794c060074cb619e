//! Lock key validation.

use crate::error::{MutexError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A single path segment: no separators, no leading dot (which also rules out
/// `.`/`..` and keeps keys apart from staging files), at most 255 bytes.
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]{0,254}$").expect("segment pattern is valid")
});

/// Whether `s` can be embedded as one filesystem path segment.
pub fn is_safe_segment(s: &str) -> bool {
    SEGMENT.is_match(s)
}

/// Name of the resource a mutex protects; doubles as the lock file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockKey(String);

impl LockKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !is_safe_segment(&key) {
            return Err(MutexError::InvalidKey(key));
        }
        Ok(LockKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
