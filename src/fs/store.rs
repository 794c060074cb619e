//! The filesystem surface the mutex depends on.

use super::atomic::{atomic_create, atomic_write};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Filesystem operations used by the lock protocol.
///
/// Errors are plain [`io::Error`]s so callers can decide how to treat
/// `NotFound` and `AlreadyExists`.
pub trait FileStore {
    /// Create `path` and all missing ancestors; no-op if present.
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8. Fails with `NotFound` if absent.
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Create or replace the file; readers never observe a partial write.
    fn write_text(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create the file only if absent, failing with `AlreadyExists`
    /// otherwise. Readers never observe a partial write.
    fn create_new_text(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Remove the file. Fails with `NotFound` if absent.
    fn delete(&self, path: &Path) -> io::Result<()>;

    /// Last modification time. Fails with `NotFound` if absent.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Names of the regular files directly inside `dir`, in no particular
    /// order. Names that are not valid UTF-8 are left out. Fails with
    /// `NotFound` if `dir` is absent.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;
}

/// [`FileStore`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        atomic_write(path, content.as_bytes())
    }

    fn create_new_text(&self, path: &Path, content: &str) -> io::Result<()> {
        atomic_create(path, content.as_bytes())
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        Ok(names)
    }
}
