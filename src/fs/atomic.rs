//! Atomic file publication for lock files.
//!
//! Readers of a lock file must never observe a half-written process id, so
//! both write paths stage the content in a temporary sibling first:
//!
//! 1. Write content to `.{filename}.{pid}.{n}.tmp` in the same directory
//! 2. Sync the temporary file to disk (fsync)
//! 3. Publish it:
//!    - [`atomic_write`] renames over the target (create or replace)
//!    - [`atomic_create`] hard-links to the target, which fails with
//!      `AlreadyExists` when the target is present
//!
//! Source and destination must be on the same filesystem. On crash a
//! temporary file may remain; it never has the lock file's name.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically create or replace `path` with `content`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = stage(path, content)?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    sync_parent(path);
    Ok(())
}

/// Atomically create `path` with `content`, failing with
/// [`io::ErrorKind::AlreadyExists`] if it is already present.
///
/// Filesystems without hard-link support (`link(2)` answering `ENOTSUP`,
/// or `EPERM` as vfat and exfat do) fall back to an exclusive `create_new`
/// followed by a write, which is exclusive but may briefly expose an empty
/// file. A genuine permission problem fails the fallback the same way.
pub fn atomic_create(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = stage(path, content)?;

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);

    match linked {
        Ok(()) => {
            sync_parent(path);
            Ok(())
        }
        Err(e) if hard_links_unavailable(&e) => create_new_fallback(path, content),
        Err(e) => Err(e),
    }
}

fn hard_links_unavailable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
    )
}

fn create_new_fallback(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

/// Write `content` to a fresh temporary sibling of `target` and sync it.
fn stage(target: &Path, content: &[u8]) -> io::Result<PathBuf> {
    let temp_path = temp_path_for(target)?;

    let result = File::create(&temp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(temp_path)
}

/// Temporary names embed the pid and a per-process counter so concurrent
/// writers (other processes or other threads) never share a staging file.
fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid file path"))?;

    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    Ok(parent.join(format!(".{}.{}.{}.tmp", filename, std::process::id(), n)))
}

/// Best-effort sync of the directory entry. Opening a directory fails on
/// Windows, which simply skips the sync.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftover_temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("jobs");

        atomic_write(&file_path, b"1234").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "1234");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("jobs");
        fs::write(&file_path, "99999").unwrap();

        atomic_write(&file_path, b"1234").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "1234");
    }

    #[test]
    fn test_atomic_write_missing_parent_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("missing").join("jobs");

        let err = atomic_write(&file_path, b"1234").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_atomic_create_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("jobs");

        atomic_create(&file_path, b"1234").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "1234");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_create_refuses_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("jobs");
        fs::write(&file_path, "4321").unwrap();

        let err = atomic_create(&file_path, b"1234").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "4321");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_create_has_single_winner() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("contended");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = file_path.clone();
                std::thread::spawn(move || atomic_create(&path, format!("{}", i).as_bytes()).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        let content = fs::read_to_string(&file_path).unwrap();
        assert!(content.parse::<u32>().unwrap() < 8);
    }

    #[test]
    fn test_link_refusals_trigger_fallback() {
        let refused = |kind: io::ErrorKind| hard_links_unavailable(&io::Error::from(kind));

        assert!(refused(io::ErrorKind::Unsupported));
        assert!(refused(io::ErrorKind::PermissionDenied));
        assert!(!refused(io::ErrorKind::AlreadyExists));
        assert!(!refused(io::ErrorKind::NotFound));
    }

    #[test]
    fn test_create_new_fallback_is_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("jobs");

        create_new_fallback(&file_path, b"1234").unwrap();
        let err = create_new_fallback(&file_path, b"5678").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "1234");
    }
}
