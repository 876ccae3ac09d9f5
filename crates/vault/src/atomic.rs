//! Atomic file writes.
//!
//! The target path is only ever observed with its previous content or its
//! full new content: the write goes to a uniquely named temp file beside
//! the target, is forced to disk, and is then renamed over the target. The
//! temp file must live in the same directory as the target — rename is only
//! atomic within one filesystem.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tubescribe_core::{AppError, AppResult};

/// Atomically write text content to a file.
///
/// On any failure before the rename the temp file is deleted (best-effort)
/// and the original failure surfaces as `AppError::Write`.
pub fn atomic_write(path: &Path, content: &str) -> AppResult<PathBuf> {
    atomic_write_with(path, content, write_durable)
}

/// Inner implementation with the durable-write step injectable, so tests
/// can fail the write mid-flight and observe the target untouched.
fn atomic_write_with<F>(path: &Path, content: &str, write_fn: F) -> AppResult<PathBuf>
where
    F: Fn(&Path, &str) -> io::Result<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Write(format!("create {}: {}", parent.display(), e)))?;
        }
    }

    let tmp = temp_sibling(path);

    let result = write_fn(&tmp, content).and_then(|_| fs::rename(&tmp, path));

    match result {
        Ok(()) => Ok(path.to_path_buf()),
        Err(e) => {
            fs::remove_file(&tmp).ok();
            Err(AppError::Write(format!(
                "atomic write to {}: {}",
                path.display(),
                e
            )))
        }
    }
}

/// Write content and force it to storage before the rename.
fn write_durable(tmp: &Path, content: &str) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Unique temp path in the same directory as `path`. The random suffix
/// keeps concurrent writers to the same target from colliding.
fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(
        "{}.tmp.{}",
        file_name,
        uuid::Uuid::new_v4().simple()
    ))
}
