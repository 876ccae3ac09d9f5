//! Resilient file copy into a sync-managed directory.
//!
//! The vault directory may be held by a background sync client that
//! transiently locks files. Retrying with exponential backoff resolves the
//! overwhelming majority of those cases without surfacing an error; only
//! genuine non-lock failures propagate immediately.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use tubescribe_core::{AppError, AppResult};

/// Default number of copy attempts before giving up.
pub const DEFAULT_COPY_ATTEMPTS: u32 = 8;

/// Default base delay for the exponential backoff.
pub const DEFAULT_COPY_BASE_DELAY: Duration = Duration::from_millis(150);

// ERROR_ACCESS_DENIED, ERROR_SHARING_VIOLATION
#[cfg(windows)]
const LOCK_OS_CODES: [i32; 2] = [5, 32];

// EACCES, EBUSY, ETXTBSY
#[cfg(not(windows))]
const LOCK_OS_CODES: [i32; 3] = [13, 16, 26];

/// Copy `src` over `dst`, retrying on lock-class errors with exponential
/// backoff. Fails with `AppError::Lock` once `attempts` are exhausted;
/// non-lock errors fail immediately with `AppError::Copy`.
pub async fn copy_with_retry(
    src: &Path,
    dst: &Path,
    attempts: u32,
    base_delay: Duration,
) -> AppResult<()> {
    copy_with_retry_using(src, dst, attempts, base_delay, replace_via_temp).await
}

/// Inner implementation with the transfer step injectable for tests.
async fn copy_with_retry_using<F>(
    src: &Path,
    dst: &Path,
    attempts: u32,
    base_delay: Duration,
    mut transfer: F,
) -> AppResult<()>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..attempts {
        if let Some(parent) = dst.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Copy(format!("create {}: {}", parent.display(), e))
                })?;
            }
        }

        match transfer(src, dst) {
            Ok(()) => {
                if attempt > 0 {
                    tracing::debug!(
                        "Copy to {} succeeded on attempt {}",
                        dst.display(),
                        attempt + 1
                    );
                }
                return Ok(());
            }
            Err(e) if is_lock_error(&e) => {
                tracing::debug!(
                    "Copy to {} hit lock on attempt {}: {}",
                    dst.display(),
                    attempt + 1,
                    e
                );
                last_err = Some(e);
                if attempt + 1 < attempts {
                    tokio::time::sleep(backoff_delay(base_delay, attempt)).await;
                }
            }
            Err(e) => {
                return Err(AppError::Copy(format!(
                    "copy to {}: {}",
                    dst.display(),
                    e
                )));
            }
        }
    }

    let cause = last_err
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    Err(AppError::Lock(format!(
        "destination stayed locked after {} attempts: {} ({})",
        attempts,
        dst.display(),
        cause
    )))
}

/// One transfer: copy source bytes to a uniquely named temp file in the
/// destination directory, then atomically rename it over the destination.
/// The temp file is cleaned up on failure regardless of which step broke.
fn replace_via_temp(src: &Path, dst: &Path) -> io::Result<()> {
    let file_name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "copy".to_string());
    let tmp = dst.with_file_name(format!(
        "{}.copytmp.{}",
        file_name,
        uuid::Uuid::new_v4().simple()
    ));

    let result = fs::copy(src, &tmp).and_then(|_| fs::rename(&tmp, dst));
    if result.is_err() {
        fs::remove_file(&tmp).ok();
    }
    result
}

/// Classify an I/O error as a transient lock condition.
fn is_lock_error(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }
    err.raw_os_error()
        .map(|code| LOCK_OS_CODES.contains(&code))
        .unwrap_or(false)
}

/// `base * 2^attempt` plus a jitter that grows linearly with the attempt
/// index to desynchronize concurrent retriers.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * (1u32 << attempt.min(16)) + Duration::from_millis(20) * attempt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn lock_error() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "resource busy")
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_locks() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("dst.md");
        fs::write(&src, "content").unwrap();

        let calls = Cell::new(0u32);
        let result = copy_with_retry_using(
            &src,
            &dst,
            8,
            Duration::from_millis(150),
            |_, _| {
                calls.set(calls.get() + 1);
                if calls.get() <= 3 {
                    Err(lock_error())
                } else {
                    Ok(())
                }
            },
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_and_fails_with_lock() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("dst.md");
        fs::write(&src, "content").unwrap();

        let calls = Cell::new(0u32);
        let result = copy_with_retry_using(
            &src,
            &dst,
            8,
            Duration::from_millis(150),
            |_, _| {
                calls.set(calls.get() + 1);
                Err(lock_error())
            },
        )
        .await;

        assert_eq!(calls.get(), 8);
        match result {
            Err(AppError::Lock(message)) => {
                assert!(message.contains("8 attempts"));
            }
            other => panic!("Expected Lock error, got {:?}", other.err()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_lock_error_propagates_immediately() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("dst.md");
        fs::write(&src, "content").unwrap();

        let calls = Cell::new(0u32);
        let result = copy_with_retry_using(
            &src,
            &dst,
            8,
            Duration::from_millis(150),
            |_, _| {
                calls.set(calls.get() + 1);
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"))
            },
        )
        .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(AppError::Copy(_))));
    }

    #[tokio::test]
    async fn test_real_copy_replaces_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("nested/dst.md");
        fs::write(&src, "new content").unwrap();

        copy_with_retry(&src, &dst, 8, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new content");

        // No temp files left in the destination directory
        let names: Vec<_> = fs::read_dir(dst.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["dst.md"]);
    }

    #[test]
    fn test_lock_classification() {
        assert!(is_lock_error(&lock_error()));
        assert!(!is_lock_error(&io::Error::new(
            io::ErrorKind::NotFound,
            "missing"
        )));
    }

    #[test]
    fn test_backoff_grows_with_attempts() {
        let base = Duration::from_millis(150);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(150));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(320));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(1260));
        assert!(backoff_delay(base, 7) > backoff_delay(base, 6));
    }
}
