//! Persistence orchestrator: staging write plus vault copy.
//!
//! The save workflow: existence check against the vault, atomic write into
//! staging (fatal on failure — staging is the reliability floor), then a
//! retried copy into the vault. A vault copy failure is folded into the
//! outcome as degraded durability, never raised: the staged copy is always
//! retrievable.

use std::path::PathBuf;
use std::time::Duration;

use tubescribe_core::schema::{FileSaveOutcome, VideoMetadata};
use tubescribe_core::youtube::{extract_video_id, fallback_video_id};
use tubescribe_core::{AppError, AppResult};

use crate::atomic::atomic_write;
use crate::copy::{copy_with_retry, DEFAULT_COPY_ATTEMPTS, DEFAULT_COPY_BASE_DELAY};
use crate::filename::build_filename;
use crate::markdown::render_markdown;

/// Two-stage markdown store over a staging directory and a vault directory.
pub struct VaultStore {
    staging_dir: PathBuf,
    vault_dir: PathBuf,
    source_label: String,
    copy_attempts: u32,
    copy_base_delay: Duration,
}

impl VaultStore {
    /// Create a store over the given directory pair.
    pub fn new(staging_dir: impl Into<PathBuf>, vault_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            vault_dir: vault_dir.into(),
            source_label: "YouTube".to_string(),
            copy_attempts: DEFAULT_COPY_ATTEMPTS,
            copy_base_delay: DEFAULT_COPY_BASE_DELAY,
        }
    }

    /// Set the source label rendered into the markdown header.
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    /// Override the vault copy retry policy.
    pub fn with_retry_policy(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.copy_attempts = attempts;
        self.copy_base_delay = base_delay;
        self
    }

    /// Save a metadata record as a markdown file.
    ///
    /// Returns a `FileSaveOutcome`; the only hard failure is a staging
    /// write error.
    pub async fn save(
        &self,
        metadata: &VideoMetadata,
        overwrite: bool,
    ) -> AppResult<FileSaveOutcome> {
        // A degraded identifier beats a failed save at this stage
        let video_id = extract_video_id(&metadata.source_url).unwrap_or_else(|_| {
            let fallback = fallback_video_id(&metadata.source_url);
            tracing::debug!(
                "Could not extract video id from {}, using fallback {}",
                metadata.source_url,
                fallback
            );
            fallback
        });

        let filename = build_filename(&metadata.title, &video_id);
        let staging_path = self.staging_dir.join(&filename);
        let vault_path = self.vault_dir.join(&filename);

        if vault_path.exists() && !overwrite {
            tracing::info!(
                "File already exists in vault, skipping: {}",
                vault_path.display()
            );
            let staged_path = staging_path.exists().then_some(staging_path);
            return Ok(FileSaveOutcome {
                vault_path: Some(vault_path),
                filename,
                skipped: true,
                staged_path,
                saved: true,
                error_code: None,
            });
        }

        let content = render_markdown(metadata, &self.source_label);

        // Staging must always succeed; propagate its failure
        atomic_write(&staging_path, &content)?;
        tracing::info!("Saved to staging: {}", staging_path.display());

        // Best-effort vault copy; re-check existence to avoid clobbering
        // a concurrent writer
        let copy_result = if vault_path.exists() && !overwrite {
            tracing::info!(
                "File exists in vault, skipping copy: {}",
                vault_path.display()
            );
            Ok(())
        } else {
            copy_with_retry(
                &staging_path,
                &vault_path,
                self.copy_attempts,
                self.copy_base_delay,
            )
            .await
        };

        match copy_result {
            Ok(()) => {
                tracing::info!("Copied to vault: {}", vault_path.display());
                Ok(FileSaveOutcome {
                    vault_path: Some(vault_path),
                    filename,
                    skipped: false,
                    staged_path: Some(staging_path),
                    saved: true,
                    error_code: None,
                })
            }
            Err(err @ (AppError::Lock(_) | AppError::Copy(_))) => {
                tracing::warn!(
                    "Vault copy failed (staged at {}): {}",
                    staging_path.display(),
                    err
                );
                Ok(FileSaveOutcome {
                    vault_path: None,
                    filename,
                    skipped: false,
                    staged_path: Some(staging_path),
                    saved: false,
                    error_code: Some(err.error_code().to_string()),
                })
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tubescribe_core::schema::VideoMetadata;

    fn sample_metadata() -> VideoMetadata {
        serde_json::from_str(
            r#"{
                "title": "My: Talk?",
                "source_url": "https://www.youtube.com/watch?v=abc12345678",
                "summary": "A short talk.",
                "transcript": "Hello everyone. Goodbye everyone."
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_writes_staging_and_vault() {
        let staging = tempdir().unwrap();
        let vault = tempdir().unwrap();
        let store = VaultStore::new(staging.path(), vault.path());

        let outcome = store.save(&sample_metadata(), false).await.unwrap();

        assert!(outcome.saved);
        assert!(!outcome.skipped);
        assert!(outcome.error_code.is_none());
        assert!(outcome.filename.ends_with("__abc12345678.md"));
        assert!(outcome.filename.contains("my-talk"));

        let staged = outcome.staged_path.unwrap();
        let vaulted = outcome.vault_path.unwrap();
        assert!(staged.exists());
        assert!(vaulted.exists());
        assert_eq!(
            fs::read_to_string(&staged).unwrap(),
            fs::read_to_string(&vaulted).unwrap()
        );
        assert!(fs::read_to_string(&vaulted)
            .unwrap()
            .contains("Hello everyone. Goodbye everyone."));
    }

    #[tokio::test]
    async fn test_second_save_skips_existing_vault_file() {
        let staging = tempdir().unwrap();
        let vault = tempdir().unwrap();
        let store = VaultStore::new(staging.path(), vault.path());
        let metadata = sample_metadata();

        let first = store.save(&metadata, false).await.unwrap();
        assert!(!first.skipped);

        let second = store.save(&metadata, false).await.unwrap();
        assert!(second.skipped);
        assert!(second.saved);
        assert_eq!(second.filename, first.filename);
        assert!(second.vault_path.is_some());
        // The staged copy from the first save is reported
        assert!(second.staged_path.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_vault_file() {
        let staging = tempdir().unwrap();
        let vault = tempdir().unwrap();
        let store = VaultStore::new(staging.path(), vault.path());
        let mut metadata = sample_metadata();

        store.save(&metadata, false).await.unwrap();

        metadata.summary = "An updated summary.".to_string();
        let outcome = store.save(&metadata, true).await.unwrap();

        assert!(!outcome.skipped);
        assert!(outcome.saved);
        let vaulted = outcome.vault_path.unwrap();
        assert!(fs::read_to_string(&vaulted)
            .unwrap()
            .contains("An updated summary."));
    }

    #[tokio::test]
    async fn test_vault_copy_failure_degrades_but_saves_staging() {
        let staging = tempdir().unwrap();
        let parent = tempdir().unwrap();
        // The vault "directory" is actually a file, so every copy attempt
        // fails with a non-lock error
        let vault_path = parent.path().join("vault");
        fs::write(&vault_path, "not a directory").unwrap();

        let store = VaultStore::new(staging.path(), &vault_path)
            .with_retry_policy(2, Duration::from_millis(1));

        let outcome = store.save(&sample_metadata(), false).await.unwrap();

        assert!(!outcome.saved);
        assert!(outcome.vault_path.is_none());
        assert_eq!(outcome.error_code.as_deref(), Some("COPY_ERROR"));

        let staged = outcome.staged_path.unwrap();
        assert!(staged.exists());
        let body = fs::read_to_string(&staged).unwrap();
        assert!(body.contains("# Summary"));
        assert!(body.contains("## Transcript"));
        assert!(body.contains("Hello everyone. Goodbye everyone."));
    }

    #[tokio::test]
    async fn test_unparseable_url_uses_fallback_id() {
        let staging = tempdir().unwrap();
        let vault = tempdir().unwrap();
        let store = VaultStore::new(staging.path(), vault.path());

        let mut metadata = sample_metadata();
        metadata.source_url = "https://example.com/clips/xyzzy123456".to_string();

        let outcome = store.save(&metadata, false).await.unwrap();
        assert!(outcome.saved);
        assert!(outcome.filename.ends_with("__xyzzy123456.md"));
    }
}
