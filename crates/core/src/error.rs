//! Error types for tubescribe.
//!
//! This module defines a unified error enum that covers all failure
//! categories in the ingestion pipeline: input parsing, transcript
//! retrieval, LLM extraction, and vault persistence.

use thiserror::Error;

/// Why the transcript source could not produce a transcript.
///
/// These mirror the failure modes of the upstream captions API and are
/// surfaced to callers as stable reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamReason {
    /// The video has captions disabled
    Disabled,

    /// No transcript exists in any requested language
    NotFound,

    /// The video is private, deleted, or region-restricted
    Unavailable,

    /// The upstream service rate-limited us
    RateLimited,

    /// The upstream request failed outright
    UpstreamFailure,
}

impl UpstreamReason {
    /// Stable reason code for logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Disabled => "TRANSCRIPTS_DISABLED",
            Self::NotFound => "NO_TRANSCRIPT_FOUND",
            Self::Unavailable => "VIDEO_UNAVAILABLE",
            Self::RateLimited => "RATE_LIMITED",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
        }
    }
}

impl std::fmt::Display for UpstreamReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Unified error type for tubescribe.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparseable URL or video id
    #[error("Invalid input: {0}")]
    Input(String),

    /// The transcript source reported a named failure
    #[error("Transcript unavailable ({reason}): {message}")]
    Upstream {
        reason: UpstreamReason,
        message: String,
    },

    /// LLM output failed schema validation (malformed or unparseable)
    #[error("LLM output validation failed: {0}")]
    Validation(String),

    /// LLM transport failure (network, auth, provider-side error)
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// Staging write failed. Staging is the reliability floor, so this
    /// is a true operational error.
    #[error("Staging write failed: {0}")]
    Write(String),

    /// Vault destination stayed locked after exhausting retries
    #[error("Vault destination stayed locked: {0}")]
    Lock(String),

    /// Vault copy failed for a non-lock reason
    #[error("Vault copy failed: {0}")]
    Copy(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Stable error code for reports and structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Input(_) => "INVALID_URL",
            Self::Upstream { reason, .. } => reason.code(),
            Self::Validation(_) => "LLM_VALIDATION_ERROR",
            Self::Provider(_) => "LLM_PROVIDER_ERROR",
            Self::Write(_) => "STAGING_WRITE_ERROR",
            Self::Lock(_) => "FILE_LOCKED",
            Self::Copy(_) => "COPY_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Construct an upstream error with a reason code.
    pub fn upstream(reason: UpstreamReason, message: impl Into<String>) -> Self {
        Self::Upstream {
            reason,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
