//! Core types and infrastructure for tubescribe.
//!
//! Shared foundation for the workspace: configuration loading, the unified
//! error type, logging setup, the metadata schema, and YouTube URL parsing.

pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod youtube;

pub use error::{AppError, AppResult, UpstreamReason};
