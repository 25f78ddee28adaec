//! Error types for rill toolchain operations.
//!
//! This module defines [`RillError`], the primary error type used throughout
//! the toolchain, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `RillError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `RillError::Other`) for unexpected errors
//! - Rule producers never return errors: they emit diagnostics instead.
//!   Hard errors are reserved for configuration failures that abort a run
//!   before any rule executes.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rill toolchain operations.
#[derive(Debug, Error)]
pub enum RillError {
    /// Workspace manifest not found at the expected location.
    #[error("workspace not found: {path}")]
    WorkspaceNotFound { path: PathBuf },

    /// Failed to parse the workspace manifest.
    #[error("invalid workspace at {path}: {message}")]
    WorkspaceParse { path: PathBuf, message: String },

    /// Workspace manifest parsed but violates the schema.
    #[error("workspace schema error: {message}")]
    WorkspaceSchema { message: String },

    /// The lint run finished with a non-zero error count.
    #[error("lint finished with {errors} error(s)")]
    LintFailed { errors: usize },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for rill toolchain operations.
pub type Result<T> = std::result::Result<T, RillError>;
