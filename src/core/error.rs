//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only configuration problems surface as errors. Per-file trouble during an
/// extraction is recorded in the report instead, and per-path trouble during
/// materialization lands in the result's error list.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// The extraction root does not exist.
    #[error("Source path does not exist: {0}")]
    RootNotFound(PathBuf),

    /// Represents a path that was expected to be a directory but was not.
    #[error("Path is not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// An extraction option failed validation.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}
