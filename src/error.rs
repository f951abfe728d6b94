//! Error types for set_version.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for set_version operations.
#[derive(Error, Debug)]
pub enum SetVersionError {
    // Detection errors
    #[error(
        "No version could be detected in '{}' using pattern '{pattern}'",
        .dir.display()
    )]
    Detection { pattern: String, dir: PathBuf },

    #[error("Invalid detection pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid PEP 440 version: {0}")]
    InvalidVersion(String),

    // Rewrite target errors
    #[error("Requested file does not exist: {}", .0.display())]
    RewriteTargetMissing(PathBuf),

    #[error("Unsupported file type for version rewriting: {}", .0.display())]
    UnsupportedTarget(PathBuf),

    #[error(
        "Requested file is outside the working directory: {}",
        .0.display()
    )]
    TargetOutsideWorkdir(PathBuf),

    #[error(
        "Changelog tool failed for {} ({status}): {stderr}",
        .path.display()
    )]
    ChangelogTool {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    // I/O errors always carry the path they happened on
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Regular expression error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Logger initialization error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Result type alias using SetVersionError
pub type Result<T> = std::result::Result<T, SetVersionError>;

impl SetVersionError {
    /// Create an I/O error tied to the path it occurred on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a detection error for the given pattern and directory
    pub fn detection(pattern: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        Self::Detection {
            pattern: pattern.into(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(
        pattern: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
