//! Error types for the treemirror sync engine.
//!
//! This module provides the error hierarchy for all operations in the
//! mirroring lifecycle: configuration, plan storage, and plan computation.
//! Action-level I/O failures during execution are deliberately *not* part
//! of this hierarchy - they are caught at the action level and recorded as
//! a [`crate::planner::Outcome::Failure`] on the action itself.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the treemirror sync engine.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan store errors.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Plan computation errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Plan store errors.
///
/// Store unavailability is an assumed precondition of the engine; these
/// errors propagate and abort the run rather than being handled locally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The plan document was not found.
    #[error("Plan not found: {path}")]
    NotFound {
        /// Path to the missing plan document.
        path: PathBuf,
    },

    /// The plan document is corrupted.
    #[error("Plan document is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// Serialization error.
    #[error("Plan serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// The plan document could not be written.
    #[error("Failed to write plan: {message}")]
    WriteFailed {
        /// Description of the write failure.
        message: String,
    },
}

/// Plan computation errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A path encountered during traversal is not nested under its root.
    #[error("Path {path} is not under root {root}")]
    PathOutsideRoot {
        /// The offending path.
        path: PathBuf,
        /// The root the path was expected to be nested under.
        root: PathBuf,
    },

    /// The source root does not exist or is not a directory.
    #[error("Source root is not a directory: {path}")]
    SourceRootMissing {
        /// The configured source root.
        path: PathBuf,
    },

    /// The backup root does not exist or is not a directory.
    #[error("Backup root is not a directory: {path}")]
    BackupRootMissing {
        /// The configured backup root.
        path: PathBuf,
    },
}

/// Result type alias for treemirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

impl MirrorError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl StoreError {
    /// Creates a corruption error with the given message.
    #[must_use]
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates a serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Creates a write failure with the given message.
    #[must_use]
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }
}
