use crate::errors::EnvxError;
use std::path::PathBuf;

/// Errors from the persistence layer.
///
/// Note: not `Clone` because `io::Error` (in `ReadFailed`) is not `Clone`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Project '{name}' not found")]
    NotFound { name: String },

    #[error("Project '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Invalid project name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid project structure: {field}")]
    InvalidStructure { field: String },

    #[error("Failed to read '{}': {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {message}", .path.display())]
    WriteFailed { path: PathBuf, message: String },

    #[error("Project '{name}' is corrupted: {message}")]
    Corrupted { name: String, message: String },
}

impl EnvxError for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "STORE_PROJECT_NOT_FOUND",
            StoreError::AlreadyExists { .. } => "STORE_PROJECT_ALREADY_EXISTS",
            StoreError::InvalidName { .. } => "STORE_INVALID_NAME",
            StoreError::InvalidStructure { .. } => "STORE_INVALID_STRUCTURE",
            StoreError::ReadFailed { .. } => "STORE_READ_FAILED",
            StoreError::WriteFailed { .. } => "STORE_WRITE_FAILED",
            StoreError::Corrupted { .. } => "STORE_CORRUPTED",
        }
    }

    fn is_user_error(&self) -> bool {
        // Exhaustive match ensures new variants force an explicit classification.
        match self {
            StoreError::NotFound { .. }
            | StoreError::AlreadyExists { .. }
            | StoreError::InvalidName { .. } => true,

            StoreError::InvalidStructure { .. }
            | StoreError::ReadFailed { .. }
            | StoreError::WriteFailed { .. }
            | StoreError::Corrupted { .. } => false,
        }
    }
}
