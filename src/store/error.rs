// mktotp — Store error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("a secret named '{0}' already exists")]
    DuplicateName(String),

    #[error("corrupt secrets store: {0}")]
    CorruptStore(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Stable error-kind string, used by the CLI and the MCP tool errors.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "NotFound",
            StoreError::DuplicateName(_) => "DuplicateName",
            StoreError::CorruptStore(_) => "CorruptStore",
            StoreError::InvalidRecord(_) => "InvalidArgument",
            StoreError::PermissionDenied(_) => "PermissionError",
            StoreError::Io(_) => "IOError",
            StoreError::Json(_) => "InternalError",
        }
    }
}
