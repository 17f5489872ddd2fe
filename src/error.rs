// mktotp — Top-level error types
//
// Aggregates the otp, store and qr module errors into a single enum for
// the application boundary. `kind()` yields the stable error-kind string:
// the CLI prints it next to the message, and the MCP server attaches it to
// structured tool errors, so both modes report the same taxonomy.

use thiserror::Error;

/// Top-level error type for all mktotp operations.
#[derive(Debug, Error)]
pub enum MktotpError {
    #[error(transparent)]
    Otp(#[from] crate::otp::OtpError),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    #[error(transparent)]
    Decode(#[from] crate::qr::DecodeError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MktotpError {
    /// Stable error-kind string for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            MktotpError::Otp(e) => e.kind(),
            MktotpError::Store(e) => e.kind(),
            MktotpError::Decode(e) => e.kind(),
            MktotpError::InvalidArgument(_) => "InvalidArgument",
            MktotpError::Internal(_) => "InternalError",
            MktotpError::Io(_) => "IOError",
        }
    }
}

pub type Result<T> = std::result::Result<T, MktotpError>;
