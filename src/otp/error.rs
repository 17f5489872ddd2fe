// mktotp — OTP error types
//
// Every credential-ingestion failure is one of these kinds. Messages never
// contain secret material: the otpauth URI embeds the secret, so errors
// carry at most the offending scheme/type/parameter name.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("unsupported URI: {0}")]
    UnsupportedUri(String),

    #[error("unsupported OTP type '{0}' (only 'totp' is supported)")]
    UnsupportedType(String),

    #[error("unsupported algorithm '{0}' (expected SHA1, SHA256 or SHA512)")]
    UnsupportedAlgorithm(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}

impl OtpError {
    /// Stable error-kind string, used by the CLI and the MCP tool errors.
    pub fn kind(&self) -> &'static str {
        match self {
            OtpError::UnsupportedUri(_) => "UnsupportedURI",
            OtpError::UnsupportedType(_) => "UnsupportedType",
            OtpError::UnsupportedAlgorithm(_) => "UnsupportedAlgorithm",
            OtpError::InvalidParameter(_) => "InvalidParameter",
            OtpError::InvalidSecret(_) => "InvalidSecret",
        }
    }
}
