// mktotp — QR decode collaborator
//
// Turning QR pixels into an otpauth URI string is deliberately outside the
// core: it lives behind this narrow trait, and the shipped implementation
// delegates to the external `zbarimg` tool. Nothing in this crate parses
// image formats.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("QR decoder '{0}' is not available: {1}")]
    DecoderUnavailable(String, String),

    #[error("QR decoding failed: {0}")]
    Failed(String),

    #[error("no QR payload found in '{0}'")]
    NoPayload(String),
}

impl DecodeError {
    pub fn kind(&self) -> &'static str {
        "DecodeError"
    }
}

/// External collaborator that extracts the text payloads of a QR image.
pub trait QrDecoder {
    /// Decode every QR payload in the image, in scan order.
    fn decode(&self, image_path: &Path) -> Result<Vec<String>, DecodeError>;
}

/// Decoder backed by the `zbarimg` command-line tool.
pub struct ZbarDecoder {
    command: String,
}

impl Default for ZbarDecoder {
    fn default() -> Self {
        Self {
            command: "zbarimg".to_string(),
        }
    }
}

impl QrDecoder for ZbarDecoder {
    fn decode(&self, image_path: &Path) -> Result<Vec<String>, DecodeError> {
        let output = Command::new(&self.command)
            .arg("--raw")
            .arg("--quiet")
            .arg(image_path)
            .output()
            .map_err(|e| DecodeError::DecoderUnavailable(self.command.clone(), e.to_string()))?;

        // zbarimg exits 4 when no symbol was found; anything else non-zero
        // is a real failure (unreadable file, unsupported format).
        if !output.status.success() && output.status.code() != Some(4) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecodeError::Failed(stderr.trim().to_string()));
        }

        let payloads: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if payloads.is_empty() {
            return Err(DecodeError::NoPayload(image_path.display().to_string()));
        }

        Ok(payloads)
    }
}
