// mktotp — OTP Module
//
// Everything needed to turn a registered secret into a numeric code:
// the Base32 codec, the otpauth URI parser, and the TOTP engine itself.
// All functions here are pure; nothing in this module touches the store.

pub mod base32;
mod error;
pub mod totp;
pub mod uri;

pub use error::OtpError;
pub use totp::{compute_code, Algorithm, CodeResult};
pub use uri::ParsedCredential;
