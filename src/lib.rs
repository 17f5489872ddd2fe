// mktotp — TOTP secret manager
//
// Library crate exposing the secret store, the TOTP engine, the otpauth
// URI parser, and the operation layer shared by the CLI and MCP server.
// The contract that holds everything together: raw secret material never
// crosses the tool boundary — not in results, not in listings, not in
// error messages.

pub mod cli;
pub mod error;
pub mod mcp;
pub mod ops;
pub mod otp;
pub mod qr;
pub mod store;

pub use error::{MktotpError, Result};
