// mktotp — MCP Server Implementation
//
// Uses the rmcp crate (official Rust MCP SDK) to expose the secret-manager
// operations as discoverable tools. Each tool maps to one operation in
// `crate::ops`; errors surface with the same kind strings the CLI prints.
// No tool ever returns raw secret material.

use std::future::Future;
use std::path::{Path, PathBuf};

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::MktotpError;
use crate::ops::{self, SecretSource};
use crate::qr::ZbarDecoder;
use crate::store::JsonSecretStore;

// ─── Tool Parameter Types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SecretNameParam {
    /// The name the secret is registered under
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct AddSecretParams {
    /// The name to register the secret under
    pub name: String,
    /// An otpauth://totp/ provisioning URI
    #[serde(default)]
    pub uri: Option<String>,
    /// A bare Base32 secret (SHA1, 6 digits, 30s period defaults apply)
    #[serde(default)]
    pub secret: Option<String>,
    /// Path to a QR image containing one or more provisioning URIs
    #[serde(default)]
    pub qr_image_path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct RenameSecretParams {
    /// The current name of the secret
    pub name: String,
    /// The new name to move the secret to
    pub new_name: String,
}

// ─── Server State ────────────────────────────────────────────────────────────

/// The MCP server that exposes mktotp secret tools.
///
/// Holds only the store path; every tool call opens a fresh store handle,
/// so each operation is one atomic read or write cycle against the file.
#[derive(Clone)]
pub struct MktotpServer {
    store_path: PathBuf,
    tool_router: ToolRouter<Self>,
}

impl MktotpServer {
    /// Create a new MCP server over the given secrets file.
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store_path,
            tool_router: Self::tool_router(),
        }
    }

    fn open_store(&self) -> JsonSecretStore {
        JsonSecretStore::new(self.store_path.clone())
    }
}

/// Map an operation failure to a structured tool error. The error kind
/// rides in the data payload so clients can branch without parsing the
/// message text.
fn tool_error(err: MktotpError) -> McpError {
    let data = Some(json!({ "kind": err.kind() }));
    match err.kind() {
        "InvalidArgument" | "NotFound" | "DuplicateName" | "UnsupportedURI" | "UnsupportedType"
        | "UnsupportedAlgorithm" | "InvalidParameter" | "InvalidSecret" => {
            McpError::invalid_params(err.to_string(), data)
        }
        _ => McpError::internal_error(err.to_string(), data),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

// ─── Tool Definitions ────────────────────────────────────────────────────────

#[tool_router]
impl MktotpServer {
    /// Register a TOTP secret from a URI, a raw Base32 value, or a QR image.
    /// Exactly one source must be supplied.
    #[tool(
        description = "Register a TOTP secret under a name. Provide exactly one of: \
                       uri (otpauth://totp/ URI), secret (raw Base32), or qr_image_path \
                       (image file with provisioning QR codes). Registering an existing \
                       name replaces its secret."
    )]
    async fn add_secret(
        &self,
        params: Parameters<AddSecretParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddSecretParams {
            name,
            uri,
            secret,
            qr_image_path,
        } = params.0;

        let supplied = [uri.is_some(), secret.is_some(), qr_image_path.is_some()]
            .iter()
            .filter(|present| **present)
            .count();
        if supplied != 1 {
            return Err(tool_error(MktotpError::InvalidArgument(
                "provide exactly one of 'uri', 'secret' or 'qr_image_path'".to_string(),
            )));
        }

        let store = self.open_store();
        let summaries = if let Some(image) = qr_image_path {
            ops::add_from_qr(&store, &name, Path::new(&image), &ZbarDecoder::default())
                .map_err(tool_error)?
        } else {
            let source = match (uri, secret) {
                (Some(u), None) => SecretSource::OtpauthUri(u),
                (None, Some(s)) => SecretSource::RawBase32(s),
                _ => unreachable!("exactly one source checked above"),
            };
            vec![ops::add_secret(&store, &name, source).map_err(tool_error)?]
        };

        json_result(&summaries)
    }

    /// Generate the current code for a named secret.
    #[tool(
        description = "Generate the current TOTP code for a registered secret. Returns \
                       the code and the seconds remaining in its validity window."
    )]
    async fn get_code(
        &self,
        params: Parameters<SecretNameParam>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.open_store();
        let result = ops::generate_code(&store, &params.0.name).map_err(tool_error)?;
        json_result(&result)
    }

    /// List all registered secrets. Returns metadata only — never secrets.
    #[tool(description = "List all registered TOTP secrets (metadata only, no secrets)")]
    async fn list_secrets(&self) -> Result<CallToolResult, McpError> {
        let store = self.open_store();
        let summaries = ops::list_secrets(&store).map_err(tool_error)?;
        json_result(&summaries)
    }

    /// Delete a secret by name.
    #[tool(description = "Delete a registered TOTP secret by name")]
    async fn remove_secret(
        &self,
        params: Parameters<SecretNameParam>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.open_store();
        ops::remove_secret(&store, &params.0.name).map_err(tool_error)?;
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Secret '{}' removed",
            params.0.name
        ))]))
    }

    /// Rename a secret, preserving its parameters.
    #[tool(
        description = "Rename a registered TOTP secret. Fails if the new name is \
                       already taken by another secret."
    )]
    async fn rename_secret(
        &self,
        params: Parameters<RenameSecretParams>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.open_store();
        let summary = ops::rename_secret(&store, &params.0.name, &params.0.new_name)
            .map_err(tool_error)?;
        json_result(&summary)
    }
}

// ─── ServerHandler ───────────────────────────────────────────────────────────

#[tool_handler]
impl ServerHandler for MktotpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "mktotp — TOTP secret manager. Register provisioning URIs or QR \
                 images, then generate time-based one-time codes on demand. \
                 Secrets never leave the store; tools return codes and metadata \
                 only."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Human-readable tool catalog, printed when the `mcp` command runs without
/// `--serve`.
pub fn describe_tools() -> String {
    let tools = [
        (
            "add_secret",
            "Register a TOTP secret from a URI, raw Base32 value, or QR image",
        ),
        (
            "get_code",
            "Generate the current TOTP code with its remaining validity",
        ),
        ("list_secrets", "List registered secrets (metadata only)"),
        ("remove_secret", "Delete a registered secret by name"),
        ("rename_secret", "Move a secret to a new name"),
    ];

    let mut out = String::from("Available MCP tools:\n");
    for (name, description) in tools {
        out.push_str(&format!("  {:<15} {}\n", name, description));
    }
    out.push_str("\nRun with --serve to start the stdio server.");
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
