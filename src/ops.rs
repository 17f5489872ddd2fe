// mktotp — Operation surface (the tool boundary)
//
// The five operations plus code generation, shared verbatim by the CLI
// handlers and the MCP tools. The one invariant that makes this more than
// a CRUD façade: no value returned from here ever carries raw secret
// material — callers get `SecretSummary` projections and `CodeResult`s,
// nothing else.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;

use crate::error::{MktotpError, Result};
use crate::otp::{self, uri, Algorithm, CodeResult};
use crate::qr::QrDecoder;
use crate::store::{validate_name, JsonSecretStore, SecretRecord, SecretStore, SecretSummary};

/// Default store location: `~/.mktotp/data/secrets.json`.
pub fn default_store_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mktotp")
        .join("data")
        .join("secrets.json")
}

/// Build the store handle once at process start from the resolved path.
pub fn open_store(path: Option<PathBuf>) -> JsonSecretStore {
    let path = path.unwrap_or_else(default_store_path);
    tracing::debug!(path = %path.display(), "Using secrets store");
    JsonSecretStore::new(path)
}

/// Where the key material of a new secret comes from.
pub enum SecretSource {
    /// An `otpauth://totp/...` URI, e.g. the payload of a provisioning QR.
    OtpauthUri(String),
    /// A bare Base32 secret typed by the operator; SHA1/6/30 defaults apply.
    RawBase32(String),
}

/// Register (or overwrite) one secret under `name`.
pub fn add_secret<S: SecretStore>(
    store: &S,
    name: &str,
    source: SecretSource,
) -> Result<SecretSummary> {
    validate_name(name)?;
    let record = build_record(name, source)?;
    Ok(store.add(record)?)
}

/// Register the secrets held in a QR image, decoded by the external
/// collaborator. An image carrying N payloads registers them as `name`,
/// `name_2`, … `name_N`. All payloads are parsed before anything is
/// written, so an ingestion failure leaves the store unchanged.
pub fn add_from_qr<S: SecretStore, D: QrDecoder + ?Sized>(
    store: &S,
    name: &str,
    image_path: &Path,
    decoder: &D,
) -> Result<Vec<SecretSummary>> {
    validate_name(name)?;
    let payloads = decoder.decode(image_path)?;

    let mut records = Vec::with_capacity(payloads.len());
    for (i, payload) in payloads.iter().enumerate() {
        let reg_name = if i == 0 {
            name.to_string()
        } else {
            format!("{}_{}", name, i + 1)
        };
        records.push(build_record(&reg_name, SecretSource::OtpauthUri(payload.clone()))?);
    }

    let mut summaries = Vec::with_capacity(records.len());
    for record in records {
        summaries.push(store.add(record)?);
    }
    Ok(summaries)
}

/// Generate the current code for a named secret.
pub fn generate_code<S: SecretStore>(store: &S, name: &str) -> Result<CodeResult> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| MktotpError::Internal("system clock is before the Unix epoch".to_string()))?;
    generate_code_at(store, name, now.as_secs())
}

/// Generate the code for a named secret at an explicit instant.
pub fn generate_code_at<S: SecretStore>(
    store: &S,
    name: &str,
    unix_seconds: u64,
) -> Result<CodeResult> {
    validate_name(name)?;
    let record = store.get(name)?;
    Ok(otp::compute_code(
        record.secret(),
        record.algorithm,
        record.digits,
        record.period,
        unix_seconds,
    ))
}

/// List all registered secrets as non-secret projections.
pub fn list_secrets<S: SecretStore>(store: &S) -> Result<Vec<SecretSummary>> {
    Ok(store.list()?)
}

/// Delete a secret by name.
pub fn remove_secret<S: SecretStore>(store: &S, name: &str) -> Result<()> {
    validate_name(name)?;
    Ok(store.remove(name)?)
}

/// Rename a secret, preserving every other field.
pub fn rename_secret<S: SecretStore>(store: &S, old: &str, new: &str) -> Result<SecretSummary> {
    validate_name(old)?;
    validate_name(new)?;
    Ok(store.rename(old, new)?)
}

fn build_record(name: &str, source: SecretSource) -> Result<SecretRecord> {
    let record = match source {
        SecretSource::OtpauthUri(uri_text) => {
            SecretRecord::from_parsed(name, uri::parse(&uri_text)?, Utc::now())?
        }
        SecretSource::RawBase32(text) => SecretRecord::new(
            name,
            otp::base32::decode(&text)?,
            None,
            None,
            Algorithm::default(),
            uri::DEFAULT_DIGITS,
            uri::DEFAULT_PERIOD,
            Utc::now(),
        )?,
    };
    Ok(record)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
