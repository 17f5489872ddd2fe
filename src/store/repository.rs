// mktotp — Secret store repository
//
// CRUD over the JSON store document. Key design decision: `add` is a
// documented unconditional upsert — registering a name that already exists
// replaces the old record. Only `rename` guards against collisions.

use std::path::{Path, PathBuf};

use crate::otp::base32;

use super::file::{StoreFile, StoredRecord};
use super::models::{SecretRecord, SecretSummary};
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over secret storage operations. Every method is one atomic
/// cycle against the backing file; nothing is cached between calls.
pub trait SecretStore {
    /// Insert or replace the record under its name. Overwrite is the
    /// documented behavior, not an error. Returns the non-secret summary.
    fn add(&self, record: SecretRecord) -> Result<SecretSummary, StoreError>;

    /// Fetch a record by name, WITH the secret bytes. For in-process use
    /// only — the record itself never crosses the tool boundary.
    fn get(&self, name: &str) -> Result<SecretRecord, StoreError>;

    /// List all records as non-secret summaries, in stable name order.
    fn list(&self) -> Result<Vec<SecretSummary>, StoreError>;

    /// Delete a record by name.
    fn remove(&self, name: &str) -> Result<(), StoreError>;

    /// Move a record to a new name, preserving every other field including
    /// `created_at`. Fails with `DuplicateName` if the target exists and is
    /// a different record.
    fn rename(&self, old: &str, new: &str) -> Result<SecretSummary, StoreError>;
}

// ─── JSON-file implementation ────────────────────────────────────────────────

pub struct JsonSecretStore {
    file: StoreFile,
}

impl JsonSecretStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: StoreFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl SecretStore for JsonSecretStore {
    fn add(&self, record: SecretRecord) -> Result<SecretSummary, StoreError> {
        let summary = record.summary();
        let name = record.name.clone();
        let stored = to_stored(&record);

        self.file.mutate(|doc| {
            if doc.insert(name.clone(), stored).is_some() {
                tracing::debug!(name = %name, "Existing secret overwritten");
            }
            Ok(())
        })?;

        tracing::info!(name = %summary.name, "Secret stored");
        Ok(summary)
    }

    fn get(&self, name: &str) -> Result<SecretRecord, StoreError> {
        let doc = self.file.load()?;
        match doc.get(name) {
            Some(stored) => to_record(name, stored),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    fn list(&self) -> Result<Vec<SecretSummary>, StoreError> {
        let doc = self.file.load()?;
        doc.iter()
            .map(|(name, stored)| Ok(to_record(name, stored)?.summary()))
            .collect()
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.file.mutate(|doc| {
            if doc.remove(name).is_none() {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Ok(())
        })?;

        tracing::info!(name = %name, "Secret removed");
        Ok(())
    }

    fn rename(&self, old: &str, new: &str) -> Result<SecretSummary, StoreError> {
        let renamed = self.file.mutate(|doc| {
            if !doc.contains_key(old) {
                return Err(StoreError::NotFound(old.to_string()));
            }
            if new != old && doc.contains_key(new) {
                return Err(StoreError::DuplicateName(new.to_string()));
            }

            // The stored record moves under the new key unchanged.
            let stored = doc
                .remove(old)
                .ok_or_else(|| StoreError::NotFound(old.to_string()))?;
            let record = to_record(old, &stored)?.with_name(new)?;
            doc.insert(new.to_string(), stored);
            Ok(record)
        })?;

        tracing::info!(old = %old, new = %new, "Secret renamed");
        Ok(renamed.summary())
    }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

fn to_stored(record: &SecretRecord) -> StoredRecord {
    StoredRecord {
        secret: base32::encode(record.secret()),
        account: record.account.clone(),
        issuer: record.issuer.clone(),
        algorithm: record.algorithm,
        digits: record.digits,
        period: record.period,
        created_at: record.created_at,
    }
}

/// Rehydrate a record from its on-disk shape. A record that violates the
/// invariants (undecodable secret, out-of-range digits/period) means the
/// store was edited or damaged — that is `CorruptStore`, never repaired.
fn to_record(name: &str, stored: &StoredRecord) -> Result<SecretRecord, StoreError> {
    let secret = base32::decode(&stored.secret)
        .map_err(|_| StoreError::CorruptStore(format!("record '{}': undecodable secret", name)))?;

    SecretRecord::new(
        name,
        secret,
        stored.account.clone(),
        stored.issuer.clone(),
        stored.algorithm,
        stored.digits,
        stored.period,
        stored.created_at,
    )
    .map_err(|e| StoreError::CorruptStore(format!("record '{}': {}", name, e)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
