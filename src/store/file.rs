// mktotp — Store document file I/O
//
// The store is one JSON document: an object mapping secret name to record.
// It is the sole source of truth — loaded fully at the start of an
// operation and fully rewritten on any mutation. Writes go to a temporary
// file in the same directory, are fsynced, then renamed over the original,
// so an interrupted process never leaves a truncated store behind.
//
// A CLI invocation and a running MCP server can mutate the same file, so
// every read-modify-write cycle holds an exclusive advisory lock on a
// sidecar lock file.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::otp::Algorithm;

use super::StoreError;

/// On-disk shape of one record. The secret is Base32 text here — the store
/// file is the one output channel allowed to carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
    pub created_at: DateTime<Utc>,
}

/// The whole document. A BTreeMap keeps `list` output stable
/// (lexicographic by name) across rewrites.
pub(crate) type StoreDocument = BTreeMap<String, StoredRecord>;

/// Handle to the backing file. Construct once at process start from the
/// resolved path; there is no process-wide store state anywhere.
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document. A file that does not exist yet is an empty
    /// mapping; a file that fails to parse is a fatal `CorruptStore`.
    pub(crate) fn load(&self) -> Result<StoreDocument, StoreError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument::new());
            }
            Err(e) => return Err(self.map_io(e)),
        };

        serde_json::from_slice(&raw).map_err(|e| {
            StoreError::CorruptStore(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Run one atomic read-modify-write cycle under the exclusive lock.
    pub(crate) fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.ensure_parent_dir()?;
        let guard = self.acquire_lock()?;

        let mut document = self.load()?;
        let outcome = f(&mut document)?;
        self.save(&document)?;

        // Lock released when the guard handle closes.
        drop(guard);
        Ok(outcome)
    }

    /// Serialize the complete document and atomically replace the file.
    fn save(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let parent = self.parent_dir();
        let json = serde_json::to_vec_pretty(document)?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| self.map_io(e))?;
        tmp.write_all(&json).map_err(|e| self.map_io(e))?;
        tmp.write_all(b"\n").map_err(|e| self.map_io(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.map_io(e))?;
        }

        tmp.as_file().sync_all().map_err(|e| self.map_io(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.map_io(e.error))?;

        tracing::debug!(path = %self.path.display(), "Store file rewritten");
        Ok(())
    }

    /// Take the exclusive advisory lock on the sidecar lock file. Blocks
    /// until any concurrent writer finishes its own cycle.
    fn acquire_lock(&self) -> Result<File, StoreError> {
        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.map_io(e))?;
        lock_file.lock_exclusive().map_err(|e| self.map_io(e))?;
        Ok(lock_file)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> &Path {
        self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."))
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        let parent = self.parent_dir();

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            std::fs::DirBuilder::new()
                .recursive(true)
                .mode(0o700)
                .create(parent)
                .map_err(|e| self.map_io(e))?;
        }
        #[cfg(not(unix))]
        {
            std::fs::create_dir_all(parent).map_err(|e| self.map_io(e))?;
        }

        Ok(())
    }

    fn map_io(&self, e: std::io::Error) -> StoreError {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            StoreError::PermissionDenied(self.path.clone())
        } else {
            StoreError::Io(e)
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stored(secret: &str) -> StoredRecord {
        StoredRecord {
            secret: secret.to_string(),
            account: None,
            issuer: None,
            algorithm: Algorithm::Sha1,
            digits: 6,
            period: 30,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_mapping() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("secrets.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_mutate_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("secrets.json"));

        file.mutate(|doc| {
            doc.insert("github".to_string(), stored("MZXW6YTBOI"));
            Ok(())
        })
        .unwrap();

        let doc = file.load().unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["github"].secret, "MZXW6YTBOI");
    }

    #[test]
    fn test_mutate_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("a/b/secrets.json"));
        file.mutate(|_| Ok(())).unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn test_unparseable_file_is_corrupt_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, "{ not json").unwrap();

        let file = StoreFile::new(path);
        let err = file.load().unwrap_err();
        assert_eq!(err.kind(), "CorruptStore");

        // A mutation against a corrupt store must also fail, untouched.
        let err = file
            .mutate(|doc| {
                doc.insert("x".to_string(), stored("MZXW6YTBOI"));
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.kind(), "CorruptStore");
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_failed_mutation_leaves_file_unchanged() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("secrets.json"));
        file.mutate(|doc| {
            doc.insert("keep".to_string(), stored("MZXW6YTBOI"));
            Ok(())
        })
        .unwrap();
        let before = std::fs::read_to_string(file.path()).unwrap();

        let result: Result<(), StoreError> = file.mutate(|doc| {
            doc.clear();
            Err(StoreError::NotFound("boom".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), before);
    }

    #[test]
    fn test_document_order_is_stable() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("secrets.json"));
        file.mutate(|doc| {
            doc.insert("zeta".to_string(), stored("MZXW6YTBOI"));
            doc.insert("alpha".to_string(), stored("MZXW6YTBOI"));
            doc.insert("mid".to_string(), stored("MZXW6YTBOI"));
            Ok(())
        })
        .unwrap();

        let names: Vec<String> = file.load().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_written_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("secrets.json"));
        file.mutate(|_| Ok(())).unwrap();

        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
