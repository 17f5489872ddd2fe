// mktotp — Store Module
//
// Durable name → SecretRecord mapping backed by a single JSON file, with
// atomic-replace writes and an advisory lock for the single-writer
// discipline.

mod error;
mod file;
mod models;
mod repository;

pub use error::StoreError;
pub use file::StoreFile;
pub use models::{validate_name, SecretRecord, SecretSummary, MAX_NAME_LEN};
pub use repository::{JsonSecretStore, SecretStore};
