// mktotp — Secret record models
//
// SECURITY: the `secret` field is intentionally private. It is never
// included in Debug output, log messages, or serialized responses. The only
// place the secret leaves this type is the on-disk store serializer and the
// TOTP engine, both of which take it through the explicit `secret()` getter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::otp::{Algorithm, ParsedCredential};

use super::StoreError;

/// Longest accepted secret name.
pub const MAX_NAME_LEN: usize = 100;

/// One registered TOTP credential.
/// The `secret` field is private — access only via `secret()`.
#[derive(Clone)]
pub struct SecretRecord {
    pub name: String,
    /// Raw key bytes — NEVER printed, logged, or Debug-displayed.
    secret: Zeroizing<Vec<u8>>,
    pub account: Option<String>,
    pub issuer: Option<String>,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
    pub created_at: DateTime<Utc>,
}

impl SecretRecord {
    /// Build a record, enforcing every invariant up front: non-empty name
    /// within the length limit, at least one byte of key material, digits
    /// in {6,7,8} and a positive period.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        secret: Zeroizing<Vec<u8>>,
        account: Option<String>,
        issuer: Option<String>,
        algorithm: Algorithm,
        digits: u32,
        period: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        validate_name(&name)?;
        if secret.is_empty() {
            return Err(StoreError::InvalidRecord(
                "secret must contain at least one byte".to_string(),
            ));
        }
        if !(6..=8).contains(&digits) {
            return Err(StoreError::InvalidRecord(format!(
                "digits must be 6, 7 or 8 (got {})",
                digits
            )));
        }
        if period == 0 {
            return Err(StoreError::InvalidRecord(
                "period must be a positive number of seconds".to_string(),
            ));
        }

        Ok(Self {
            name,
            secret,
            account,
            issuer,
            algorithm,
            digits,
            period,
            created_at,
        })
    }

    /// Build a record from a parsed otpauth credential, stamping it with
    /// the ingestion time.
    pub fn from_parsed(
        name: impl Into<String>,
        parsed: ParsedCredential,
        created_at: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        Self::new(
            name,
            parsed.secret,
            parsed.account,
            parsed.issuer,
            parsed.algorithm,
            parsed.digits,
            parsed.period,
            created_at,
        )
    }

    /// Access the raw key bytes. Callers are the store serializer and the
    /// TOTP engine only; nothing derived from this may cross the tool
    /// boundary.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// The non-secret projection of this record.
    pub fn summary(&self) -> SecretSummary {
        SecretSummary {
            name: self.name.clone(),
            account: self.account.clone(),
            issuer: self.issuer.clone(),
            algorithm: self.algorithm,
            digits: self.digits,
            period: self.period,
            created_at: self.created_at,
        }
    }

    /// The same record under a different name; every other field, including
    /// `created_at`, is preserved.
    pub fn with_name(mut self, new_name: impl Into<String>) -> Result<Self, StoreError> {
        let new_name = new_name.into();
        validate_name(&new_name)?;
        self.name = new_name;
        Ok(self)
    }
}

/// Reject empty and oversized names.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidRecord(
            "secret name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::InvalidRecord(format!(
            "secret name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Custom Debug implementation that NEVER reveals the secret.
impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .field("account", &self.account)
            .field("issuer", &self.issuer)
            .field("algorithm", &self.algorithm)
            .field("digits", &self.digits)
            .field("period", &self.period)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl fmt::Display for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' ({}, {} digits / {}s)",
            self.name, self.algorithm, self.digits, self.period
        )
    }
}

/// A lightweight view of a record, used for listing and tool results.
/// Never contains the secret value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for SecretSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' — account: {}, issuer: {}",
            self.name,
            self.account.as_deref().unwrap_or("-"),
            self.issuer.as_deref().unwrap_or("-"),
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SecretRecord {
        SecretRecord::new(
            "github",
            Zeroizing::new(b"12345678901234567890".to_vec()),
            Some("alice@example.com".to_string()),
            Some("GitHub".to_string()),
            Algorithm::Sha1,
            6,
            30,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", record());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("12345678901234567890"));
    }

    #[test]
    fn test_display_has_no_secret() {
        let display = format!("{}", record());
        assert!(display.contains("github"));
        assert!(!display.contains("12345678901234567890"));
    }

    #[test]
    fn test_summary_json_has_no_secret_field() {
        let json = serde_json::to_string(&record().summary()).unwrap();
        assert!(!json.to_lowercase().contains("secret"));
        assert!(json.contains("github"));
        assert!(json.contains("SHA1"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let err = SecretRecord::new(
            "  ",
            Zeroizing::new(vec![1]),
            None,
            None,
            Algorithm::Sha1,
            6,
            30,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
    }

    #[test]
    fn test_rejects_oversized_name() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&name).is_err());
    }

    #[test]
    fn test_rejects_empty_secret() {
        let err = SecretRecord::new(
            "a",
            Zeroizing::new(vec![]),
            None,
            None,
            Algorithm::Sha1,
            6,
            30,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
    }

    #[test]
    fn test_rejects_bad_digits_and_period() {
        for digits in [0, 5, 9] {
            assert!(SecretRecord::new(
                "a",
                Zeroizing::new(vec![1]),
                None,
                None,
                Algorithm::Sha1,
                digits,
                30,
                Utc::now(),
            )
            .is_err());
        }
        assert!(SecretRecord::new(
            "a",
            Zeroizing::new(vec![1]),
            None,
            None,
            Algorithm::Sha1,
            6,
            0,
            Utc::now(),
        )
        .is_err());
    }

    #[test]
    fn test_with_name_preserves_fields() {
        let original = record();
        let created = original.created_at;
        let renamed = original.with_name("work-github").unwrap();
        assert_eq!(renamed.name, "work-github");
        assert_eq!(renamed.created_at, created);
        assert_eq!(renamed.issuer.as_deref(), Some("GitHub"));
        assert_eq!(renamed.secret(), b"12345678901234567890");
    }
}
