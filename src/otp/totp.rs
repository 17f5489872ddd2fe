// mktotp — TOTP engine
//
// RFC 4226 HOTP dynamic truncation driven by the RFC 6238 time counter.
// `compute_code` is deterministic and side-effect free: identical
// (secret, algorithm, digits, period, time) always yields the identical
// code. This is a generator only — no verification or acceptance-window
// logic lives here or anywhere else in the crate.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use super::OtpError;

/// HMAC algorithms supported for code generation.
///
/// A closed set: anything else fails ingestion with `UnsupportedAlgorithm`
/// rather than being coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Sha1
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Sha1 => write!(f, "SHA1"),
            Algorithm::Sha256 => write!(f, "SHA256"),
            Algorithm::Sha512 => write!(f, "SHA512"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(Algorithm::Sha1),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA512" => Ok(Algorithm::Sha512),
            other => Err(OtpError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// The result of one code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeResult {
    /// Decimal code string, zero-padded to exactly `digits` characters.
    pub code: String,
    /// Seconds until the current time step rolls over.
    pub seconds_remaining: u64,
}

/// Compute the TOTP code for `unix_seconds`.
pub fn compute_code(
    secret: &[u8],
    algorithm: Algorithm,
    digits: u32,
    period: u64,
    unix_seconds: u64,
) -> CodeResult {
    let counter = unix_seconds / period;
    CodeResult {
        code: hotp(secret, algorithm, counter, digits),
        seconds_remaining: period - (unix_seconds % period),
    }
}

/// RFC 4226 HOTP: HMAC over the big-endian counter, dynamically truncated
/// to a 31-bit integer, reduced mod 10^digits and zero-padded.
pub(crate) fn hotp(secret: &[u8], algorithm: Algorithm, counter: u64, digits: u32) -> String {
    let mac = hmac_digest(secret, algorithm, &counter.to_be_bytes());

    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        mac[offset] & 0x7f,
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ]);

    let code = binary % 10u32.pow(digits);
    format!("{:0width$}", code, width = digits as usize)
}

fn hmac_digest(secret: &[u8], algorithm: Algorithm, message: &[u8]) -> Vec<u8> {
    match algorithm {
        Algorithm::Sha1 => {
            let mut mac =
                Hmac::<Sha1>::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha512 => {
            let mut mac =
                Hmac::<Sha512>::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4226 Appendix D test secret: ASCII "12345678901234567890".
    const SHA1_SECRET: &[u8] = b"12345678901234567890";
    // RFC 6238 Appendix B stretches the seed to the digest block size.
    const SHA256_SECRET: &[u8] = b"12345678901234567890123456789012";
    const SHA512_SECRET: &[u8] =
        b"1234567890123456789012345678901234567890123456789012345678901234";

    #[test]
    fn test_rfc4226_reference_vectors() {
        let expected = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];
        for (counter, want) in expected.iter().enumerate() {
            let got = hotp(SHA1_SECRET, Algorithm::Sha1, counter as u64, 6);
            assert_eq!(&got, want, "HOTP mismatch at counter {}", counter);
        }
    }

    #[test]
    fn test_rfc6238_reference_vectors() {
        // (unix_seconds, SHA1, SHA256, SHA512) — 8 digits, 30s period.
        let vectors: [(u64, &str, &str, &str); 6] = [
            (59, "94287082", "46119246", "90693936"),
            (1_111_111_109, "07081804", "68084774", "25091201"),
            (1_111_111_111, "14050471", "67062674", "99943326"),
            (1_234_567_890, "89005924", "91819424", "93441116"),
            (2_000_000_000, "69279037", "90698825", "38618901"),
            (20_000_000_000, "65353130", "77737706", "47863826"),
        ];
        for (t, sha1, sha256, sha512) in vectors {
            assert_eq!(compute_code(SHA1_SECRET, Algorithm::Sha1, 8, 30, t).code, sha1);
            assert_eq!(
                compute_code(SHA256_SECRET, Algorithm::Sha256, 8, 30, t).code,
                sha256
            );
            assert_eq!(
                compute_code(SHA512_SECRET, Algorithm::Sha512, 8, 30, t).code,
                sha512
            );
        }
    }

    #[test]
    fn test_code_length_matches_digits() {
        for digits in [6, 7, 8] {
            for t in [0u64, 1, 29, 30, 59, 1_700_000_000] {
                let result = compute_code(SHA1_SECRET, Algorithm::Sha1, digits, 30, t);
                assert_eq!(result.code.len(), digits as usize);
                assert!(result.code.chars().all(|c| c.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn test_determinism() {
        let a = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 1_700_000_000);
        let b = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 1_700_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_step_same_code() {
        // 60 and 89 share the time step [60, 90).
        let a = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 60);
        let b = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 89);
        assert_eq!(a.code, b.code);
    }

    #[test]
    fn test_adjacent_steps_differ() {
        let a = compute_code(SHA1_SECRET, Algorithm::Sha1, 8, 30, 59);
        let b = compute_code(SHA1_SECRET, Algorithm::Sha1, 8, 30, 89);
        assert_ne!(a.code, b.code);
    }

    #[test]
    fn test_seconds_remaining_decreases_and_resets() {
        let at_start = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 60);
        assert_eq!(at_start.seconds_remaining, 30);

        let mid = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 75);
        assert_eq!(mid.seconds_remaining, 15);

        let last = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 89);
        assert_eq!(last.seconds_remaining, 1);

        let rolled = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 30, 90);
        assert_eq!(rolled.seconds_remaining, 30);
    }

    #[test]
    fn test_custom_period() {
        let result = compute_code(SHA1_SECRET, Algorithm::Sha1, 6, 60, 119);
        assert_eq!(result.seconds_remaining, 1);
        // counter 1 with a 60s period equals counter 1 of RFC 4226.
        assert_eq!(result.code, "287082");
    }

    #[test]
    fn test_algorithm_parse_case_insensitive() {
        assert_eq!("sha1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert_eq!("Sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("SHA512".parse::<Algorithm>().unwrap(), Algorithm::Sha512);
        assert!("md5".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_algorithm_serde_representation() {
        assert_eq!(serde_json::to_string(&Algorithm::Sha1).unwrap(), "\"SHA1\"");
        let parsed: Algorithm = serde_json::from_str("\"SHA512\"").unwrap();
        assert_eq!(parsed, Algorithm::Sha512);
        assert!(serde_json::from_str::<Algorithm>("\"MD5\"").is_err());
    }
}
