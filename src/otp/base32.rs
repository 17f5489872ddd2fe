// mktotp — Base32 codec (RFC 4648)
//
// Authenticator services hand out secrets in Base32 with wildly varying
// hygiene: lowercase, grouped with spaces, padding present or missing.
// `decode` normalizes all of that before decoding. `encode` is the inverse
// and is used only when serializing a record to the on-disk store.

use data_encoding::BASE32_NOPAD;
use zeroize::Zeroizing;

use super::OtpError;

/// Decode Base32 text into raw key bytes.
///
/// Whitespace is stripped, case is ignored and trailing `=` padding is
/// optional. Fails with `InvalidSecret` on characters outside the RFC 4648
/// alphabet, on a bit length that cannot form whole bytes, or on an empty
/// result. The error never echoes the input.
pub fn decode(text: &str) -> Result<Zeroizing<Vec<u8>>, OtpError> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let trimmed = normalized.trim_end_matches('=');

    let bytes = BASE32_NOPAD
        .decode(trimmed.as_bytes())
        .map_err(|_| OtpError::InvalidSecret("not valid Base32".to_string()))?;

    if bytes.is_empty() {
        return Err(OtpError::InvalidSecret(
            "decodes to zero bytes of key material".to_string(),
        ));
    }

    Ok(Zeroizing::new(bytes))
}

/// Encode raw key bytes as unpadded Base32 text.
pub fn encode(bytes: &[u8]) -> String {
    BASE32_NOPAD.encode(bytes)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Base32 of the ASCII bytes "12345678901234567890" (RFC test secret).
    const RFC_SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn test_decode_canonical() {
        let bytes = decode(RFC_SECRET_B32).unwrap();
        assert_eq!(&bytes[..], b"12345678901234567890");
    }

    #[test]
    fn test_decode_lowercase_and_whitespace() {
        let sloppy = "gezd gnbv gy3t qojq\ngezd gnbv gy3t qojq";
        let bytes = decode(sloppy).unwrap();
        assert_eq!(&bytes[..], b"12345678901234567890");
    }

    #[test]
    fn test_decode_with_padding() {
        // "MY======" is the padded encoding of the single byte 'f'.
        let bytes = decode("MY======").unwrap();
        assert_eq!(&bytes[..], b"f");
    }

    #[test]
    fn test_decode_without_padding() {
        let bytes = decode("MY").unwrap();
        assert_eq!(&bytes[..], b"f");
    }

    #[test]
    fn test_decode_rejects_invalid_alphabet() {
        let err = decode("ABC128!!").unwrap_err();
        assert_eq!(err.kind(), "InvalidSecret");
    }

    #[test]
    fn test_decode_rejects_partial_byte() {
        // A single Base32 character carries only 5 bits — not a whole byte.
        let err = decode("A").unwrap_err();
        assert_eq!(err.kind(), "InvalidSecret");
    }

    #[test]
    fn test_decode_rejects_empty() {
        let err = decode("").unwrap_err();
        assert_eq!(err.kind(), "InvalidSecret");
    }

    #[test]
    fn test_error_does_not_echo_input() {
        let err = decode("almost-a-secret-0189").unwrap_err();
        assert!(!err.to_string().contains("almost-a-secret"));
    }

    #[test]
    fn test_encode_round_trip() {
        let bytes = decode(RFC_SECRET_B32).unwrap();
        assert_eq!(encode(&bytes), RFC_SECRET_B32);
    }
}
