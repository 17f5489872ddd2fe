// mktotp — otpauth URI parser
//
// Parses the `otpauth://totp/...` URIs carried by provisioning QR codes
// into a normalized credential. The label is only a display hint — the
// store key is always the operator-supplied name.
//
// SECURITY: the URI embeds the secret in its query string, so no error
// raised here may include the URI itself.

use std::str::FromStr;

use percent_encoding::percent_decode_str;
use url::Url;
use zeroize::Zeroizing;

use super::totp::Algorithm;
use super::{base32, OtpError};

pub const DEFAULT_DIGITS: u32 = 6;
pub const DEFAULT_PERIOD: u64 = 30;

/// A fully-normalized credential, missing only the store name and the
/// ingestion timestamp, which the caller supplies.
#[derive(Debug)]
pub struct ParsedCredential {
    pub secret: Zeroizing<Vec<u8>>,
    pub account: Option<String>,
    pub issuer: Option<String>,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
}

/// Parse an otpauth URI.
///
/// Validates the scheme and OTP type, percent-decodes the label into an
/// account/issuer hint, and extracts the query parameters. Missing optional
/// parameters fall back to SHA1 / 6 digits / 30 seconds. The `issuer` query
/// parameter takes precedence over the label prefix.
pub fn parse(uri: &str) -> Result<ParsedCredential, OtpError> {
    let url = Url::parse(uri)
        .map_err(|_| OtpError::UnsupportedUri("not a well-formed URI".to_string()))?;

    if url.scheme() != "otpauth" {
        return Err(OtpError::UnsupportedUri(format!(
            "unexpected scheme '{}'",
            url.scheme()
        )));
    }

    let otp_type = url
        .host_str()
        .ok_or_else(|| OtpError::UnsupportedUri("missing OTP type segment".to_string()))?;
    if !otp_type.eq_ignore_ascii_case("totp") {
        return Err(OtpError::UnsupportedType(otp_type.to_string()));
    }

    let (issuer_hint, account) = parse_label(url.path());

    let mut secret_text: Option<String> = None;
    let mut issuer_param: Option<String> = None;
    let mut algorithm = Algorithm::default();
    let mut digits = DEFAULT_DIGITS;
    let mut period = DEFAULT_PERIOD;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "secret" => secret_text = Some(value.into_owned()),
            "issuer" => issuer_param = Some(value.into_owned()),
            "algorithm" => algorithm = Algorithm::from_str(&value)?,
            "digits" => {
                digits = value.parse::<u32>().ok().filter(|d| (6..=8).contains(d)).ok_or_else(
                    || OtpError::InvalidParameter("digits must be 6, 7 or 8".to_string()),
                )?;
            }
            "period" => {
                period = value.parse::<u64>().ok().filter(|p| *p > 0).ok_or_else(|| {
                    OtpError::InvalidParameter("period must be a positive integer".to_string())
                })?;
            }
            // Unknown parameters (e.g. counter, image) are ignored.
            _ => {}
        }
    }

    let secret_text = secret_text
        .ok_or_else(|| OtpError::InvalidParameter("missing 'secret' parameter".to_string()))?;
    let secret = base32::decode(&secret_text)?;

    Ok(ParsedCredential {
        secret,
        account,
        issuer: issuer_param.or(issuer_hint),
        algorithm,
        digits,
        period,
    })
}

/// Split the percent-encoded label path into `(issuer_hint, account)`.
/// Labels follow the `Issuer:account` convention; a bare label is all
/// account.
fn parse_label(path: &str) -> (Option<String>, Option<String>) {
    let raw = path.trim_start_matches('/');
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let label = decoded.trim();
    if label.is_empty() {
        return (None, None);
    }

    match label.split_once(':') {
        Some((issuer, account)) => (
            non_empty(issuer.trim()),
            non_empty(account.trim()),
        ),
        None => (None, Some(label.to_string())),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
