//! ============================================================================
//! OAuth 1.0a Request Signing (HMAC-SHA1)
//! ============================================================================
//! Signature base string and signing key per RFC 5849 §3.4, plus the helpers
//! every signed call needs: nonces, timestamps, and the Authorization header.
//! ============================================================================

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;

use crate::types::FlickrError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal, everything else is escaped
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Parameters that take part in a signature, kept in sorted key order
pub type SignatureParams = BTreeMap<String, String>;

/// Percent-encode a string per RFC 3986 (space becomes `%20`)
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Build `METHOD&enc(url)&enc(k1=v1&k2=v2...)`
pub fn signature_base_string(method: &str, base_url: &str, params: &SignatureParams) -> String {
    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&param_string)
    )
}

/// Compute the base64 HMAC-SHA1 signature for a request.
///
/// `token_secret` is empty until a request token has been issued.
pub fn sign(
    method: &str,
    base_url: &str,
    params: &SignatureParams,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, FlickrError> {
    let base_string = signature_base_string(method, base_url, params);
    let signing_key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes()).map_err(|e| {
        FlickrError::AuthProtocol {
            step: "signing",
            detail: format!("HMAC init failed: {}", e),
        }
    })?;
    mac.update(base_string.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// 16 random bytes, base64-encoded
pub fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    STANDARD.encode(bytes)
}

/// Current unix time in seconds
pub fn timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// The `oauth_*` protocol parameters common to every signed request
pub fn oauth_params(consumer_key: &str, token: Option<&str>) -> SignatureParams {
    let mut params = SignatureParams::new();
    params.insert("oauth_consumer_key".to_string(), consumer_key.to_string());
    params.insert("oauth_nonce".to_string(), generate_nonce());
    params.insert(
        "oauth_signature_method".to_string(),
        SIGNATURE_METHOD.to_string(),
    );
    params.insert("oauth_timestamp".to_string(), timestamp());
    params.insert("oauth_version".to_string(), OAUTH_VERSION.to_string());
    if let Some(token) = token {
        params.insert("oauth_token".to_string(), token.to_string());
    }
    params
}

/// `OAuth k="v", ...` built from the `oauth_*` entries only
pub fn authorization_header(params: &SignatureParams) -> String {
    let fields = params
        .iter()
        .filter(|(k, _)| k.starts_with("oauth_"))
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {}", fields)
}
