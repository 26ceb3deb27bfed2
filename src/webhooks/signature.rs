//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw request body and
//! sends the result in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//! Verification must run against the exact bytes received; re-serializing
//! the JSON is not guaranteed to be byte-identical.
//!
//! Verification is the first step in webhook processing. The one exemption
//! is the `ping` event GitHub sends on hook creation, which the HTTP handler
//! accepts without a signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a GitHub signature header (e.g., "sha256=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, invalid hex, wrong
/// algorithm). Never panics.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload with the given secret.
///
/// Used by tests to generate expected signatures.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value (`sha256=<hex>`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a webhook signature against the raw payload and shared secret.
///
/// Returns `true` only when the header carries a well-formed `sha256=`
/// signature that matches. Comparison is constant-time (via the HMAC
/// library) to avoid timing side channels. Malformed input returns `false`;
/// nothing here panics past the boundary.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected_signature = match parse_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&expected_signature).is_ok()
}
