//! HMAC signature generation and verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lower-case hex HMAC-SHA256 digest of `payload`.
pub fn compute_signature(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex signature against the payload.
///
/// Returns `false` without computing anything when the signature or the
/// secret is empty. Comparison is length-checked and fixed-time; the
/// provided signature is lower-cased first so hex casing does not matter.
/// Never panics and never returns an error.
pub fn verify(payload: &[u8], signature: &str, secret: &str) -> bool {
    if signature.is_empty() || secret.is_empty() {
        return false;
    }

    let expected = compute_signature(payload, secret);
    constant_time_compare(&expected, &signature.to_ascii_lowercase())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
