//! Webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw body, keyed by the
//! webhook secret, and sends it as `sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{GitHubError, Result};

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const EVENT_HEADER: &str = "X-GitHub-Event";

const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &[u8], body: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| GitHubError::Signature(format!("invalid secret: {e}")))?;
    mac.update(body);
    Ok(mac)
}

/// Compute the header value GitHub would send for `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String> {
    let digest = mac(secret, body)?.finalize().into_bytes();
    Ok(format!("{SIGNATURE_PREFIX}{}", hex::encode(digest)))
}

/// Check a signature header against the raw body in constant time.
pub fn verify_signature(secret: &[u8], body: &[u8], header: Option<&str>) -> Result<()> {
    let header = header.ok_or_else(|| GitHubError::Signature("missing signature".into()))?;
    let hex_digest = header
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or_else(|| GitHubError::Signature("unsupported signature scheme".into()))?;
    let expected = hex::decode(hex_digest)
        .map_err(|_| GitHubError::Signature("signature is not hex".into()))?;

    mac(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| GitHubError::Signature("signature mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"It's a Secret to Everybody";
    const BODY: &[u8] = b"Hello, World!";

    #[test]
    fn test_known_vector() {
        // Example delivery from GitHub's webhook documentation.
        assert_eq!(
            sign(SECRET, BODY).unwrap(),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn test_verify() {
        let header = sign(SECRET, BODY).unwrap();
        assert!(verify_signature(SECRET, BODY, Some(&header)).is_ok());
        assert!(verify_signature(SECRET, b"Hello, World?", Some(&header)).is_err());
        assert!(verify_signature(b"other", BODY, Some(&header)).is_err());
    }

    #[test]
    fn test_malformed_headers() {
        assert!(verify_signature(SECRET, BODY, None).is_err());
        assert!(verify_signature(SECRET, BODY, Some("sha1=abcd")).is_err());
        assert!(verify_signature(SECRET, BODY, Some("sha256=zz")).is_err());
        assert!(verify_signature(SECRET, BODY, Some("sha256=abcd")).is_err());
    }
}
