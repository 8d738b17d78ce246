// For payload signing
use hmac::{Hmac, Mac};
use sha2::Sha256;
type HmacSha256 = Hmac<Sha256>;

/// Header carrying the status report signature
pub const SIGNATURE_HEADER: &str = "X-Cloud-Signature";

/// Signs a payload with HMAC-SHA256, formatted as `sha256=<hex>`
pub fn sign_payload(secret: &str, payload: &[u8]) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return None,
    };
    mac.update(payload);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Joins a gateway base URL and a path, tolerating a trailing slash on the base.
/// An empty base yields a relative path, which the HTTP client rejects.
pub fn gateway_endpoint(gateway_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        gateway_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
