use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::utils::crypto::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`)
/// against the raw request body.
pub fn verify_stripe_signature(payload: &[u8], header: &str, secret: &str, now_unix: i64) -> bool {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => timestamp = value.parse().ok(),
            (Some("v1"), Some(value)) => signatures.push(value),
            _ => {}
        }
    }

    let Some(timestamp) = timestamp else { return false };
    if signatures.is_empty() || (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return false;
    }

    let expected = sign(payload, timestamp, secret);
    signatures
        .iter()
        .any(|candidate| constant_time_eq(&expected, &candidate.to_ascii_lowercase()))
}

/// Hex HMAC-SHA256 over `<timestamp>.<payload>`.
pub fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
