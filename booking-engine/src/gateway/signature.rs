//! Webhook signature verification (HMAC-SHA256)
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>`; the signed payload is
//! `"{t}." + body`. Events outside a 5-minute window are rejected.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Maximum age (either direction) of a signed event
pub const REPLAY_WINDOW_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature header")]
    MalformedHeader,

    #[error("Invalid signature hex")]
    InvalidHex,

    #[error("Invalid timestamp")]
    InvalidTimestamp,

    #[error("HMAC key error")]
    Key,

    #[error("Webhook signature mismatch")]
    Mismatch,

    #[error("Webhook timestamp outside replay window")]
    Expired,
}

fn mac_for(payload: &[u8], timestamp: &str, secret: &str) -> Result<Hmac<Sha256>, SignatureError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Key)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verify `sig_header` against `payload` at `now_secs`
pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    // Constant-time comparison via verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| SignatureError::InvalidHex)?;
    mac_for(payload, timestamp, secret)?
        .verify_slice(&sig_bytes)
        .map_err(|_| SignatureError::Mismatch)?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    if (now_secs - ts).abs() > REPLAY_WINDOW_SECS {
        return Err(SignatureError::Expired);
    }

    Ok(())
}

/// Build a signature header for `payload` (gateway emulators and tests)
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, SignatureError> {
    let ts = timestamp.to_string();
    let digest = mac_for(payload, &ts, secret)?.finalize().into_bytes();
    Ok(format!("t={ts},v1={}", hex::encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_737_936_000;

    #[test]
    fn test_sign_then_verify() {
        let body = br#"{"correlation_id":"cs_1","paid":true,"amount_minor":30000}"#;
        let header = sign_payload(body, SECRET, NOW).unwrap();
        assert_eq!(verify_signature(body, &header, SECRET, NOW + 10), Ok(()));
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let header = sign_payload(b"{\"paid\":false}", SECRET, NOW).unwrap();
        assert_eq!(
            verify_signature(b"{\"paid\":true}", &header, SECRET, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let header = sign_payload(b"{}", "other", NOW).unwrap();
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_replay_window() {
        let header = sign_payload(b"{}", SECRET, NOW).unwrap();
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, NOW + REPLAY_WINDOW_SECS),
            Ok(())
        );
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, NOW + REPLAY_WINDOW_SECS + 1),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(
            verify_signature(b"{}", "v1=abcd", SECRET, NOW),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(b"{}", "t=1,v1=zz", SECRET, NOW),
            Err(SignatureError::InvalidHex)
        );
    }
}
