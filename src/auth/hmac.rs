// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request signature primitives.
//!
//! A signed request carries `base64(HMAC-SHA256(key, body || key))`: the MAC
//! is keyed with the shared secret and computed over the raw body bytes
//! followed by the secret bytes. Appending the key to the message binds the
//! signature to possession of the secret without a random nonce; it does not
//! protect against replay or method/path substitution (see
//! [`middleware`](super::middleware)).

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64 signature for a request body under a shared secret.
pub fn compute_signature(body: &[u8], key: &[u8]) -> String {
    let mut mac = mac_for(key);
    mac.update(body);
    mac.update(key);
    Base64::encode_string(&mac.finalize().into_bytes())
}

/// Verify a decoded signature checksum against a body and secret.
///
/// Comparison is constant-time (`Mac::verify_slice`).
pub fn verify_checksum(body: &[u8], key: &[u8], claimed: &[u8]) -> bool {
    let mut mac = mac_for(key);
    mac.update(body);
    mac.update(key);
    mac.verify_slice(claimed).is_ok()
}

fn mac_for(key: &[u8]) -> HmacSha256 {
    // HMAC-SHA256 accepts keys of any length.
    HmacSha256::new_from_slice(key).expect("HMAC key of any length")
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-secret-key";

    #[test]
    fn signature_is_deterministic() {
        let a = compute_signature(b"hello", KEY);
        let b = compute_signature(b"hello", KEY);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn valid_signature_verifies() {
        let signature = compute_signature(b"{\"amount\":30}", KEY);
        let claimed = Base64::decode_vec(&signature).unwrap();
        assert!(verify_checksum(b"{\"amount\":30}", KEY, &claimed));
    }

    #[test]
    fn single_byte_change_invalidates() {
        let signature = compute_signature(b"{\"amount\":30}", KEY);
        let claimed = Base64::decode_vec(&signature).unwrap();
        assert!(!verify_checksum(b"{\"amount\":31}", KEY, &claimed));
    }

    #[test]
    fn signature_is_bound_to_the_key() {
        let signature = compute_signature(b"payload", KEY);
        let claimed = Base64::decode_vec(&signature).unwrap();
        assert!(!verify_checksum(b"payload", b"another-key", &claimed));
    }

    #[test]
    fn truncated_checksum_is_rejected() {
        let signature = compute_signature(b"payload", KEY);
        let claimed = Base64::decode_vec(&signature).unwrap();
        assert!(!verify_checksum(b"payload", KEY, &claimed[..16]));
    }
}
