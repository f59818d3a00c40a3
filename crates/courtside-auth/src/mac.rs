//! HMAC-SHA256 helpers shared by the OTP hash and the token signer.

use courtside_core::error::{CourtsideError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Keyed MAC over a message.
pub(crate) fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|_| CourtsideError::internal("invalid MAC key"))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time equality over byte buffers. Hash and signature lengths
/// are fixed, so a length mismatch fails fast without a meaningful timing
/// side-channel.
pub(crate) fn ct_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_is_deterministic_and_keyed() {
        let one = hmac_sha256(b"key-a", b"message").unwrap();
        let two = hmac_sha256(b"key-a", b"message").unwrap();
        let other_key = hmac_sha256(b"key-b", b"message").unwrap();
        assert_eq!(one, two);
        assert_ne!(one, other_key);
        assert_eq!(one.len(), 32);
    }

    #[test]
    fn ct_equal_handles_length_mismatch() {
        assert!(ct_equal(b"abc", b"abc"));
        assert!(!ct_equal(b"abc", b"abd"));
        assert!(!ct_equal(b"abc", b"abcd"));
        assert!(ct_equal(b"", b""));
    }
}
