//! ChaCha20-Poly1305 AEAD with an 8-byte truncated on-wire tag.
//!
//! Pure functions; callers supply the key, nonce, and associated data.
//! The full 16-byte Poly1305 tag never goes on the wire — spec §4.2
//! accepts this as a 2⁻⁶⁴ forgery budget. On open, the full tag cannot
//! be transmitted, so it is recomputed: the ciphertext is decrypted
//! with the raw ChaCha20 keystream (offset one block past the
//! Poly1305 one-time-key block, per RFC 8439), then re-sealed to
//! recover the tag the sender would have computed, which is compared
//! to the received 8 bytes.

use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20poly1305::aead::AeadInPlace;
use chacha20poly1305::{ChaCha20Poly1305, KeyInit};

use crate::error::CryptoError;

/// Length in bytes of a ChaCha20-Poly1305 key.
pub const KEY_LEN: usize = 32;
/// Length in bytes of a ChaCha20-Poly1305 nonce (spec §6).
pub const NONCE_LEN: usize = 12;
/// Length in bytes of the full Poly1305 tag.
pub const TAG_LEN: usize = 16;
/// Length in bytes of the truncated on-wire tag (spec §4.1/§4.2).
pub const TRUNCATED_TAG_LEN: usize = 8;

/// One block of ChaCha20 keystream, skipped before message keystream
/// because RFC 8439 reserves block 0 for the Poly1305 one-time key.
const KEYSTREAM_BLOCK_BYTES: u32 = 64;

/// Seals `plaintext` in place, returning the ciphertext (same length
/// as `plaintext`, ChaCha20 is a stream cipher) and the truncated
/// 8-byte on-wire tag.
///
/// # Errors
///
/// Returns [`CryptoError::SealFailed`] if the underlying AEAD
/// implementation rejects the operation (only possible on malformed
/// key/nonce lengths, which the fixed-size parameters here preclude in
/// practice).
pub fn seal_truncated(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; TRUNCATED_TAG_LEN]), CryptoError> {
    let cipher = ChaCha20Poly1305::new(key.into());
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(nonce.into(), aad, &mut buffer)
        .map_err(|_| CryptoError::SealFailed)?;
    let mut tag8 = [0_u8; TRUNCATED_TAG_LEN];
    tag8.copy_from_slice(&tag[..TRUNCATED_TAG_LEN]);
    Ok((buffer, tag8))
}

/// Opens `ciphertext`, verifying it against the truncated 8-byte
/// `tag8` received on the wire. Returns the plaintext on success.
///
/// # Errors
///
/// Returns [`CryptoError::MacInvalid`] if the recomputed tag does not
/// match `tag8`.
pub fn open_truncated(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
    tag8: &[u8; TRUNCATED_TAG_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let mut candidate = ciphertext.to_vec();
    let mut keystream = chacha20::ChaCha20::new(key.into(), nonce.into());
    keystream.seek(KEYSTREAM_BLOCK_BYTES);
    keystream.apply_keystream(&mut candidate);

    let cipher = ChaCha20Poly1305::new(key.into());
    let mut resealed = candidate.clone();
    let recomputed_tag = cipher
        .encrypt_in_place_detached(nonce.into(), aad, &mut resealed)
        .map_err(|_| CryptoError::SealFailed)?;

    let tags_match = constant_time_eq(&recomputed_tag[..TRUNCATED_TAG_LEN], tag8);
    let ciphertext_matches = constant_time_eq(&resealed, ciphertext);

    if tags_match && ciphertext_matches {
        Ok(candidate)
    } else {
        Err(CryptoError::MacInvalid)
    }
}

/// Constant-time-ish byte comparison: every byte is visited regardless
/// of earlier mismatches, avoiding an early-exit timing signal.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0_u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; KEY_LEN] {
        let mut k = [0_u8; KEY_LEN];
        for (i, b) in k.iter_mut().enumerate() {
            *b = i as u8;
        }
        k
    }

    fn nonce() -> [u8; NONCE_LEN] {
        let mut n = [0_u8; NONCE_LEN];
        for (i, b) in n.iter_mut().enumerate() {
            *b = i as u8;
        }
        n
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let aad = b"counter-position-callsign";
        let plaintext = b"the quick brown fox jumps over 39 bytes!";
        let (ct, tag8) = seal_truncated(&key(), &nonce(), aad, plaintext).expect("seal");
        let pt = open_truncated(&key(), &nonce(), aad, &ct, &tag8).expect("open");
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let aad = b"aad";
        let plaintext = b"authenticate me please";
        let (mut ct, tag8) = seal_truncated(&key(), &nonce(), aad, plaintext).expect("seal");
        ct[3] ^= 0x01;
        assert_eq!(open_truncated(&key(), &nonce(), aad, &ct, &tag8), Err(CryptoError::MacInvalid));
    }

    #[test]
    fn tampered_tag_is_rejected() {
        let aad = b"aad";
        let plaintext = b"authenticate me please";
        let (ct, mut tag8) = seal_truncated(&key(), &nonce(), aad, plaintext).expect("seal");
        tag8[0] ^= 0x01;
        assert_eq!(open_truncated(&key(), &nonce(), aad, &ct, &tag8), Err(CryptoError::MacInvalid));
    }

    #[test]
    fn wrong_aad_is_rejected() {
        let plaintext = b"authenticate me please";
        let (ct, tag8) = seal_truncated(&key(), &nonce(), b"aad-a", plaintext).expect("seal");
        assert_eq!(
            open_truncated(&key(), &nonce(), b"aad-b", &ct, &tag8),
            Err(CryptoError::MacInvalid)
        );
    }
}
