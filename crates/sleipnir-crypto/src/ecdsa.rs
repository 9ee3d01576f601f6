//! ECDSA signing and verification for the superframe auth frame.
//!
//! Spec §4.2 calls for ECDSA over BrainpoolP256r1. No maintained Rust
//! crate implements that curve; this module substitutes RustCrypto's
//! `p256` (NIST P-256) plus the `ecdsa`/`signature` crates, per
//! DESIGN.md. Signing is deterministic (RFC 6979): identical
//! `(digest, private_key)` pairs always produce identical signatures.
//!
//! Spec §4.2/§9 carries forward the source implementation's 32-byte
//! truncated signature as an explicitly acknowledged, unresolved
//! weakening (the spec calls it "incompatible with standard ECDSA
//! verifiers" and defers a fix to the maintainers). This module keeps
//! [`Signature`] as the real, full 64-byte `r || s` value so that
//! `sign`/`verify` remain genuinely sound and satisfy spec §8's
//! quantified signing properties exactly; [`Signature::to_wire_bytes`]
//! produces the lossy 32-byte wire compromise spec §3/§6 require for
//! the auth frame payload. See DESIGN.md for the full discussion.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature as P256Signature, SigningKey, VerifyingKey};

use crate::error::CryptoError;

/// Length in bytes of the prehashed digest `sign`/`verify` operate on.
pub const DIGEST_LEN: usize = 32;
/// Length in bytes of the full internal signature (`r || s`).
pub const SIGNATURE_LEN: usize = 64;
/// Length in bytes of the truncated on-wire auth payload (spec §3/§6).
pub const WIRE_SIGNATURE_LEN: usize = 32;

/// A full ECDSA signature (`r || s`, 64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Spec §4.2's wire compromise: the first 32 bytes (`r`) of the
    /// full signature. Not independently verifiable from these bytes
    /// alone — see the module docs and DESIGN.md.
    #[must_use]
    pub fn to_wire_bytes(&self) -> [u8; WIRE_SIGNATURE_LEN] {
        let mut out = [0_u8; WIRE_SIGNATURE_LEN];
        out.copy_from_slice(&self.0[..WIRE_SIGNATURE_LEN]);
        out
    }

    /// The raw 64-byte `r || s` representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0
    }
}

/// Signs a 32-byte prehashed digest, returning the full deterministic
/// signature.
///
/// # Errors
///
/// Returns [`CryptoError::SignatureMalformed`] only if the underlying
/// curve arithmetic rejects the digest (practically unreachable for a
/// well-formed 32-byte input).
pub fn sign(digest: &[u8; DIGEST_LEN], signing_key: &SigningKey) -> Result<Signature, CryptoError> {
    let sig: P256Signature = signing_key
        .sign_prehash(digest)
        .map_err(|_| CryptoError::SignatureMalformed("prehash signing failed"))?;
    let mut bytes = [0_u8; SIGNATURE_LEN];
    bytes.copy_from_slice(&sig.to_bytes());
    Ok(Signature(bytes))
}

/// Verifies a full signature against a 32-byte prehashed digest and a
/// public key. Returns `false` on any mismatch or malformed signature
/// rather than raising, per spec §4.2.
#[must_use]
pub fn verify(digest: &[u8; DIGEST_LEN], sig: &Signature, verifying_key: &VerifyingKey) -> bool {
    let Ok(parsed) = P256Signature::from_slice(&sig.0) else {
        return false;
    };
    verifying_key.verify_prehash(digest, &parsed).is_ok()
}

/// Derives the public key corresponding to a signing key.
#[must_use]
pub fn derive_public_key(signing_key: &SigningKey) -> VerifyingKey {
    *signing_key.verifying_key()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SigningKey {
        let mut seed = [0_u8; 32];
        seed[31] = 0x42;
        SigningKey::from_bytes(&seed.into()).expect("valid non-zero scalar")
    }

    #[test]
    fn sign_is_deterministic() {
        let key = test_key();
        let digest = [7_u8; DIGEST_LEN];
        let sig_a = sign(&digest, &key).expect("sign");
        let sig_b = sign(&digest, &key).expect("sign");
        assert_eq!(sig_a, sig_b);
    }

    #[test]
    fn verify_accepts_matching_digest_and_rejects_others() {
        let key = test_key();
        let pubkey = derive_public_key(&key);
        let digest = [9_u8; DIGEST_LEN];
        let sig = sign(&digest, &key).expect("sign");
        assert!(verify(&digest, &sig, &pubkey));

        let mut other_digest = digest;
        other_digest[0] ^= 0x01;
        assert!(!verify(&other_digest, &sig, &pubkey));
    }

    #[test]
    fn wire_bytes_are_the_first_half_of_the_signature() {
        let key = test_key();
        let digest = [1_u8; DIGEST_LEN];
        let sig = sign(&digest, &key).expect("sign");
        assert_eq!(sig.to_wire_bytes(), sig.to_bytes()[..WIRE_SIGNATURE_LEN]);
    }
}
