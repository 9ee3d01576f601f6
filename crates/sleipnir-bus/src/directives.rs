//! Control directives carried over the `ctrl` queue (spec §6).

/// A 5-ASCII-character station callsign.
pub type Callsign = [u8; 5];

/// A closed set of session-configuration directives. Each value the
/// caller sends over `ctrl` replaces (does not merge with) the
/// session's current setting for that option; range/format validation
/// happens where the directive is applied, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlDirective {
    /// Toggle Frame-0 ECDSA signing on TX.
    EnableSigning(bool),
    /// Toggle per-frame AEAD on TX/RX.
    EnableEncryption(bool),
    /// Addressed recipients, folded into AAD.
    Recipients(Vec<Callsign>),
    /// This session's own callsign.
    LocalCallsign(Callsign),
    /// RX policy: reject unsigned superframes outright.
    RequireSignatures(bool),
    /// Frames between sync beacons, `1..=255`.
    SyncInterval(u32),
    /// Symmetric session key material for AEAD + nonce derivation.
    SymmetricKeys {
        /// 32-byte MAC/AEAD key.
        mac_key: [u8; 32],
        /// 12-byte nonce base, XORed with the per-frame counter.
        nonce_base: [u8; 12],
    },
    /// Asymmetric key material for ECDSA, as PEM or DER bytes.
    KeyPair {
        /// Private key bytes, used for signing.
        private_key: Vec<u8>,
        /// Public key bytes, used for verification.
        public_key: Vec<u8>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_compare_by_value() {
        assert_eq!(ControlDirective::EnableSigning(true), ControlDirective::EnableSigning(true));
        assert_ne!(ControlDirective::EnableSigning(true), ControlDirective::EnableSigning(false));
    }
}
