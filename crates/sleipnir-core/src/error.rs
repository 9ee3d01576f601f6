//! Session-level error type, unifying the three lower-layer error
//! types under spec §7's five-way severity taxonomy.

use thiserror::Error;

use sleipnir_crypto::CryptoError;
use sleipnir_ldpc::LdpcError;
use sleipnir_proto::FrameError;

/// Spec §7's error taxonomy, by kind rather than type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Dropped at frame granularity; status emitted; superframe continues.
    RecoverableFrame,
    /// Annotated; payloads still delivered.
    RecoverableSuperframe,
    /// Transition to `searching`; status event emitted once per transition.
    SyncLoss,
    /// Whole superframe's user payloads dropped under policy.
    PolicyRejection,
    /// The session terminates.
    Fatal,
}

/// Errors surfaced by `sleipnir-core`'s session, router, assembler, and
/// parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A wire-framing error from `sleipnir-proto`.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A cryptographic error from `sleipnir-crypto`.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// An LDPC error from `sleipnir-ldpc`.
    #[error(transparent)]
    Ldpc(#[from] LdpcError),

    /// A demodulator delivered a codeword length the router does not
    /// recognize (neither 768 nor 576 bits).
    #[error("unrecognized codeword length: {0} bits")]
    UnknownCodewordLength(usize),

    /// Sync was lost after repeated counter mismatches or MAC failures.
    #[error("sync lost")]
    SyncLost,

    /// `require_signatures` is set and the position-0 auth frame did
    /// not verify; the whole superframe's user payloads are dropped.
    #[error("signature rejected under require_signatures policy")]
    SignatureRejectedByPolicy,
}

impl SessionError {
    /// Classifies this error per spec §7.
    #[must_use]
    pub fn classify(&self) -> ErrorClass {
        match self {
            Self::Frame(e) => match e.classify() {
                sleipnir_proto::ErrorClass::RecoverableFrame => ErrorClass::RecoverableFrame,
                sleipnir_proto::ErrorClass::RecoverableSuperframe => ErrorClass::RecoverableSuperframe,
            },
            Self::Crypto(e) => match e.classify() {
                sleipnir_crypto::ErrorClass::RecoverableFrame => ErrorClass::RecoverableFrame,
                sleipnir_crypto::ErrorClass::Fatal => ErrorClass::Fatal,
            },
            Self::Ldpc(e) => {
                if e.is_load_error() {
                    ErrorClass::Fatal
                } else {
                    ErrorClass::RecoverableFrame
                }
            },
            Self::UnknownCodewordLength(_) => ErrorClass::RecoverableFrame,
            Self::SyncLost => ErrorClass::SyncLoss,
            Self::SignatureRejectedByPolicy => ErrorClass::PolicyRejection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_reuse_propagates_as_fatal() {
        let err: SessionError = CryptoError::NonceReuse { nonce: [0; 12] }.into();
        assert_eq!(err.classify(), ErrorClass::Fatal);
    }

    #[test]
    fn mac_invalid_propagates_as_recoverable_frame() {
        let err: SessionError = FrameError::MacInvalid.into();
        assert_eq!(err.classify(), ErrorClass::RecoverableFrame);
    }

    #[test]
    fn sync_lost_and_policy_rejection_are_distinct_classes() {
        assert_eq!(SessionError::SyncLost.classify(), ErrorClass::SyncLoss);
        assert_eq!(SessionError::SignatureRejectedByPolicy.classify(), ErrorClass::PolicyRejection);
    }
}
