//! Error types for Sleipnir cryptographic primitives.

use thiserror::Error;

/// Coarse severity classes from spec §7, used by callers to decide
/// whether a failure is frame-local or session-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Drop at frame granularity, emit a status event, continue.
    RecoverableFrame,
    /// The session must terminate.
    Fatal,
}

/// Errors returned by `sleipnir-crypto` operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A key was the wrong length or otherwise malformed.
    #[error("key format invalid: {0}")]
    KeyFormatInvalid(&'static str),

    /// The same (key, nonce) pair was used twice within a session.
    #[error("nonce reuse detected for nonce {nonce:02x?}")]
    NonceReuse {
        /// The nonce that was reused.
        nonce: [u8; 12],
    },

    /// Authenticated decryption failed: tag mismatch.
    #[error("MAC/tag invalid")]
    MacInvalid,

    /// A signature had the wrong length or an invalid encoding.
    #[error("signature malformed: {0}")]
    SignatureMalformed(&'static str),

    /// The underlying AEAD primitive rejected the operation.
    #[error("seal operation failed")]
    SealFailed,
}

impl CryptoError {
    /// Classify this error per spec §7's error taxonomy.
    #[must_use]
    pub fn classify(&self) -> ErrorClass {
        match self {
            Self::NonceReuse { .. } | Self::KeyFormatInvalid(_) => ErrorClass::Fatal,
            Self::MacInvalid | Self::SignatureMalformed(_) | Self::SealFailed => {
                ErrorClass::RecoverableFrame
            },
        }
    }
}
