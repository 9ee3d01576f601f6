//! Sleipnir LDPC Forward Error Correction
//!
//! Loads the two fixed-rate parity-check matrices spec §6 defines (a
//! rate-1/3 authentication code and a rate-2/3 voice code) from the
//! bit-exact AList format, encodes systematic codewords over them, and
//! decodes received words with Gallager hard-decision bit-flipping.
//!
//! See [`alist`] for the file parser, [`matrix`] for the sparse
//! adjacency representation, and [`codec`] for encode/decode.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod alist;
pub mod codec;
pub mod error;
pub mod matrix;

pub use codec::{decode_hard, encode, DecodeResult, T_GUARANTEED};
pub use error::LdpcError;
pub use matrix::ParityCheckMatrix;

/// Bit-exact AList text for the rate-1/3 authentication code (768
/// columns, 256 information bits, spec §6).
pub const AUTH_MATRIX_ALIST: &str = include_str!("../matrices/ldpc_auth_768_256.alist");

/// Bit-exact AList text for the rate-2/3 voice code (576 columns, 384
/// information bits, spec §6).
pub const VOICE_MATRIX_ALIST: &str = include_str!("../matrices/ldpc_voice_576_384.alist");

/// Loads the fixed authentication matrix.
///
/// # Errors
///
/// Returns [`LdpcError::AListMalformed`] if the embedded matrix file
/// is corrupt (not expected outside of a build misconfiguration).
pub fn auth_matrix() -> Result<ParityCheckMatrix, LdpcError> {
    ParityCheckMatrix::from_alist_str(AUTH_MATRIX_ALIST)
}

/// Loads the fixed voice matrix.
///
/// # Errors
///
/// Returns [`LdpcError::AListMalformed`] if the embedded matrix file
/// is corrupt (not expected outside of a build misconfiguration).
pub fn voice_matrix() -> Result<ParityCheckMatrix, LdpcError> {
    ParityCheckMatrix::from_alist_str(VOICE_MATRIX_ALIST)
}
