//! `FrameRouter`: stateless matrix selection by position or codeword
//! length (spec §4.4).

use sleipnir_ldpc::ParityCheckMatrix;

use crate::error::SessionError;

/// Which LDPC matrix a frame codes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    /// The rate-1/3, 768-bit authentication matrix.
    Auth,
    /// The rate-2/3, 576-bit voice/text/APRS/sync matrix.
    Voice,
}

/// A pure, stateless dispatcher from superframe position (TX) or
/// codeword length (RX) to the matrix that frame uses. Never buffers
/// frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameRouter;

impl FrameRouter {
    /// TX-side selection: position 0 under active signing uses the
    /// auth matrix; everything else (including a sync frame at
    /// position 0) uses the voice matrix.
    #[must_use]
    pub fn matrix_for_tx_position(position: u8, signing_on: bool) -> MatrixKind {
        if position == 0 && signing_on {
            MatrixKind::Auth
        } else {
            MatrixKind::Voice
        }
    }

    /// RX-side selection: rate-aware, keyed only by the codeword
    /// length the demodulator contract supplies (spec §6).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownCodewordLength`] for any length
    /// other than 768 or 576 bits.
    pub fn matrix_for_codeword_len(len: usize) -> Result<MatrixKind, SessionError> {
        match len {
            768 => Ok(MatrixKind::Auth),
            576 => Ok(MatrixKind::Voice),
            other => Err(SessionError::UnknownCodewordLength(other)),
        }
    }
}

/// Resolves a [`MatrixKind`] to its loaded matrix.
#[must_use]
pub fn matrix_for<'a>(kind: MatrixKind, auth: &'a ParityCheckMatrix, voice: &'a ParityCheckMatrix) -> &'a ParityCheckMatrix {
    match kind {
        MatrixKind::Auth => auth,
        MatrixKind::Voice => voice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_zero_under_signing_selects_auth() {
        assert_eq!(FrameRouter::matrix_for_tx_position(0, true), MatrixKind::Auth);
    }

    #[test]
    fn position_zero_without_signing_selects_voice() {
        assert_eq!(FrameRouter::matrix_for_tx_position(0, false), MatrixKind::Voice);
    }

    #[test]
    fn nonzero_position_always_selects_voice() {
        assert_eq!(FrameRouter::matrix_for_tx_position(3, true), MatrixKind::Voice);
    }

    #[test]
    fn codeword_length_selects_matrix_or_errors() {
        assert_eq!(FrameRouter::matrix_for_codeword_len(768).unwrap(), MatrixKind::Auth);
        assert_eq!(FrameRouter::matrix_for_codeword_len(576).unwrap(), MatrixKind::Voice);
        assert!(FrameRouter::matrix_for_codeword_len(100).is_err());
    }
}
