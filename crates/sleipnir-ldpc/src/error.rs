//! Error types for the LDPC codec.

use thiserror::Error;

/// Errors returned while loading or using a parity-check matrix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LdpcError {
    /// The AList file did not match the bit-exact format of spec §6.
    #[error("malformed AList matrix: {0}")]
    AListMalformed(String),

    /// The caller supplied information bits of the wrong length for
    /// this matrix.
    #[error("info length {actual} does not match matrix k={expected}")]
    InfoLengthMismatch {
        /// Expected number of information bits (`ncols - nrows`).
        expected: usize,
        /// Actual number of bits supplied.
        actual: usize,
    },

    /// The caller supplied a received word of the wrong length for
    /// this matrix.
    #[error("codeword length {actual} does not match matrix n={expected}")]
    CodewordLengthMismatch {
        /// Expected codeword length (`ncols`).
        expected: usize,
        /// Actual length supplied.
        actual: usize,
    },
}

/// `LdpcError::AListMalformed` is fatal per spec §7 (it occurs only at
/// matrix load time, before any session starts); all other errors here
/// indicate a caller bug rather than a frame-level failure and are not
/// classified under spec §7's runtime taxonomy.
impl LdpcError {
    /// Returns `true` if this error occurred while loading a matrix
    /// (as opposed to using an already-loaded one).
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::AListMalformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alist_malformed_is_a_load_error() {
        assert!(LdpcError::AListMalformed("bad header".to_string()).is_load_error());
    }

    #[test]
    fn length_mismatches_are_not_load_errors() {
        assert!(!LdpcError::InfoLengthMismatch { expected: 1, actual: 2 }.is_load_error());
        assert!(!LdpcError::CodewordLengthMismatch { expected: 1, actual: 2 }.is_load_error());
    }
}
