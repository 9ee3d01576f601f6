//! Sparse parity-check matrix loaded from an AList file (spec §6).

use crate::alist::{self, AlistData};
use crate::error::LdpcError;

/// A sparse binary parity-check matrix `H` of size `m x n`, plus the
/// systematic/accumulate structure spec §6 mandates for its last `m`
/// columns (the parity columns).
#[derive(Debug, Clone)]
pub struct ParityCheckMatrix {
    /// Number of check rows.
    m: usize,
    /// Number of columns (codeword length).
    n: usize,
    /// 0-indexed row positions touched by each column.
    col_rows: Vec<Vec<usize>>,
    /// 0-indexed column positions touched by each row.
    row_cols: Vec<Vec<usize>>,
}

impl ParityCheckMatrix {
    /// Loads a matrix from AList text.
    ///
    /// # Errors
    ///
    /// Returns [`LdpcError::AListMalformed`] if `text` does not match
    /// spec §6's bit-exact layout.
    pub fn from_alist_str(text: &str) -> Result<Self, LdpcError> {
        let data = alist::parse(text)?;
        Self::from_alist_data(data)
    }

    fn from_alist_data(data: AlistData) -> Result<Self, LdpcError> {
        let AlistData { nrows, ncols, col_degrees, row_degrees, col_rows, row_cols } = data;

        let col_rows = trim_and_shift(&col_rows, &col_degrees);
        let row_cols = trim_and_shift(&row_cols, &row_degrees);

        Ok(Self { m: nrows, n: ncols, col_rows, row_cols })
    }

    /// Number of check rows.
    #[must_use]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Codeword length.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of information bits (`n - m`), assuming the systematic
    /// layout spec §6 requires (information bits first, parity bits
    /// last).
    #[must_use]
    pub fn k(&self) -> usize {
        self.n - self.m
    }

    /// 0-indexed column positions touched by check row `row`.
    #[must_use]
    pub fn row(&self, row: usize) -> &[usize] {
        &self.row_cols[row]
    }

    /// 0-indexed row positions touched by column `col`.
    #[must_use]
    pub fn col(&self, col: usize) -> &[usize] {
        &self.col_rows[col]
    }

    /// Computes the syndrome `H * c` (mod 2) of a full-length codeword.
    ///
    /// Returns one bit per check row; a zero vector means `c` is a
    /// valid codeword.
    #[must_use]
    pub fn syndrome(&self, codeword: &[u8]) -> Vec<u8> {
        debug_assert_eq!(codeword.len(), self.n);
        self.row_cols
            .iter()
            .map(|cols| cols.iter().fold(0u8, |acc, &c| acc ^ codeword[c]))
            .collect()
    }
}

/// Converts 1-indexed, zero-padded AList entries into 0-indexed,
/// exact-degree adjacency lists.
fn trim_and_shift(entries: &[Vec<usize>], degrees: &[usize]) -> Vec<Vec<usize>> {
    entries
        .iter()
        .zip(degrees)
        .map(|(row, &degree)| row.iter().take(degree).map(|&v| v - 1).collect())
        .collect()
}
