//! Parser for the AList sparse parity-check matrix format (spec §6).
//!
//! The format is whitespace-delimited integers; this parser tokenizes
//! the whole file rather than trusting exact line breaks, which is
//! more forgiving of trailing whitespace while still enforcing every
//! count the bit-exact format specifies.

use crate::error::LdpcError;

/// The raw, still-1-indexed contents of an AList file.
#[derive(Debug, Clone)]
pub struct AlistData {
    /// Number of check rows (`m`).
    pub nrows: usize,
    /// Number of columns (`n`).
    pub ncols: usize,
    /// Per-column degree (non-zero-padded count of entries).
    pub col_degrees: Vec<usize>,
    /// Per-row degree (non-zero-padded count of entries).
    pub row_degrees: Vec<usize>,
    /// 1-indexed row positions per column, zero-padded to the file's
    /// `max_col_degree`.
    pub col_rows: Vec<Vec<usize>>,
    /// 1-indexed column positions per row, zero-padded to the file's
    /// `max_row_degree`.
    pub row_cols: Vec<Vec<usize>>,
}

/// Parses AList text per spec §6's bit-exact layout.
///
/// # Errors
///
/// Returns [`LdpcError::AListMalformed`] if the token stream is short,
/// non-numeric, or any row/column index is out of range.
pub fn parse(text: &str) -> Result<AlistData, LdpcError> {
    let mut tokens = text.split_ascii_whitespace();
    let mut next_usize = |what: &'static str| -> Result<usize, LdpcError> {
        tokens
            .next()
            .ok_or_else(|| LdpcError::AListMalformed(format!("missing token: {what}")))?
            .parse::<usize>()
            .map_err(|_| LdpcError::AListMalformed(format!("non-numeric token: {what}")))
    };

    let nrows = next_usize("nrows")?;
    let ncols = next_usize("ncols")?;
    let max_col_degree = next_usize("max_col_degree")?;
    let max_row_degree = next_usize("max_row_degree")?;

    let col_degrees = (0..ncols).map(|_| next_usize("col_degree")).collect::<Result<Vec<_>, _>>()?;
    let row_degrees = (0..nrows).map(|_| next_usize("row_degree")).collect::<Result<Vec<_>, _>>()?;

    let col_rows = (0..ncols)
        .map(|_| (0..max_col_degree).map(|_| next_usize("col_row_entry")).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    let row_cols = (0..nrows)
        .map(|_| (0..max_row_degree).map(|_| next_usize("row_col_entry")).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    if tokens.next().is_some() {
        return Err(LdpcError::AListMalformed("trailing tokens after matrix body".to_string()));
    }

    for (col, entries) in col_rows.iter().enumerate() {
        for &entry in entries.iter().filter(|&&e| e != 0) {
            if entry > nrows {
                return Err(LdpcError::AListMalformed(format!(
                    "column {col} references out-of-range row {entry}"
                )));
            }
        }
    }
    for (row, entries) in row_cols.iter().enumerate() {
        for &entry in entries.iter().filter(|&&e| e != 0) {
            if entry > ncols {
                return Err(LdpcError::AListMalformed(format!(
                    "row {row} references out-of-range column {entry}"
                )));
            }
        }
    }

    Ok(AlistData { nrows, ncols, col_degrees, row_degrees, col_rows, row_cols })
}
