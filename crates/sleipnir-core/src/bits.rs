//! Byte/bit conversion at the LDPC boundary (spec §3: "Bit order is
//! big-endian per byte; systematic bits occupy the low indices").

/// Unpacks bytes into one `0`/`1` entry per bit, MSB first.
#[must_use]
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1)).collect()
}

/// Packs `0`/`1` bits (MSB first) back into bytes.
///
/// # Panics
///
/// Panics in debug builds if `bits.len()` is not a multiple of 8.
#[must_use]
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    debug_assert_eq!(bits.len() % 8, 0, "bit count must be byte-aligned");
    bits.chunks(8).map(|chunk| chunk.iter().fold(0_u8, |acc, &bit| (acc << 1) | (bit & 1))).collect()
}
