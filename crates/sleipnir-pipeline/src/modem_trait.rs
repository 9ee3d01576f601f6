//! The external modulator/demodulator collaborators (spec §6): the
//! assembler and parser only ever see LDPC codewords, never the
//! physical layer that carries them.

/// Transmits one LDPC codeword's hard `0`/`1` bits as one physical
/// frame, tagged with its position within the current superframe.
pub trait Modulator: Send {
    /// Transmits one codeword at `position` within its superframe.
    fn transmit(&mut self, position: u8, bits: &[u8]);
}

/// Delivers hard-decision bits for the next received codeword.
///
/// `receive` need only return raw codewords of a matrix-appropriate
/// length (768 bits for the auth matrix, 576 for the voice matrix);
/// the parser's own acquisition scan (spec §4.6) locates superframe
/// boundaries. Implementations should return within a bounded time so
/// the pipeline can observe cancellation promptly — there is no way to
/// interrupt a call already in progress.
pub trait Demodulator: Send {
    /// Blocks until the next codeword is available, or returns `None`
    /// once the channel is closed.
    fn receive(&mut self) -> Option<Vec<u8>>;
}
