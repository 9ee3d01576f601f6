//! Text/APRS fragment header packed into a voice-sized payload's data
//! field (spec §6): `seq_id(1) || frag_index(1) || frag_count(1) ||
//! body(36)`.

use crate::error::FrameError;

/// Number of body bytes carried per fragment.
pub const BODY_LEN: usize = 36;
/// Total packed fragment length (header + body), equal to the
/// voice/text/APRS frame's data capacity.
pub const FRAGMENT_LEN: usize = 39;

/// One fragment of a longer text or APRS message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Identifies which message this fragment belongs to, so a
    /// receiver never interleaves fragments of different messages
    /// (spec §4.5).
    pub seq_id: u8,
    /// Zero-based index of this fragment within its message.
    pub frag_index: u8,
    /// Total number of fragments in this message.
    pub frag_count: u8,
    /// Body bytes, zero-padded if this is the final, partial fragment.
    pub body: [u8; BODY_LEN],
}

impl Fragment {
    /// Packs this fragment into its 39-byte wire representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; FRAGMENT_LEN] {
        let mut out = [0_u8; FRAGMENT_LEN];
        out[0] = self.seq_id;
        out[1] = self.frag_index;
        out[2] = self.frag_count;
        out[3..].copy_from_slice(&self.body);
        out
    }

    /// Unpacks a 39-byte data field into a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::FragmentInvalid`] if `frag_index >=
    /// frag_count` (a well-formed fragment is always within its own
    /// message's bounds).
    pub fn from_bytes(bytes: &[u8; FRAGMENT_LEN]) -> Result<Self, FrameError> {
        let seq_id = bytes[0];
        let frag_index = bytes[1];
        let frag_count = bytes[2];
        if frag_index >= frag_count {
            return Err(FrameError::FragmentInvalid { index: frag_index, count: frag_count });
        }
        let mut body = [0_u8; BODY_LEN];
        body.copy_from_slice(&bytes[3..]);
        Ok(Self { seq_id, frag_index, frag_count, body })
    }
}

/// Splits `message` into consecutive fragments of at most
/// [`BODY_LEN`] bytes each, zero-padding the final fragment, per spec
/// §4.5/§8's 100-byte-message scenario (36 bytes/fragment → 3
/// fragments for a 100-byte message).
///
/// # Panics
///
/// Never: a message of any length (including empty) produces at least
/// one fragment.
#[must_use]
pub fn fragment_message(seq_id: u8, message: &[u8]) -> Vec<Fragment> {
    let frag_count = message.len().div_ceil(BODY_LEN).max(1);
    let frag_count_u8 = frag_count.min(u8::MAX as usize) as u8;
    (0..frag_count)
        .map(|i| {
            let start = i * BODY_LEN;
            let end = (start + BODY_LEN).min(message.len());
            let mut body = [0_u8; BODY_LEN];
            body[..end - start].copy_from_slice(&message[start..end]);
            Fragment { seq_id, frag_index: i as u8, frag_count: frag_count_u8, body }
        })
        .collect()
}

/// Reassembles fragments (already sorted by `frag_index`) of a single
/// message back into its original byte length. The caller supplies the
/// original message length, since the fragment body is zero-padded and
/// cannot otherwise distinguish trailing zero payload bytes from
/// padding.
#[must_use]
pub fn reassemble(fragments: &[Fragment], message_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(message_len);
    for fragment in fragments {
        out.extend_from_slice(&fragment.body);
    }
    out.truncate(message_len);
    out
}
