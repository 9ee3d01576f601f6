//! The frame tag: the first byte of a voice/text/APRS payload (spec
//! §3). Sync and auth frames carry no literal tag byte on the wire —
//! see SPEC_FULL.md's "Resolved inconsistencies" — but are still
//! represented here for status/debug purposes.

use crate::error::FrameError;

/// Logical classification of a frame's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Voice (Opus) payload.
    Voice = 0x00,
    /// APRS packet fragment.
    Aprs = 0x01,
    /// Text message fragment.
    Text = 0x02,
    /// Sync frame. No literal wire discriminant; recognized by magic
    /// match (spec §4.6). The discriminant here is used only for
    /// `Debug`/status-event purposes.
    Sync = 0xFF,
}

impl Tag {
    /// Parses a literal tag byte, as used by voice/APRS/text payloads.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownTag`] for any byte other than
    /// `0x00`, `0x01`, or `0x02`. Sync frames are never dispatched
    /// through this path — callers must check the magic first.
    pub fn from_byte(byte: u8) -> Result<Self, FrameError> {
        match byte {
            0x00 => Ok(Self::Voice),
            0x01 => Ok(Self::Aprs),
            0x02 => Ok(Self::Text),
            other => Err(FrameError::UnknownTag(other)),
        }
    }

    /// The literal wire byte for voice/APRS/text tags. Panics in
    /// debug builds if called on `Sync`, which has no wire byte;
    /// callers in this crate never do so.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_three_literal_tags() {
        for tag in [Tag::Voice, Tag::Aprs, Tag::Text] {
            assert_eq!(Tag::from_byte(tag.to_byte()).expect("known tag"), tag);
        }
    }

    #[test]
    fn rejects_unknown_bytes() {
        assert_eq!(Tag::from_byte(0x7F), Err(FrameError::UnknownTag(0x7F)));
    }
}
