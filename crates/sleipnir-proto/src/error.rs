//! Error types for Sleipnir wire framing.

use thiserror::Error;

/// Coarse severity classes from spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Drop at frame granularity, emit a status event, continue.
    RecoverableFrame,
    /// Annotate and still deliver the superframe's payloads.
    RecoverableSuperframe,
}

/// Errors returned while building or parsing a Sleipnir frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The payload buffer was not the expected fixed length.
    #[error("payload length {actual} does not match expected {expected}")]
    LengthMismatch {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// The tag byte did not match any of the four legal values.
    #[error("unknown tag byte {0:#04x}")]
    UnknownTag(u8),

    /// The truncated AEAD tag did not verify.
    #[error("MAC invalid")]
    MacInvalid,

    /// A sync frame's magic constant did not match.
    #[error("sync magic invalid")]
    SyncMagicInvalid,

    /// A superframe counter moved backwards by more than half the
    /// counter space, indicating replay.
    #[error("counter replay: last={last} received={received}")]
    CounterReplay {
        /// Last accepted counter.
        last: u32,
        /// Counter carried by the replayed frame.
        received: u32,
    },

    /// A fragment header claimed more fragments than fit the message.
    #[error("fragment header invalid: index {index} >= count {count}")]
    FragmentInvalid {
        /// The fragment index claimed.
        index: u8,
        /// The fragment count claimed.
        count: u8,
    },
}

impl FrameError {
    /// Classify this error per spec §7's error taxonomy.
    #[must_use]
    pub fn classify(&self) -> ErrorClass {
        match self {
            Self::LengthMismatch { .. }
            | Self::UnknownTag(_)
            | Self::MacInvalid
            | Self::SyncMagicInvalid
            | Self::FragmentInvalid { .. } => ErrorClass::RecoverableFrame,
            Self::CounterReplay { .. } => ErrorClass::RecoverableSuperframe,
        }
    }
}
