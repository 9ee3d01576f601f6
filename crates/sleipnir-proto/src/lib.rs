//! Sleipnir Wire Protocol
//!
//! Builds and parses the fixed-size frame payloads defined in spec
//! §3/§4.1/§6: 48-byte voice/text/APRS/sync payloads and the 32-byte
//! auth payload (the latter handled directly via
//! `sleipnir_crypto::ecdsa::Signature`, since it is just a signature's
//! wire bytes with no further structure).
//!
//! # Layout
//!
//! ```text
//! Voice/Text/APRS: tag(1) || data(39) || mac8(8)        = 48 bytes
//! Sync:            magic(8) || counter(4) || 0(4) || 0(32) = 48 bytes
//! Auth:            signature_r(32)                          = 32 bytes
//! ```
//!
//! See [`frame`] for the codec, [`fragment`] for the text/APRS
//! sub-payload, and [`nonce`] for per-frame nonce derivation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod fragment;
pub mod frame;
pub mod nonce;
pub mod tag;

pub use error::{ErrorClass, FrameError};
pub use frame::{
    build_aprs, build_sync, build_text, build_voice, parse, FrameAad, FrameKey, ParsedFrame, DATA_LEN,
    MAC_LEN, OPUS_FRAME_LEN, PAYLOAD_LEN, SYNC_MAGIC,
};
pub use fragment::{fragment_message, reassemble, Fragment, BODY_LEN, FRAGMENT_LEN};
pub use tag::Tag;
