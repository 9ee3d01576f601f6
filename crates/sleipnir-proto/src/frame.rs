//! Builds and parses Sleipnir's fixed-size wire frames (spec §3/§4.1/§6).
//!
//! Voice/text/APRS frames share one 48-byte layout:
//! `tag(1) || data(39) || mac8(8)`. Sync frames reuse the same 48-byte
//! size but a different, tag-less layout recognized by magic match
//! (see SPEC_FULL.md's "Resolved inconsistencies" for why sync carries
//! no literal tag byte). Auth frames are 32 bytes and are not built or
//! parsed here — the auth payload is just a signature's wire bytes,
//! handled directly by `sleipnir-crypto::ecdsa::Signature`.
//!
//! # Security
//!
//! Validation on parse always follows spec §4.1's order: sync magic
//! first, then tag dispatch, then (for non-sync tags, when a key is
//! present) truncated-AEAD verification. A failed AEAD check is
//! reported as [`FrameError::MacInvalid`] and never yields partial
//! plaintext.

use sleipnir_crypto::aead::{self, KEY_LEN, NONCE_LEN};
use sleipnir_crypto::CryptoError;

use crate::error::FrameError;
use crate::fragment::{Fragment, FRAGMENT_LEN};
use crate::nonce::derive_nonce;
use crate::tag::Tag;

/// Length in bytes of a voice/text/APRS/sync payload.
pub const PAYLOAD_LEN: usize = 48;
/// Length in bytes of the data field after the tag byte.
pub const DATA_LEN: usize = 39;
/// Length in bytes of the truncated on-wire MAC.
pub const MAC_LEN: usize = 8;
/// Length in bytes of an upstream Opus frame (spec §6), one byte
/// larger than [`DATA_LEN`] — see SPEC_FULL.md's resolved
/// inconsistency for how this implementation reconciles the two.
pub const OPUS_FRAME_LEN: usize = 40;
/// Sync frame magic constant (spec §3/§6).
pub const SYNC_MAGIC: [u8; 8] = [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE];

/// Symmetric key material used to encrypt/authenticate a single frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameKey<'a> {
    /// The 32-byte session AEAD key.
    pub mac_key: &'a [u8; KEY_LEN],
    /// The session's 12-byte nonce base (spec §6).
    pub nonce_base: &'a [u8; NONCE_LEN],
}

/// Associated data bound into a frame's AEAD computation (spec §6):
/// superframe counter, position, and sender callsign.
#[derive(Debug, Clone, Copy)]
pub struct FrameAad {
    /// Superframe counter.
    pub counter: u32,
    /// Position within the superframe (0..24).
    pub position: u8,
    /// 5-byte ASCII, space-padded, uppercase sender callsign.
    pub callsign: [u8; 5],
}

impl FrameAad {
    fn associated_data(self, tag: u8) -> [u8; 11] {
        let mut out = [0_u8; 11];
        out[0] = tag;
        out[1..5].copy_from_slice(&self.counter.to_be_bytes());
        out[5] = self.position;
        out[6..11].copy_from_slice(&self.callsign);
        out
    }
}

/// A frame as parsed from the wire (sync frames carry only a counter;
/// auth frames are not represented here — see the module docs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFrame {
    /// A voice slot. `opus` is the reconstructed 40-byte Opus frame.
    Voice {
        /// Reconstructed Opus frame bytes.
        opus: [u8; OPUS_FRAME_LEN],
        /// `Some(true)` if a key was supplied and the MAC verified;
        /// `None` if the frame was plaintext.
        mac_valid: Option<bool>,
    },
    /// A text fragment slot.
    Text {
        /// The unpacked fragment.
        fragment: Fragment,
        /// See [`ParsedFrame::Voice::mac_valid`].
        mac_valid: Option<bool>,
    },
    /// An APRS fragment slot.
    Aprs {
        /// The unpacked fragment.
        fragment: Fragment,
        /// See [`ParsedFrame::Voice::mac_valid`].
        mac_valid: Option<bool>,
    },
    /// A sync frame.
    Sync {
        /// The superframe counter carried by the sync frame.
        counter: u32,
    },
}

fn nonce_for(key: &FrameKey<'_>, aad: FrameAad) -> [u8; NONCE_LEN] {
    derive_nonce(key.nonce_base, aad.counter, aad.position)
}

fn build_data_slot(tag: Tag, data: &[u8; DATA_LEN], key: Option<FrameKey<'_>>, aad: FrameAad) -> Result<[u8; PAYLOAD_LEN], FrameError> {
    let mut payload = [0_u8; PAYLOAD_LEN];
    payload[0] = tag.to_byte();

    match key {
        Some(key) => {
            let nonce = nonce_for(&key, aad);
            let associated_data = aad.associated_data(tag.to_byte());
            let (ciphertext, tag8) = aead::seal_truncated(key.mac_key, &nonce, &associated_data, data)
                .map_err(map_crypto_err)?;
            payload[1..1 + DATA_LEN].copy_from_slice(&ciphertext);
            payload[1 + DATA_LEN..].copy_from_slice(&tag8);
        },
        None => {
            payload[1..1 + DATA_LEN].copy_from_slice(data);
        },
    }
    Ok(payload)
}

fn open_data_slot(tag: Tag, payload: &[u8; PAYLOAD_LEN], key: Option<FrameKey<'_>>, aad: FrameAad) -> Result<([u8; DATA_LEN], Option<bool>), FrameError> {
    let body: [u8; DATA_LEN] = payload[1..1 + DATA_LEN].try_into().unwrap_or([0; DATA_LEN]);
    match key {
        Some(key) => {
            let nonce = nonce_for(&key, aad);
            let associated_data = aad.associated_data(tag.to_byte());
            let mut tag8 = [0_u8; MAC_LEN];
            tag8.copy_from_slice(&payload[1 + DATA_LEN..]);
            let plaintext = aead::open_truncated(key.mac_key, &nonce, &associated_data, &body, &tag8)
                .map_err(map_crypto_err)?;
            let mut data = [0_u8; DATA_LEN];
            data.copy_from_slice(&plaintext);
            Ok((data, Some(true)))
        },
        None => Ok((body, None)),
    }
}

fn map_crypto_err(err: CryptoError) -> FrameError {
    match err {
        CryptoError::MacInvalid => FrameError::MacInvalid,
        _ => FrameError::MacInvalid,
    }
}

/// Builds a voice slot. When `key` is present, `opus`'s first 39 bytes
/// are sealed with ChaCha20-Poly1305; the 40th byte is never
/// transmitted (see the resolved-inconsistency note in SPEC_FULL.md).
///
/// # Errors
///
/// Propagates [`FrameError::MacInvalid`] if the underlying AEAD seal
/// fails (only reachable on malformed key/nonce lengths).
pub fn build_voice(opus: &[u8; OPUS_FRAME_LEN], key: Option<FrameKey<'_>>, aad: FrameAad) -> Result<[u8; PAYLOAD_LEN], FrameError> {
    let mut data = [0_u8; DATA_LEN];
    data.copy_from_slice(&opus[..DATA_LEN]);
    build_data_slot(Tag::Voice, &data, key, aad)
}

/// Builds a text slot from a pre-split [`Fragment`].
///
/// # Errors
///
/// See [`build_voice`].
pub fn build_text(fragment: &Fragment, key: Option<FrameKey<'_>>, aad: FrameAad) -> Result<[u8; PAYLOAD_LEN], FrameError> {
    build_data_slot(Tag::Text, &fragment.to_bytes(), key, aad)
}

/// Builds an APRS slot from a pre-split [`Fragment`].
///
/// # Errors
///
/// See [`build_voice`].
pub fn build_aprs(fragment: &Fragment, key: Option<FrameKey<'_>>, aad: FrameAad) -> Result<[u8; PAYLOAD_LEN], FrameError> {
    build_data_slot(Tag::Aprs, &fragment.to_bytes(), key, aad)
}

/// Builds a sync frame carrying `counter` (spec §6). Sync frames are
/// never encrypted (spec §4.5 step 3: "if encryption_on and the frame
/// is non-sync").
#[must_use]
pub fn build_sync(counter: u32) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0_u8; PAYLOAD_LEN];
    payload[0..8].copy_from_slice(&SYNC_MAGIC);
    payload[8..12].copy_from_slice(&counter.to_be_bytes());
    // position_be32 is always 0; the remaining 32 bytes are already zero.
    payload
}

/// Parses a 48-byte payload. `key`/`aad` are consulted only for
/// non-sync tags.
///
/// # Errors
///
/// - [`FrameError::UnknownTag`] if the payload is not a sync frame and
///   its first byte is not `0x00`/`0x01`/`0x02`.
/// - [`FrameError::MacInvalid`] if `key` is present and the truncated
///   AEAD tag does not verify.
pub fn parse(payload: &[u8; PAYLOAD_LEN], key: Option<FrameKey<'_>>, aad: FrameAad) -> Result<ParsedFrame, FrameError> {
    if payload[0..8] == SYNC_MAGIC {
        let counter = u32::from_be_bytes(payload[8..12].try_into().unwrap_or([0; 4]));
        return Ok(ParsedFrame::Sync { counter });
    }

    let tag = Tag::from_byte(payload[0])?;
    match tag {
        Tag::Voice => {
            let (data, mac_valid) = open_data_slot(tag, payload, key, aad)?;
            let mut opus = [0_u8; OPUS_FRAME_LEN];
            opus[..DATA_LEN].copy_from_slice(&data);
            opus[DATA_LEN] = data[DATA_LEN - 1];
            Ok(ParsedFrame::Voice { opus, mac_valid })
        },
        Tag::Text | Tag::Aprs => {
            let (data, mac_valid) = open_data_slot(tag, payload, key, aad)?;
            let bytes: [u8; FRAGMENT_LEN] = data;
            let fragment = Fragment::from_bytes(&bytes)?;
            if tag == Tag::Text {
                Ok(ParsedFrame::Text { fragment, mac_valid })
            } else {
                Ok(ParsedFrame::Aprs { fragment, mac_valid })
            }
        },
        Tag::Sync => unreachable!("sync frames are recognized by magic match above"),
    }
}
