//! Status events and reassembled-message records carried on the bus
//! (spec §6/§4.6).

use crate::directives::Callsign;

/// The sync-acquisition state machine (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No valid superframe boundary has been found yet.
    Searching,
    /// Locked onto a superframe boundary and counter.
    Synced,
    /// Lost lock after repeated counter mismatches or MAC failures;
    /// about to re-enter `Searching`.
    Lost,
}

/// Which LDPC decoding strategy produced a frame's `decoder_converged`
/// / `syndrome_residual` fields. Spec §9 asks that a future
/// soft-decision decoder be observable here without a wire-format
/// change; today only hard-decision decoding is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecoderType {
    /// Gallager hard-decision bit-flipping (the only decoder today).
    HardDecision,
}

/// One status event per processed frame (spec §6): `{superframe_counter,
/// position, signature_valid?, mac_valid?, decoder_converged,
/// syndrome_residual, sender_callsign, sync_state}`, plus the
/// `decoder_type` forward-compatibility field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    /// The superframe this frame belongs to.
    pub superframe_counter: u32,
    /// Position within the superframe, `0..25`.
    pub position: u8,
    /// Set only for the position-0 auth frame.
    pub signature_valid: Option<bool>,
    /// Set for every frame once LDPC decoding completes.
    pub mac_valid: Option<bool>,
    /// Whether the LDPC decoder's syndrome reached zero.
    pub decoder_converged: bool,
    /// Number of unsatisfied checks remaining after decoding.
    pub syndrome_residual: u32,
    /// The callsign attributed to this frame, if known.
    pub sender_callsign: Option<Callsign>,
    /// The parser's sync state at the time this event was emitted.
    pub sync_state: SyncState,
    /// Which decoder produced this event's decode fields.
    pub decoder_type: DecoderType,
}

/// A fully reassembled text or APRS message delivered on `text_out` /
/// `aprs_out`, with its sender attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassembledMessage {
    /// The callsign that sent this message.
    pub sender_callsign: Callsign,
    /// The reassembled, unpadded payload bytes.
    pub body: Vec<u8>,
}
