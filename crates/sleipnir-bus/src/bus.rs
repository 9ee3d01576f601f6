//! `MessageBus`: the nine named, bounded queues spec §4.7 defines as
//! the core's only cross-thread boundary.

use crate::directives::ControlDirective;
use crate::events::{ReassembledMessage, StatusEvent};
use crate::queue::{BoundedQueue, OverflowPolicy};

/// An opaque 40-byte Opus frame, as spec §6 defines it.
pub type OpusFrame = [u8; 40];

/// The full set of typed queues a session's worker threads share.
/// Cloning a `MessageBus` clones the queue handles, not their
/// contents; every queue still has exactly one logical sender and one
/// logical receiver (spec §5).
#[derive(Clone)]
pub struct MessageBus {
    /// Opus frames arriving from the upstream audio encoder (TX).
    pub audio_in: BoundedQueue<OpusFrame>,
    /// Outgoing text messages to fragment and transmit (TX).
    pub text_in: BoundedQueue<Vec<u8>>,
    /// Outgoing APRS packets to fragment and transmit (TX).
    pub aprs_in: BoundedQueue<Vec<u8>>,
    /// Control directives (spec §6), consumed by the session.
    pub ctrl: BoundedQueue<ControlDirective>,
    /// Key-material updates; only the newest is ever meaningful.
    pub keys: BoundedQueue<ControlDirective>,
    /// Opus frames decoded from RX, bound for the audio sink.
    pub audio_out: BoundedQueue<OpusFrame>,
    /// Reassembled text messages delivered from RX.
    pub text_out: BoundedQueue<ReassembledMessage>,
    /// Reassembled APRS packets delivered from RX.
    pub aprs_out: BoundedQueue<ReassembledMessage>,
    /// Per-frame status events, the single source of truth for
    /// user-visible failure (spec §7).
    pub status_out: BoundedQueue<StatusEvent>,
}

impl MessageBus {
    /// Builds a fresh bus with the exact bounds and overflow policies
    /// spec §4.7's table mandates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            audio_in: BoundedQueue::new(24, OverflowPolicy::Block),
            text_in: BoundedQueue::new(64, OverflowPolicy::DropOldest),
            aprs_in: BoundedQueue::new(64, OverflowPolicy::DropOldest),
            ctrl: BoundedQueue::new(16, OverflowPolicy::Block),
            keys: BoundedQueue::new(4, OverflowPolicy::Replace),
            audio_out: BoundedQueue::new(24, OverflowPolicy::DropOldest),
            text_out: BoundedQueue::new(64, OverflowPolicy::DropOldest),
            aprs_out: BoundedQueue::new(64, OverflowPolicy::DropOldest),
            status_out: BoundedQueue::new(128, OverflowPolicy::DropOldest),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues_carry_their_spec_bounds() {
        let bus = MessageBus::new();
        assert_eq!(bus.audio_in.capacity(), 24);
        assert_eq!(bus.text_in.capacity(), 64);
        assert_eq!(bus.aprs_in.capacity(), 64);
        assert_eq!(bus.ctrl.capacity(), 16);
        assert_eq!(bus.keys.capacity(), 4);
        assert_eq!(bus.audio_out.capacity(), 24);
        assert_eq!(bus.text_out.capacity(), 64);
        assert_eq!(bus.aprs_out.capacity(), 64);
        assert_eq!(bus.status_out.capacity(), 128);
    }

    #[test]
    fn queues_carry_their_spec_overflow_policy() {
        let bus = MessageBus::new();
        assert_eq!(bus.audio_in.policy(), OverflowPolicy::Block);
        assert_eq!(bus.ctrl.policy(), OverflowPolicy::Block);
        assert_eq!(bus.keys.policy(), OverflowPolicy::Replace);
        assert_eq!(bus.status_out.policy(), OverflowPolicy::DropOldest);
    }

    #[test]
    fn cloned_bus_handles_share_the_same_underlying_queue() {
        let bus = MessageBus::new();
        let clone = bus.clone();
        bus.status_out.send(StatusEvent {
            superframe_counter: 0,
            position: 0,
            signature_valid: None,
            mac_valid: None,
            decoder_converged: true,
            syndrome_residual: 0,
            sender_callsign: None,
            sync_state: crate::events::SyncState::Searching,
            decoder_type: crate::events::DecoderType::HardDecision,
        });
        assert_eq!(clone.status_out.len(), 1);
    }
}
