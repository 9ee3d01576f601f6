//! Sleipnir MessageBus
//!
//! The set of typed, bounded queues that form the core's only
//! cross-thread boundary (spec §4.7/§5): audio, text, APRS, control
//! directives, key material, and status events, each with its own
//! capacity and overflow policy.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bus;
pub mod directives;
pub mod events;
pub mod queue;

pub use bus::{MessageBus, OpusFrame};
pub use directives::{Callsign, ControlDirective};
pub use events::{DecoderType, ReassembledMessage, StatusEvent, SyncState};
pub use queue::{BoundedQueue, OverflowPolicy};
