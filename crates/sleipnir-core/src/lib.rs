//! Sleipnir Core
//!
//! Session state, TX superframe assembly, and RX superframe parsing
//! (spec §3/§4.5/§4.6): the layer that sits between the typed wire
//! codec (`sleipnir-proto`) and the bus/pipeline harness, owning the
//! counter, sync-acquisition state machine, and matrix routing that
//! neither of those lower layers know about.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assembler;
pub mod bits;
pub mod error;
pub mod parser;
pub mod router;
pub mod session;

pub use assembler::{AssemblerLifecycle, SuperframeAssembler, TxAction, SUPERFRAME_LEN};
pub use bits::{bits_to_bytes, bytes_to_bits};
pub use error::{ErrorClass, SessionError};
pub use parser::{RxAction, SuperframeParser};
pub use router::{matrix_for, FrameRouter, MatrixKind};
pub use session::{is_replay, Lifecycle, SessionConfig, SessionState};
