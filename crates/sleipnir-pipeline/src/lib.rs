//! Sleipnir Pipeline
//!
//! Thread wiring between `sleipnir-core`'s session engine and its
//! external collaborators (spec §5/§6): an Opus codec, a
//! modulator/demodulator, and raw PCM audio I/O. Each direction runs
//! as its own pair of explicit OS threads under a `std::thread::scope`
//! — no async runtime — coordinated by a [`CancellationToken`] and the
//! bus's bounded queues, never a shared mutable registry.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod audio_trait;
pub mod cancel;
pub mod codec_trait;
pub mod error;
pub mod modem_trait;
pub mod rx;
pub mod tx;

pub use audio_trait::{AudioSink, AudioSource};
pub use cancel::CancellationToken;
pub use codec_trait::{OpusCodec, SAMPLES_PER_FRAME};
pub use error::PipelineError;
pub use modem_trait::{Demodulator, Modulator};
pub use rx::run_rx;
pub use tx::run_tx;
