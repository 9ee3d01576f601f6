//! The pipeline's error type, a thin wrapper over `sleipnir-core`'s.

use thiserror::Error;

use sleipnir_core::SessionError;

/// Errors surfaced while running a TX or RX pipeline direction.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A session-level error from `sleipnir-core` (an assembler tick,
    /// a parser decode, or a control-directive application).
    #[error(transparent)]
    Session(#[from] SessionError),
}
