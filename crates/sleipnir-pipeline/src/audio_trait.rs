//! The raw PCM audio I/O collaborators. Spec §6 names the Opus codec
//! explicitly; this crate needs a thin, symmetric contract for
//! whatever produces/consumes the codec's PCM on either end of it.

use crate::codec_trait::SAMPLES_PER_FRAME;

/// A source of raw 8 kHz mono PCM audio, external to the core.
pub trait AudioSource: Send {
    /// Blocks until the next frame's worth of samples is ready, or
    /// returns `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<[f32; SAMPLES_PER_FRAME]>;
}

/// A sink for raw 8 kHz mono PCM audio, external to the core.
pub trait AudioSink: Send {
    /// Consumes one frame's worth of decoded PCM samples.
    fn push_frame(&mut self, pcm: [f32; SAMPLES_PER_FRAME]);
}
