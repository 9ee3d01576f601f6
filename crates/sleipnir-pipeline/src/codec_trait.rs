//! The external Opus codec collaborator (spec §6): "the core treats
//! the Opus frame as an opaque 40-byte blob," so encode/decode live
//! entirely outside `sleipnir-core`.

/// Number of 8 kHz mono samples in one 40 ms Opus frame (25 fps).
pub const SAMPLES_PER_FRAME: usize = 320;

/// Encodes/decodes the 40-byte Opus frame the core itself never
/// interprets. Implementations own their own encoder/decoder state;
/// Opus internals are out of scope here (spec §6).
pub trait OpusCodec: Send {
    /// Encodes one frame of 8 kHz mono PCM into a 40-byte Opus frame.
    fn encode(&mut self, pcm: &[f32; SAMPLES_PER_FRAME]) -> [u8; 40];

    /// Decodes a 40-byte Opus frame back into one frame of PCM.
    fn decode(&mut self, opus: &[u8; 40]) -> [f32; SAMPLES_PER_FRAME];
}
