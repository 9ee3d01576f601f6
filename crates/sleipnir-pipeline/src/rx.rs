//! RX pipeline wiring (spec §5): a demodulator-driven superframe
//! thread and a decoupled audio-decode thread, connected by a private
//! channel so a slow physical audio sink never stalls frame parsing —
//! the same reason the bus keeps `audio_out` a single-consumer queue
//! rather than letting this module's own playback loop drain it too.

use std::sync::mpsc;
use std::time::Duration;

use sleipnir_bus::{MessageBus, SyncState};
use sleipnir_core::{RxAction, SuperframeParser};

use crate::audio_trait::AudioSink;
use crate::cancel::CancellationToken;
use crate::codec_trait::OpusCodec;
use crate::error::PipelineError;
use crate::modem_trait::Demodulator;

/// How often the audio-decode thread re-checks for cancellation while
/// waiting for the next delivered frame.
const SINK_POLL: Duration = Duration::from_millis(20);

/// Runs the RX pipeline until `cancel` fires or `demodulator` closes.
///
/// # Errors
///
/// Propagates a fatal [`PipelineError`] if the parser's `on_codeword`
/// or a control-directive application fails.
pub fn run_rx(
    bus: &MessageBus,
    mut parser: SuperframeParser,
    mut codec: impl OpusCodec,
    mut sink: impl AudioSink,
    mut demodulator: impl Demodulator,
    cancel: CancellationToken,
) -> Result<(), PipelineError> {
    let (audio_tx, audio_rx) = mpsc::channel::<[u8; 40]>();

    std::thread::scope(|scope| {
        let sink_cancel = cancel.clone();
        scope.spawn(move || loop {
            match audio_rx.recv_timeout(SINK_POLL) {
                Ok(opus) => sink.push_frame(codec.decode(&opus)),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if sink_cancel.is_canceled() {
                        break;
                    }
                },
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        });

        let result = run_superframe_loop(bus, &mut parser, &mut demodulator, &audio_tx, &cancel);
        cancel.cancel();
        result
    })
}

fn run_superframe_loop(
    bus: &MessageBus,
    parser: &mut SuperframeParser,
    demodulator: &mut impl Demodulator,
    audio_tx: &mpsc::Sender<[u8; 40]>,
    cancel: &CancellationToken,
) -> Result<(), PipelineError> {
    let mut was_synced = false;
    while !cancel.is_canceled() {
        while let Some(directive) = bus.ctrl.try_recv() {
            parser.session.config.apply_directive(directive)?;
        }
        while let Some(directive) = bus.keys.try_recv() {
            parser.session.config.apply_directive(directive)?;
        }

        let Some(bits) = demodulator.receive() else {
            tracing::debug!("demodulator closed, stopping RX superframe loop");
            break;
        };

        let actions = parser.on_codeword(&bits).map_err(|e| {
            tracing::error!(error = %e, "codeword decode failed, tearing down RX session");
            e
        })?;
        for action in actions {
            match action {
                RxAction::DeliverVoice(opus) => {
                    bus.audio_out.send(opus);
                    let _ = audio_tx.send(opus);
                },
                RxAction::DeliverText(message) => bus.text_out.send(message),
                RxAction::DeliverAprs(message) => bus.aprs_out.send(message),
                RxAction::Status(event) => bus.status_out.send(event),
            }
        }

        let now_synced = parser.session.sync_state == SyncState::Synced;
        if was_synced && !now_synced {
            tracing::warn!(counter = parser.session.counter, "sync lost, re-acquiring");
        }
        was_synced = now_synced;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use sleipnir_core::{SessionConfig, SessionState, SuperframeAssembler, TxAction};
    use sleipnir_ldpc::{auth_matrix, voice_matrix};

    use super::*;
    use crate::codec_trait::SAMPLES_PER_FRAME;

    struct SilentCodec;
    impl OpusCodec for SilentCodec {
        fn encode(&mut self, _pcm: &[f32; SAMPLES_PER_FRAME]) -> [u8; 40] {
            [0; 40]
        }
        fn decode(&mut self, opus: &[u8; 40]) -> [f32; SAMPLES_PER_FRAME] {
            let mut pcm = [0.0; SAMPLES_PER_FRAME];
            pcm[0] = f32::from(opus[0]);
            pcm
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<usize>>);
    impl AudioSink for RecordingSink {
        fn push_frame(&mut self, _pcm: [f32; SAMPLES_PER_FRAME]) {
            *self.0.lock().expect("sink mutex poisoned") += 1;
        }
    }

    struct QueueDemodulator(std::collections::VecDeque<Vec<u8>>);
    impl Demodulator for QueueDemodulator {
        fn receive(&mut self) -> Option<Vec<u8>> {
            self.0.pop_front()
        }
    }

    #[test]
    fn one_superframe_yields_24_decoded_frames_then_stops() {
        let session = SessionState::new(SessionConfig::new(*b"N0CAL"));
        let mut asm = SuperframeAssembler::new(session, auth_matrix().unwrap(), voice_matrix().unwrap());
        let codewords: Vec<Vec<u8>> = asm
            .tick()
            .expect("tick")
            .into_iter()
            .map(|TxAction::EmitCodeword { bits, .. }| bits)
            .collect();

        let bus = MessageBus::new();
        let parser_session = SessionState::new(SessionConfig::new(*b"N0CAL"));
        let parser = SuperframeParser::new(parser_session, auth_matrix().unwrap(), voice_matrix().unwrap());
        let sink = RecordingSink::default();
        let delivered = sink.0.clone();
        let demodulator = QueueDemodulator(codewords.into());
        let cancel = CancellationToken::new();

        run_rx(&bus, parser, SilentCodec, sink, demodulator, cancel).expect("run_rx");

        assert_eq!(*delivered.lock().expect("sink mutex poisoned"), 24);
        assert_eq!(bus.audio_out.len(), 24);
        assert_eq!(bus.status_out.len(), 25);
    }
}
