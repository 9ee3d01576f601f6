//! TX pipeline wiring (spec §5): an I/O/codec thread feeding the
//! bounded `audio_in` queue, and a superframe thread draining the bus
//! and driving the assembler and modulator, run to completion under
//! one `std::thread::scope` — one OS thread per logical task, no
//! async runtime, matching the explicit-thread model the concurrency
//! section calls for.

use std::time::Duration;

use sleipnir_bus::MessageBus;
use sleipnir_core::{SuperframeAssembler, TxAction, SUPERFRAME_LEN};

use crate::audio_trait::AudioSource;
use crate::cancel::CancellationToken;
use crate::codec_trait::OpusCodec;
use crate::error::PipelineError;
use crate::modem_trait::Modulator;

/// How long the superframe thread sleeps when `audio_in` is empty,
/// before re-checking for cancellation or newly queued traffic.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Runs the TX pipeline until `cancel` fires or `source` is
/// exhausted, ticking the assembler once per superframe's worth (24)
/// of enqueued voice frames.
///
/// # Errors
///
/// Propagates a fatal [`PipelineError`] if the assembler's `tick` or a
/// control-directive application fails; the caller must tear the
/// session down on such an error rather than call `run_tx` again.
pub fn run_tx(
    bus: &MessageBus,
    mut assembler: SuperframeAssembler,
    mut codec: impl OpusCodec,
    mut source: impl AudioSource,
    mut modulator: impl Modulator,
    cancel: CancellationToken,
) -> Result<(), PipelineError> {
    std::thread::scope(|scope| {
        let io_cancel = cancel.clone();
        scope.spawn(move || {
            while !io_cancel.is_canceled() {
                match source.next_frame() {
                    Some(pcm) => bus.audio_in.send(codec.encode(&pcm)),
                    None => break,
                }
            }
        });

        let result = run_superframe_loop(bus, &mut assembler, &mut modulator, &cancel);
        cancel.cancel();
        result
    })
}

fn run_superframe_loop(
    bus: &MessageBus,
    assembler: &mut SuperframeAssembler,
    modulator: &mut impl Modulator,
    cancel: &CancellationToken,
) -> Result<(), PipelineError> {
    let mut frames_since_tick = 0_u32;
    while !cancel.is_canceled() {
        while let Some(directive) = bus.ctrl.try_recv() {
            assembler.session.config.apply_directive(directive)?;
        }
        while let Some(directive) = bus.keys.try_recv() {
            assembler.session.config.apply_directive(directive)?;
        }
        while let Some(message) = bus.text_in.try_recv() {
            assembler.enqueue_text(message);
        }
        while let Some(message) = bus.aprs_in.try_recv() {
            assembler.enqueue_aprs(message);
        }

        match bus.audio_in.try_recv() {
            Some(opus) => {
                assembler.enqueue_voice(opus);
                frames_since_tick += 1;
            },
            None => std::thread::sleep(IDLE_SLEEP),
        }

        if frames_since_tick >= u32::from(SUPERFRAME_LEN - 1) {
            let counter = assembler.session.counter;
            let actions = assembler.tick().map_err(|e| {
                tracing::error!(counter, error = %e, "superframe tick failed, tearing down TX session");
                e
            })?;
            for action in actions {
                let TxAction::EmitCodeword { position, bits } = action;
                modulator.transmit(position, &bits);
            }
            frames_since_tick = 0;
        }
    }
    tracing::debug!("TX superframe loop stopped");
    Ok(())
}
