//! `SuperframeAssembler`: the TX core (spec §4.5). Composes one
//! 25-frame superframe per tick and returns the actions the caller
//! (the pipeline harness) must carry out — this assembler performs no
//! I/O itself.

use std::collections::VecDeque;

use sha2::{Digest, Sha256};

use sleipnir_crypto::ecdsa;
use sleipnir_ldpc::ParityCheckMatrix;
use sleipnir_proto::{build_aprs, build_sync, build_text, build_voice, fragment_message, Fragment, FrameAad, FrameKey};

use crate::bits::bytes_to_bits;
use crate::error::SessionError;
use crate::router::{self, FrameRouter};
use crate::session::SessionState;

/// Number of frames in one superframe (spec §3).
pub const SUPERFRAME_LEN: u8 = 25;
/// Bound on each priority queue's pending-message backlog.
const TEXT_APRS_QUEUE_CAP: usize = 64;
/// Bound on the voice queue (spec §4.7's `audio_in` bound).
const VOICE_QUEUE_CAP: usize = 24;

/// The assembler's PTT-driven lifecycle (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerLifecycle {
    /// No superframe is being assembled.
    Idle,
    /// Actively assembling superframes.
    Active,
    /// Finishing the current superframe before returning to `Idle`.
    Draining,
}

/// One action the caller must carry out after a `tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxAction {
    /// Send this LDPC codeword (big-endian-unpacked bits) at this
    /// position in the current superframe, in emission order.
    EmitCodeword {
        /// Position within the superframe, `0..25`.
        position: u8,
        /// The codeword's bits, one `0`/`1` byte per bit.
        bits: Vec<u8>,
    },
}

struct FragmentStream {
    remaining: VecDeque<Fragment>,
}

fn next_fragment(
    next_seq_id: &mut u8,
    pending: &mut VecDeque<Vec<u8>>,
    active: &mut Option<FragmentStream>,
) -> Option<Fragment> {
    if let Some(stream) = active {
        if let Some(fragment) = stream.remaining.pop_front() {
            if stream.remaining.is_empty() {
                *active = None;
            }
            return Some(fragment);
        }
        *active = None;
    }

    let message = pending.pop_front()?;
    let seq_id = *next_seq_id;
    *next_seq_id = next_seq_id.wrapping_add(1);

    let mut fragments: VecDeque<Fragment> = fragment_message(seq_id, &message).into();
    let first = fragments.pop_front();
    if !fragments.is_empty() {
        *active = Some(FragmentStream { remaining: fragments });
    }
    first
}

fn push_bounded<T>(queue: &mut VecDeque<T>, cap: usize, item: T) {
    if queue.len() >= cap {
        queue.pop_front();
    }
    queue.push_back(item);
}

/// Composes superframes from queued voice/text/APRS traffic (spec §4.5).
pub struct SuperframeAssembler {
    /// The owning session (counter, config, nonce registry).
    pub session: SessionState,
    auth_matrix: ParityCheckMatrix,
    voice_matrix: ParityCheckMatrix,
    lifecycle: AssemblerLifecycle,
    pending_release: bool,
    aprs_pending: VecDeque<Vec<u8>>,
    text_pending: VecDeque<Vec<u8>>,
    voice_pending: VecDeque<[u8; 40]>,
    active_aprs: Option<FragmentStream>,
    active_text: Option<FragmentStream>,
    next_seq_id: u8,
}

impl SuperframeAssembler {
    /// Builds an assembler over an already-configured session and the
    /// two loaded matrices.
    #[must_use]
    pub fn new(session: SessionState, auth_matrix: ParityCheckMatrix, voice_matrix: ParityCheckMatrix) -> Self {
        Self {
            session,
            auth_matrix,
            voice_matrix,
            lifecycle: AssemblerLifecycle::Idle,
            pending_release: false,
            aprs_pending: VecDeque::new(),
            text_pending: VecDeque::new(),
            voice_pending: VecDeque::new(),
            active_aprs: None,
            active_text: None,
            next_seq_id: 0,
        }
    }

    /// The assembler's current PTT-driven lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> AssemblerLifecycle {
        self.lifecycle
    }

    /// PTT asserted: start (or continue) assembling superframes.
    pub fn key_up(&mut self) {
        self.lifecycle = AssemblerLifecycle::Active;
        self.pending_release = false;
    }

    /// PTT released. The in-progress superframe (if any) is still
    /// completed by the next `tick`; the assembler only drops to
    /// `Idle` afterward (spec §4.5's flush semantics).
    pub fn key_down(&mut self) {
        if self.lifecycle == AssemblerLifecycle::Active {
            self.lifecycle = AssemblerLifecycle::Draining;
        }
        self.pending_release = true;
    }

    /// Enqueues one 40-byte Opus frame. Overwrites the oldest queued
    /// frame if `voice_q` is full (spec §4.5: "realtime-overwriting").
    pub fn enqueue_voice(&mut self, opus: [u8; 40]) {
        push_bounded(&mut self.voice_pending, VOICE_QUEUE_CAP, opus);
    }

    /// Enqueues a text message for fragmentation and transmission.
    pub fn enqueue_text(&mut self, message: Vec<u8>) {
        push_bounded(&mut self.text_pending, TEXT_APRS_QUEUE_CAP, message);
    }

    /// Enqueues an APRS packet for fragmentation and transmission.
    pub fn enqueue_aprs(&mut self, message: Vec<u8>) {
        push_bounded(&mut self.aprs_pending, TEXT_APRS_QUEUE_CAP, message);
    }

    fn key_material(&self) -> Result<Option<([u8; 32], [u8; 12])>, SessionError> {
        if !self.session.config.enable_encryption {
            return Ok(None);
        }
        let mac_key = self
            .session
            .config
            .mac_key
            .ok_or(sleipnir_crypto::CryptoError::KeyFormatInvalid("encryption enabled without mac_key"))?;
        let nonce_base = self
            .session
            .config
            .nonce_base
            .ok_or(sleipnir_crypto::CryptoError::KeyFormatInvalid("encryption enabled without nonce_base"))?;
        Ok(Some((mac_key, nonce_base)))
    }

    fn check_nonce(&mut self, mac_key: &[u8; 32], nonce_base: &[u8; 12], counter: u32, position: u8) -> Result<(), SessionError> {
        let nonce = sleipnir_proto::nonce::derive_nonce(nonce_base, counter, position);
        self.session.nonce_registry.record(mac_key, nonce)?;
        Ok(())
    }

    fn build_user_slot(&mut self, position: u8, counter: u32) -> Result<[u8; 48], SessionError> {
        let key_material = self.key_material()?;
        let callsign = self.session.config.local_callsign;
        let aad = FrameAad { counter, position, callsign };

        let aprs_fragment = next_fragment(&mut self.next_seq_id, &mut self.aprs_pending, &mut self.active_aprs);
        if let Some(fragment) = aprs_fragment {
            return self.finish_slot(key_material, counter, position, |key| build_aprs(&fragment, key, aad));
        }
        let text_fragment = next_fragment(&mut self.next_seq_id, &mut self.text_pending, &mut self.active_text);
        if let Some(fragment) = text_fragment {
            return self.finish_slot(key_material, counter, position, |key| build_text(&fragment, key, aad));
        }
        let opus = self.voice_pending.pop_front().unwrap_or([0_u8; 40]);
        self.finish_slot(key_material, counter, position, |key| build_voice(&opus, key, aad))
    }

    fn finish_slot(
        &mut self,
        key_material: Option<([u8; 32], [u8; 12])>,
        counter: u32,
        position: u8,
        build: impl FnOnce(Option<FrameKey<'_>>) -> Result<[u8; 48], sleipnir_proto::FrameError>,
    ) -> Result<[u8; 48], SessionError> {
        match key_material {
            Some((mac_key, nonce_base)) => {
                self.check_nonce(&mac_key, &nonce_base, counter, position)?;
                let key = FrameKey { mac_key: &mac_key, nonce_base: &nonce_base };
                Ok(build(Some(key))?)
            },
            None => Ok(build(None)?),
        }
    }

    /// Runs one superframe tick (spec §4.5's five steps), returning
    /// the 25 codewords to emit in order and advancing the counter.
    ///
    /// # Errors
    ///
    /// Propagates a fatal [`SessionError`] (e.g. nonce reuse, a
    /// missing signing key when signing is enabled) — the caller must
    /// tear the session down on such an error.
    pub fn tick(&mut self) -> Result<Vec<TxAction>, SessionError> {
        let counter = self.session.counter;
        let signing_on = self.session.config.enable_signing;
        let sync_interval = self.session.config.sync_interval.max(1);
        let sync_due = !signing_on && counter % sync_interval == 0;

        let mut slots: [Option<[u8; 48]>; 25] = [None; 25];

        if sync_due {
            slots[0] = Some(build_sync(counter));
        } else if !signing_on {
            slots[0] = Some(self.build_user_slot(0, counter)?);
        }
        for position in 1..SUPERFRAME_LEN {
            slots[position as usize] = Some(self.build_user_slot(position, counter)?);
        }

        let mut actions = Vec::with_capacity(25);

        let position0_matrix = router::matrix_for(FrameRouter::matrix_for_tx_position(0, signing_on), &self.auth_matrix, &self.voice_matrix);
        if signing_on {
            let mut transmitted = Vec::with_capacity(24 * 48);
            for position in 1..SUPERFRAME_LEN {
                transmitted.extend_from_slice(&slots[position as usize].expect("filled above"));
            }
            let digest: [u8; 32] = Sha256::digest(&transmitted).into();
            let signing_key = self
                .session
                .config
                .signing_key
                .as_ref()
                .ok_or(sleipnir_crypto::CryptoError::KeyFormatInvalid("signing enabled without a signing key"))?;
            let signature = ecdsa::sign(&digest, signing_key)?;
            let auth_bits = bytes_to_bits(&signature.to_wire_bytes());
            let bits = sleipnir_ldpc::encode(position0_matrix, &auth_bits)?;
            actions.push(TxAction::EmitCodeword { position: 0, bits });
        } else {
            let bits = bytes_to_bits(&slots[0].expect("filled above"));
            let bits = sleipnir_ldpc::encode(position0_matrix, &bits)?;
            actions.push(TxAction::EmitCodeword { position: 0, bits });
        }

        for position in 1..SUPERFRAME_LEN {
            let bytes = slots[position as usize].expect("filled above");
            let info_bits = bytes_to_bits(&bytes);
            let bits = sleipnir_ldpc::encode(&self.voice_matrix, &info_bits)?;
            actions.push(TxAction::EmitCodeword { position, bits });
        }

        self.session.counter = self.session.counter.wrapping_add(1);
        if self.pending_release {
            self.lifecycle = AssemblerLifecycle::Idle;
            self.pending_release = false;
        }

        Ok(actions)
    }
}
