//! `SessionState`/`SessionConfig`: per-direction process state with an
//! explicit `init -> running -> teardown` lifecycle (spec §3/§9), fed
//! by closed [`ControlDirective`] values rather than a global registry.

use std::collections::HashMap;

use p256::ecdsa::{SigningKey, VerifyingKey};

use sleipnir_bus::{Callsign, ControlDirective, SyncState};
use sleipnir_crypto::NonceRegistry;

use crate::error::SessionError;

/// A session's explicit lifecycle (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed but not yet processing frames.
    Init,
    /// Actively assembling or parsing superframes.
    Running,
    /// Resources released; the session must not be reused.
    Teardown,
}

/// Session-wide configuration, built up from [`ControlDirective`]
/// values (spec §6). Private/symmetric key material lives here as a
/// value, never in a process-wide registry (spec §9).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// This session's own 5-ASCII-byte callsign.
    pub local_callsign: Callsign,
    /// Toggle Frame-0 ECDSA signing on TX.
    pub enable_signing: bool,
    /// Toggle per-frame AEAD.
    pub enable_encryption: bool,
    /// RX policy: reject unsigned/invalidly-signed superframes outright.
    pub require_signatures: bool,
    /// Addressed recipients, folded into AAD.
    pub recipients: Vec<Callsign>,
    /// Frames between sync beacons, `1..=255`.
    pub sync_interval: u32,
    /// Superframes a text/APRS fragment stream may sit incomplete
    /// before it is discarded (spec §7's `ReassemblyTimeout`). Not a
    /// `ControlDirective` (spec §6's directive list omits it); set
    /// directly on a freshly built config if the default doesn't fit.
    pub reassembly_timeout_superframes: u32,
    /// Symmetric AEAD key, if encryption is configured.
    pub mac_key: Option<[u8; 32]>,
    /// Symmetric nonce base, if encryption is configured.
    pub nonce_base: Option<[u8; 12]>,
    /// This session's own signing key (TX), if signing is configured.
    pub signing_key: Option<SigningKey>,
    /// Public-key directory keyed by remote callsign (RX).
    pub verifying_keys: HashMap<Callsign, VerifyingKey>,
}

impl SessionConfig {
    /// Starting configuration: signing and encryption off, default
    /// sync interval of 5, per spec §6.
    #[must_use]
    pub fn new(local_callsign: Callsign) -> Self {
        Self {
            local_callsign,
            enable_signing: false,
            enable_encryption: false,
            require_signatures: false,
            recipients: Vec::new(),
            sync_interval: 5,
            reassembly_timeout_superframes: 8,
            mac_key: None,
            nonce_base: None,
            signing_key: None,
            verifying_keys: HashMap::new(),
        }
    }

    /// Applies one directive from the `ctrl` queue, validating range
    /// and key-format constraints spec §6 states.
    ///
    /// # Errors
    ///
    /// Returns [`sleipnir_crypto::CryptoError::KeyFormatInvalid`]
    /// (wrapped) if a key directive's bytes do not parse, or
    /// [`SessionError::UnknownCodewordLength`]-adjacent validation
    /// failures for an out-of-range `sync_interval`.
    pub fn apply_directive(&mut self, directive: ControlDirective) -> Result<(), SessionError> {
        match directive {
            ControlDirective::EnableSigning(on) => self.enable_signing = on,
            ControlDirective::EnableEncryption(on) => self.enable_encryption = on,
            ControlDirective::Recipients(list) => self.recipients = list,
            ControlDirective::LocalCallsign(cs) => self.local_callsign = cs,
            ControlDirective::RequireSignatures(on) => self.require_signatures = on,
            ControlDirective::SyncInterval(interval) => {
                if !(1..=255).contains(&interval) {
                    return Err(sleipnir_crypto::CryptoError::KeyFormatInvalid(
                        "sync_interval must be in 1..=255",
                    )
                    .into());
                }
                self.sync_interval = interval;
            },
            ControlDirective::SymmetricKeys { mac_key, nonce_base } => {
                self.mac_key = Some(mac_key);
                self.nonce_base = Some(nonce_base);
            },
            ControlDirective::KeyPair { private_key, public_key } => {
                if !private_key.is_empty() {
                    let key = SigningKey::from_slice(&private_key).map_err(|_| {
                        sleipnir_crypto::CryptoError::KeyFormatInvalid("malformed ECDSA private key")
                    })?;
                    self.signing_key = Some(key);
                }
                if !public_key.is_empty() {
                    let key = VerifyingKey::from_sec1_bytes(&public_key).map_err(|_| {
                        sleipnir_crypto::CryptoError::KeyFormatInvalid("malformed ECDSA public key")
                    })?;
                    self.verifying_keys.insert(self.local_callsign, key);
                }
            },
        }
        Ok(())
    }

    /// Registers a remote station's verifying key under its callsign
    /// (RX public-key directory, spec §3).
    pub fn register_verifying_key(&mut self, callsign: Callsign, key: VerifyingKey) {
        self.verifying_keys.insert(callsign, key);
    }
}

/// Returns `true` if `received`, compared against the session's
/// `last` accepted counter, is a replay: a backward move of less than
/// half the 32-bit counter space (spec §8's boundary definition,
/// which also makes the `2^32-1 -> 0` wrap a forward move, not a
/// replay).
#[must_use]
pub fn is_replay(last: u32, received: u32) -> bool {
    let delta_back = last.wrapping_sub(received);
    delta_back != 0 && delta_back < (1_u32 << 31)
}

/// Per-direction session state: configuration plus the mutable sync
/// and counter bookkeeping spec §3 assigns to a session.
pub struct SessionState {
    /// This session's configuration.
    pub config: SessionConfig,
    /// Explicit lifecycle (spec §9).
    pub lifecycle: Lifecycle,
    /// TX: next counter to emit. RX: last counter accepted.
    pub counter: u32,
    /// RX sync-acquisition state; meaningless on TX.
    pub sync_state: SyncState,
    /// RX: the last counter accepted while synced.
    pub last_accepted_counter: Option<u32>,
    /// RX: consecutive counter mismatches since the last acceptance.
    pub consecutive_counter_mismatches: u32,
    /// RX: consecutive MAC failures since the last success.
    pub consecutive_mac_failures: u32,
    /// The session's nonce-reuse detector (spec §4.2/§5).
    pub nonce_registry: NonceRegistry,
}

impl SessionState {
    /// Creates a session in `Init` state, `searching` sync state, at
    /// counter 0.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Init,
            counter: 0,
            sync_state: SyncState::Searching,
            last_accepted_counter: None,
            consecutive_counter_mismatches: 0,
            consecutive_mac_failures: 0,
            nonce_registry: NonceRegistry::new(),
        }
    }

    /// Creates a session starting at an explicit counter (e.g. for TX
    /// sessions resuming at a specific value).
    #[must_use]
    pub fn with_counter(config: SessionConfig, counter: u32) -> Self {
        let mut state = Self::new(config);
        state.counter = counter;
        state
    }

    /// Transitions `Init -> Running`.
    ///
    /// # Panics
    ///
    /// Panics if the session is not in `Init` (a programming error:
    /// sessions are started exactly once).
    pub fn start(&mut self) {
        assert_eq!(self.lifecycle, Lifecycle::Init, "session already started");
        self.lifecycle = Lifecycle::Running;
    }

    /// Transitions to `Teardown`, releasing matrices/keys/queues tied
    /// to this session (spec §9's "resource scope... released
    /// deterministically on teardown"; in this value-oriented design,
    /// that release is simply drop).
    pub fn teardown(&mut self) {
        self.lifecycle = Lifecycle::Teardown;
    }

    /// Records a counter mismatch and returns `true` if this pushes
    /// the session past spec §7's sync-loss threshold (3 consecutive).
    pub fn record_counter_mismatch(&mut self) -> bool {
        self.consecutive_counter_mismatches += 1;
        self.consecutive_counter_mismatches >= 3
    }

    /// Records a MAC failure and returns `true` if this pushes the
    /// session past spec §7's sync-loss threshold (5 consecutive).
    pub fn record_mac_failure(&mut self) -> bool {
        self.consecutive_mac_failures += 1;
        self.consecutive_mac_failures >= 5
    }

    /// Resets both consecutive-failure counters on a clean frame.
    pub fn reset_failure_counters(&mut self) {
        self.consecutive_counter_mismatches = 0;
        self.consecutive_mac_failures = 0;
    }

    /// Forces a transition to `lost`, then immediately `searching`
    /// (spec §4.6: "transition to `lost` -> `searching`").
    pub fn lose_sync(&mut self) {
        self.sync_state = SyncState::Searching;
        self.last_accepted_counter = None;
        self.reset_failure_counters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_counter_progress_is_not_a_replay() {
        assert!(!is_replay(5, 6));
    }

    #[test]
    fn backward_counter_within_half_range_is_a_replay() {
        assert!(is_replay(10, 3));
    }

    #[test]
    fn wraparound_from_max_to_zero_is_not_a_replay() {
        assert!(!is_replay(u32::MAX, 0));
        assert!(!is_replay(u32::MAX - 1, u32::MAX));
        assert!(!is_replay(0, 1));
    }

    #[test]
    fn out_of_range_sync_interval_is_rejected() {
        let mut config = SessionConfig::new(*b"N0CAL");
        assert!(config.apply_directive(ControlDirective::SyncInterval(0)).is_err());
        assert!(config.apply_directive(ControlDirective::SyncInterval(256)).is_err());
        assert!(config.apply_directive(ControlDirective::SyncInterval(5)).is_ok());
    }

    #[test]
    fn three_consecutive_mismatches_signal_sync_loss() {
        let mut state = SessionState::new(SessionConfig::new(*b"N0CAL"));
        assert!(!state.record_counter_mismatch());
        assert!(!state.record_counter_mismatch());
        assert!(state.record_counter_mismatch());
    }

    #[test]
    fn five_consecutive_mac_failures_signal_sync_loss() {
        let mut state = SessionState::new(SessionConfig::new(*b"N0CAL"));
        for _ in 0..4 {
            assert!(!state.record_mac_failure());
        }
        assert!(state.record_mac_failure());
    }

    #[test]
    #[should_panic(expected = "session already started")]
    fn starting_twice_panics() {
        let mut state = SessionState::new(SessionConfig::new(*b"N0CAL"));
        state.start();
        state.start();
    }
}
