//! Sleipnir Cryptographic Primitives
//!
//! Pure functions with deterministic outputs where the spec requires
//! determinism (signing, AEAD seal given caller-supplied nonces).
//! Callers own key material and own randomness; nothing here reaches
//! into global state.
//!
//! # Components
//!
//! - [`aead`]: ChaCha20-Poly1305 seal/open with an 8-byte truncated
//!   on-wire tag (spec §4.2).
//! - [`ecdsa`]: ECDSA signing/verification, substituting RustCrypto's
//!   `p256` for the spec's BrainpoolP256r1 (see DESIGN.md).
//! - [`nonce_registry`]: per-session nonce-reuse detection (spec
//!   §4.2/§5), the one piece of mutable shared state in the crypto
//!   layer.
//!
//! # Security
//!
//! - Nonce reuse under a fixed key is fatal, enforced by
//!   [`nonce_registry::NonceRegistry`].
//! - The 8-byte truncated AEAD tag and 32-byte truncated ECDSA
//!   signature are both spec-mandated wire compromises, not omissions
//!   in this implementation; see spec §4.1/§4.2/§9 and DESIGN.md.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod ecdsa;
pub mod error;
pub mod nonce_registry;

pub use error::{CryptoError, ErrorClass};
pub use nonce_registry::NonceRegistry;
