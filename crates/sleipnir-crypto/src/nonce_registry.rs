//! Per-session nonce-reuse detection (spec §4.2/§5).
//!
//! The registry is the only mutable shared state the crypto layer
//! needs: it serializes on a single mutex, doing O(1) work per frame,
//! per spec §5's "Shared resource policy".

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::CryptoError;

/// Tracks `(key, nonce)` pairs used within a session and rejects
/// repeats.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    seen: Mutex<HashSet<(Vec<u8>, [u8; 12])>>,
}

impl NonceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `(key, nonce)` as used.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::NonceReuse`] if this exact pair has
    /// already been recorded. This is fatal per spec §4.2/§7.
    pub fn record(&self, key: &[u8], nonce: [u8; 12]) -> Result<(), CryptoError> {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = (key.to_vec(), nonce);
        if seen.contains(&entry) {
            return Err(CryptoError::NonceReuse { nonce });
        }
        seen.insert(entry);
        Ok(())
    }

    /// Number of distinct nonces recorded so far. Intended for tests
    /// and diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    /// Returns `true` if no nonce has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_use_of_a_nonce_succeeds() {
        let registry = NonceRegistry::new();
        assert!(registry.record(b"key-a", [0; 12]).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn repeat_use_of_the_same_key_and_nonce_is_rejected() {
        let registry = NonceRegistry::new();
        registry.record(b"key-a", [1; 12]).expect("first use");
        assert_eq!(registry.record(b"key-a", [1; 12]), Err(CryptoError::NonceReuse { nonce: [1; 12] }));
    }

    #[test]
    fn same_nonce_under_different_keys_is_allowed() {
        let registry = NonceRegistry::new();
        registry.record(b"key-a", [2; 12]).expect("first use");
        assert!(registry.record(b"key-b", [2; 12]).is_ok());
    }
}
