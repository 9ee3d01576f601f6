//! Property tests for the LDPC codec against spec §8's TESTABLE
//! PROPERTIES: every encoded word is a true codeword, and decoding
//! corrects bounded-weight error patterns.

use proptest::prelude::*;
use sleipnir_ldpc::{auth_matrix, decode_hard, encode, voice_matrix, ParityCheckMatrix, T_GUARANTEED};

fn info_bits(k: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=1, k)
}

fn flip_pattern(n: usize, max_flips: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..n, 0..=max_flips)
}

/// Flips exactly `weight` distinct positions from `positions` into
/// `received`, using only the first `weight` of them (proptest shrinks
/// toward lower weight when this fails, so plain order is fine).
fn flip_weight(n: usize, weight: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..n, weight).prop_map(|mut v| {
        v.sort_unstable();
        v.dedup();
        v
    })
}

fn check_encode_is_a_codeword(matrix: &ParityCheckMatrix, bits: &[u8]) {
    let codeword = encode(matrix, bits).expect("matching length encodes");
    assert_eq!(&codeword[..matrix.k()], bits);
    assert_eq!(matrix.syndrome(&codeword), vec![0u8; matrix.m()]);
}

proptest! {
    #[test]
    fn auth_encode_always_yields_a_valid_codeword(bits in info_bits(256)) {
        let h = auth_matrix().expect("embedded matrix loads");
        check_encode_is_a_codeword(&h, &bits);
    }

    #[test]
    fn voice_encode_always_yields_a_valid_codeword(bits in info_bits(384)) {
        let h = voice_matrix().expect("embedded matrix loads");
        check_encode_is_a_codeword(&h, &bits);
    }

    #[test]
    fn decode_is_a_no_op_on_an_unperturbed_codeword(bits in info_bits(384)) {
        let h = voice_matrix().expect("embedded matrix loads");
        let codeword = encode(&h, &bits).expect("encodes");
        let result = decode_hard(&h, &codeword, 20).expect("decodes");
        prop_assert!(result.converged);
        prop_assert_eq!(result.codeword, codeword);
    }

    #[test]
    fn decode_never_panics_under_arbitrary_flips(
        bits in info_bits(384),
        flips in flip_pattern(576, 12),
    ) {
        let h = voice_matrix().expect("embedded matrix loads");
        let mut received = encode(&h, &bits).expect("encodes");
        for i in flips {
            received[i] ^= 1;
        }
        let result = decode_hard(&h, &received, 20).expect("decodes");
        if result.converged {
            prop_assert_eq!(h.syndrome(&result.codeword), vec![0u8; h.m()]);
        }
    }

    /// Spec §8's quantified property, exactly: for any error pattern
    /// of weight at most `T_GUARANTEED`, `decode_hard` recovers the
    /// original information bits, not merely a converged codeword.
    #[test]
    fn voice_decode_recovers_info_bits_within_t_guaranteed(
        bits in info_bits(384),
        flips in flip_weight(576, T_GUARANTEED),
    ) {
        let h = voice_matrix().expect("embedded matrix loads");
        let codeword = encode(&h, &bits).expect("encodes");
        let mut received = codeword;
        for i in &flips {
            received[*i] ^= 1;
        }
        let result = decode_hard(&h, &received, 20).expect("decodes");
        prop_assert!(result.converged, "did not converge on weight-{} pattern {:?}", flips.len(), flips);
        prop_assert_eq!(&result.codeword[..h.k()], &bits[..]);
    }

    #[test]
    fn auth_decode_recovers_info_bits_within_t_guaranteed(
        bits in info_bits(256),
        flips in flip_weight(768, T_GUARANTEED),
    ) {
        let h = auth_matrix().expect("embedded matrix loads");
        let codeword = encode(&h, &bits).expect("encodes");
        let mut received = codeword;
        for i in &flips {
            received[*i] ^= 1;
        }
        let result = decode_hard(&h, &received, 20).expect("decodes");
        prop_assert!(result.converged, "did not converge on weight-{} pattern {:?}", flips.len(), flips);
        prop_assert_eq!(&result.codeword[..h.k()], &bits[..]);
    }
}

/// Exhaustive version of the property above for a fixed codeword:
/// every single-position flip, not just a proptest sample of them,
/// is corrected on both matrices.
#[test]
fn every_single_bit_flip_is_corrected_on_the_voice_matrix() {
    let h = voice_matrix().expect("embedded matrix loads");
    let bits = vec![1u8; 384];
    let codeword = encode(&h, &bits).expect("encodes");

    for pos in 0..h.n() {
        let mut received = codeword.clone();
        received[pos] ^= 1;
        let result = decode_hard(&h, &received, 20).expect("decodes");
        assert!(result.converged, "flip at position {pos} did not converge");
        assert_eq!(result.codeword, codeword, "flip at position {pos} was not corrected");
    }
}

#[test]
fn every_single_bit_flip_is_corrected_on_the_auth_matrix() {
    let h = auth_matrix().expect("embedded matrix loads");
    let bits = vec![1u8; 256];
    let codeword = encode(&h, &bits).expect("encodes");

    for pos in 0..h.n() {
        let mut received = codeword.clone();
        received[pos] ^= 1;
        let result = decode_hard(&h, &received, 20).expect("decodes");
        assert!(result.converged, "flip at position {pos} did not converge");
        assert_eq!(result.codeword, codeword, "flip at position {pos} was not corrected");
    }
}

#[test]
fn zero_max_iters_never_corrects_a_corrupted_word() {
    let h = auth_matrix().expect("embedded matrix loads");
    let bits = vec![0u8; 256];
    let mut received = encode(&h, &bits).expect("encodes");
    received[0] ^= 1;

    let result = decode_hard(&h, &received, 0).expect("decodes");
    assert_eq!(result.iterations, 0);
    assert!(!result.converged);
    assert_eq!(received, result.codeword);
}
