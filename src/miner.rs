//! Proof-of-work predicate and search
//!
//! A proof `p'` is valid against the previous proof `p` when
//! `sha256("{p}{p'}")` starts with [`DIFFICULTY_PREFIX`]. Difficulty is fixed.

use crate::crypto::sha256_hex;
use crate::error::{ChainError, Result};

/// Required leading hex digits of a valid proof digest (16 zero bits).
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Does `candidate` satisfy the puzzle seeded by `last_proof`?
pub fn valid_proof(last_proof: u64, candidate: u64) -> bool {
    let guess = format!("{}{}", last_proof, candidate);
    sha256_hex(guess.as_bytes()).starts_with(DIFFICULTY_PREFIX)
}

/// First valid proof for `last_proof`, scanning upward from zero.
pub fn proof_of_work(last_proof: u64) -> u64 {
    let mut candidate = 0u64;
    while !valid_proof(last_proof, candidate) {
        candidate += 1;
    }
    candidate
}

/// Run [`proof_of_work`] on the blocking pool so async callers are not stalled.
pub async fn proof_of_work_blocking(last_proof: u64) -> Result<u64> {
    tokio::task::spawn_blocking(move || proof_of_work(last_proof))
        .await
        .map_err(|e| ChainError::MiningError(format!("proof search aborted: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_is_valid() {
        for last in [0u64, 1, 100, 35293] {
            let proof = proof_of_work(last);
            assert!(valid_proof(last, proof), "proof {} for {}", proof, last);
        }
    }

    #[test]
    fn test_search_is_deterministic_and_minimal() {
        let proof = proof_of_work(100);
        assert_eq!(proof, proof_of_work(100));
        assert!((0..proof).all(|c| !valid_proof(100, c)));
    }

    #[test]
    fn test_predicate_follows_digest_prefix() {
        for candidate in 0..64u64 {
            let digest = sha256_hex(format!("100{}", candidate).as_bytes());
            assert_eq!(valid_proof(100, candidate), digest.starts_with("0000"));
        }
    }

    #[test]
    fn test_proofs_are_concatenated_as_decimal_text() {
        // "12" + "3" and "1" + "23" are the same guess
        for (a, b) in [(12u64, 3u64), (1, 23)] {
            assert_eq!(valid_proof(a, b), sha256_hex(b"123").starts_with("0000"));
        }
    }

    #[tokio::test]
    async fn test_blocking_search_matches_sync() {
        let proof = proof_of_work_blocking(7).await.unwrap();
        assert_eq!(proof, proof_of_work(7));
    }
}
