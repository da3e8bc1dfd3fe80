use crate::crypto::hash_block;
use crate::error::{ChainError, Result};
use crate::miner::valid_proof;

use super::chain::Block;

/// Check every link of `chain`: each block must point at the digest of its
/// predecessor and carry a proof valid against the predecessor's proof.
///
/// `chain[0]` is taken as the root and is not compared with a genesis constant.
pub fn validate_chain(chain: &[Block]) -> Result<()> {
    if chain.is_empty() {
        return Err(ChainError::InvalidChain("chain is empty".to_string()));
    }

    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);

        let expected = hash_block(previous);
        if block.previous_hash != expected {
            return Err(ChainError::InvalidChain(format!(
                "block {} links to {}, expected {}",
                block.index, block.previous_hash, expected
            )));
        }

        if !valid_proof(previous.proof, block.proof) {
            return Err(ChainError::InvalidChain(format!(
                "block {} carries proof {} which does not solve {}",
                block.index, block.proof, previous.proof
            )));
        }
    }
    Ok(())
}

pub fn is_valid_chain(chain: &[Block]) -> bool {
    validate_chain(chain).is_ok()
}
