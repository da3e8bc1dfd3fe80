use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;
/// Sentinel `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn new(index: u64, transactions: Vec<Transaction>, proof: u64, previous_hash: String) -> Self {
        Block {
            index,
            timestamp: now_seconds(),
            transactions,
            proof,
            previous_hash,
        }
    }

    pub fn genesis() -> Self {
        Self::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string())
    }

    /// JSON form of the block, as served to peers and fed to the hasher.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
            "proof": self.proof,
            "previous_hash": self.previous_hash,
        })
    }
}

fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Append-only block sequence plus the pool of transactions waiting for a block.
///
/// The chain is never empty: construction seeds it with the genesis block and
/// [`Ledger::replace_chain`] refuses an empty replacement.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a ledger holding only the genesis block.
    pub fn new() -> Self {
        Ledger {
            blocks: vec![Block::genesis()],
            pending: Vec::new(),
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Queue a transaction; returns the index of the block expected to carry it.
    ///
    /// The index is a prediction: a concurrent mine or chain replacement can
    /// move the transaction into a different block.
    pub fn submit_transaction(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        self.blocks.len() as u64 + 1
    }

    /// Assemble a block from the pending pool, append it and drain the pool.
    ///
    /// `proof` is trusted here; an invalid one only surfaces when a peer
    /// validates this chain.
    pub fn append_block(&mut self, proof: u64, previous_hash: String) -> Block {
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(self.blocks.len() as u64 + 1, transactions, proof, previous_hash);
        self.blocks.push(block.clone());
        block
    }

    /// Swap in another chain. The pending pool is left as is.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<()> {
        if chain.is_empty() {
            return Err(ChainError::InvalidChain(
                "refusing to replace the chain with an empty one".to_string(),
            ));
        }
        self.blocks = chain;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_block;
    use crate::miner::{proof_of_work, valid_proof};

    #[test]
    fn test_genesis_block() {
        let ledger = Ledger::new();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn test_submit_transaction_predicts_next_index() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.submit_transaction(Transaction::new("a", "b", 1.0)), 2);
        assert_eq!(ledger.submit_transaction(Transaction::new("b", "c", 2.0)), 2);
        assert_eq!(ledger.pending().len(), 2);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_prediction_follows_position_not_peer_index() {
        for last_index in [41, u64::MAX] {
            let mut peer = Ledger::new();
            let last = peer.last_block().clone();
            peer.append_block(proof_of_work(last.proof), hash_block(&last));
            let mut chain = peer.chain().to_vec();
            chain[1].index = last_index;

            let mut ledger = Ledger::new();
            ledger.replace_chain(chain).unwrap();
            let predicted = ledger.submit_transaction(Transaction::new("a", "b", 1.0));
            let block = ledger.append_block(0, "x".to_string());

            assert_eq!(predicted, 3);
            assert_eq!(block.index, predicted);
        }
    }

    #[test]
    fn test_append_block_drains_pool() {
        let mut ledger = Ledger::new();
        ledger.submit_transaction(Transaction::new("a", "b", 1.0));
        let last = ledger.last_block().clone();
        let proof = proof_of_work(last.proof);

        let block = ledger.append_block(proof, hash_block(&last));

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.previous_hash, hash_block(&last));
        assert!(valid_proof(last.proof, block.proof));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.pending().is_empty());
        assert_eq!(ledger.last_block(), &block);
    }

    #[test]
    fn test_append_block_trusts_caller_proof() {
        let mut ledger = Ledger::new();
        let block = ledger.append_block(1, "not-a-hash".to_string());
        assert_eq!(block.index, 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_replace_chain_keeps_pool() {
        let mut ledger = Ledger::new();
        ledger.submit_transaction(Transaction::new("a", "b", 1.0));

        let mut other = Ledger::new();
        let last = other.last_block().clone();
        other.append_block(proof_of_work(last.proof), hash_block(&last));

        ledger.replace_chain(other.chain().to_vec()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.pending().len(), 1);
    }

    #[test]
    fn test_replace_chain_rejects_empty() {
        let mut ledger = Ledger::new();
        assert!(ledger.replace_chain(Vec::new()).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_block_json_round_trip_preserves_hash() {
        let mut ledger = Ledger::new();
        ledger.submit_transaction(Transaction::new("a", "b", 0.1));
        let last = ledger.last_block().clone();
        let block = ledger.append_block(proof_of_work(last.proof), hash_block(&last));

        let text = serde_json::to_string(&block).unwrap();
        let decoded: Block = serde_json::from_str(&text).unwrap();
        assert_eq!(hash_block(&decoded), hash_block(&block));
    }
}
