//! In-memory [`PeerTransport`] used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::blockchain::{Block, Ledger};
use crate::crypto::hash_block;
use crate::error::{ChainError, Result};
use crate::miner::proof_of_work;
use crate::network::{ChainResponse, NodesResponse, PeerTransport};
use crate::transaction::Transaction;

/// Canned peer answers. Peers missing from a map are unreachable.
#[derive(Default)]
pub struct MockTransport {
    pub chains: HashMap<String, ChainResponse>,
    pub nodes: HashMap<String, NodesResponse>,
    pub failing_announces: Vec<String>,
    announced: Mutex<Vec<(String, String)>>,
    fetched: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peer(mut self, peer: &str, chain: Vec<Block>, nodes: &[&str]) -> Self {
        self.chains.insert(
            peer.to_string(),
            ChainResponse {
                length: chain.len(),
                chain,
            },
        );
        self.nodes.insert(
            peer.to_string(),
            NodesResponse {
                nodes: nodes.iter().map(|n| n.to_string()).collect(),
            },
        );
        self
    }

    /// `(peer, announced node)` pairs in call order.
    pub fn announced(&self) -> Vec<(String, String)> {
        self.announced.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Peers whose chain was requested, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

fn unreachable(peer: &str) -> ChainError {
    ChainError::NetworkError(format!("connection refused: {}", peer))
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(peer.to_string());
        }
        self.chains.get(peer).cloned().ok_or_else(|| unreachable(peer))
    }

    async fn fetch_nodes(&self, peer: &str) -> Result<NodesResponse> {
        self.nodes.get(peer).cloned().ok_or_else(|| unreachable(peer))
    }

    async fn announce_node(&self, peer: &str, node: &str) -> Result<()> {
        if let Ok(mut announced) = self.announced.lock() {
            announced.push((peer.to_string(), node.to_string()));
        }
        if self.failing_announces.iter().any(|p| p == peer) {
            return Err(unreachable(peer));
        }
        Ok(())
    }
}

/// A valid chain of `len` blocks (genesis included).
pub fn mined_chain(len: usize, tag: &str) -> Vec<Block> {
    let mut ledger = Ledger::new();
    while ledger.len() < len {
        ledger.submit_transaction(Transaction::new(tag, "bob", ledger.len() as f64));
        let last = ledger.last_block().clone();
        ledger.append_block(proof_of_work(last.proof), hash_block(&last));
    }
    ledger.chain().to_vec()
}
