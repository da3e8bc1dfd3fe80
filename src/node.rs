//! A ledger node: the replicated state plus the operations served to callers
//!
//! Every operation that touches the chain, the pending pool or the peer set
//! holds the node's single state lock for its entire duration, peer queries
//! included. Only the proof-of-work search runs outside of it.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::blockchain::{Block, NodeState};
use crate::config::Config;
use crate::consensus::{Consensus, Resolution};
use crate::crypto::hash_block;
use crate::discovery::{DiscoveryStrategy, NodeRegistry};
use crate::error::Result;
use crate::miner::proof_of_work_blocking;
use crate::network::{HttpTransport, PeerTransport};
use crate::transaction::Transaction;

/// Lifecycle of the node process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeStatus {
    Booting,
    Ready,
    Stopping,
}

/// Result of a block-creation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum MineOutcome {
    /// The block was appended to the local chain.
    Appended(Block),
    /// Consensus replaced the chain first; the caller must re-derive the last
    /// block and proof and try again.
    ChainReplaced,
}

pub struct Node {
    node_id: String,
    reward: bool,
    strategy: DiscoveryStrategy,
    transport: Arc<dyn PeerTransport>,
    state: Mutex<NodeState>,
    status: RwLock<NodeStatus>,
}

impl Node {
    pub fn new(
        node_id: impl Into<String>,
        strategy: DiscoveryStrategy,
        transport: Arc<dyn PeerTransport>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            reward: true,
            strategy,
            transport,
            state: Mutex::new(NodeState::new()),
            status: RwLock::new(NodeStatus::Booting),
        }
    }

    /// Build a node talking HTTP to its peers, as configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let strategy = config.discovery_strategy()?;
        let node = Self::new(config.node_id(), strategy, Arc::new(HttpTransport::new()))
            .with_reward(config.miner.reward);
        info!(node_id = %node.node_id, strategy = ?node.strategy, "node created");
        Ok(node)
    }

    /// Whether [`Node::mine_next`] credits this node with the mining reward.
    pub fn with_reward(mut self, reward: bool) -> Self {
        self.reward = reward;
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn strategy(&self) -> &DiscoveryStrategy {
        &self.strategy
    }

    pub async fn status(&self) -> NodeStatus {
        *self.status.read().await
    }

    pub async fn set_status(&self, status: NodeStatus) {
        *self.status.write().await = status;
        info!(?status, "node status changed");
    }

    pub async fn chain(&self) -> Vec<Block> {
        self.state.lock().await.ledger.chain().to_vec()
    }

    pub async fn chain_length(&self) -> usize {
        self.state.lock().await.ledger.len()
    }

    pub async fn last_block(&self) -> Block {
        self.state.lock().await.ledger.last_block().clone()
    }

    pub async fn pending(&self) -> Vec<Transaction> {
        self.state.lock().await.ledger.pending().to_vec()
    }

    pub async fn nodes(&self) -> Vec<String> {
        self.state.lock().await.node_list()
    }

    /// Queue a transaction; returns the predicted index of its block.
    pub async fn submit_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> u64 {
        let tx = Transaction::new(sender, recipient, amount);
        self.state.lock().await.ledger.submit_transaction(tx)
    }

    /// Reconcile with all known peers.
    pub async fn resolve(&self) -> Resolution {
        let mut state = self.state.lock().await;
        Consensus::resolve(self.transport.as_ref(), &mut state).await
    }

    /// Create a block carrying the pending pool.
    ///
    /// Consensus runs first; if it replaced the chain nothing is appended and
    /// the pool is left untouched. Otherwise the reward for `miner_id` (when
    /// given) joins the pool and the block is appended. `proof` is not checked.
    pub async fn mine(&self, proof: u64, previous_hash: String, miner_id: Option<&str>) -> MineOutcome {
        let mut state = self.state.lock().await;

        if Consensus::resolve(self.transport.as_ref(), &mut state).await.replaced() {
            return MineOutcome::ChainReplaced;
        }

        if let Some(miner_id) = miner_id {
            state.ledger.submit_transaction(Transaction::reward(miner_id));
        }
        let block = state.ledger.append_block(proof, previous_hash);
        info!(
            index = block.index,
            transactions = block.transactions.len(),
            proof = block.proof,
            "block appended"
        );
        MineOutcome::Appended(block)
    }

    /// Solve the puzzle for the current last block and [`Node::mine`] on top of it.
    pub async fn mine_next(&self) -> Result<MineOutcome> {
        let last_block = self.last_block().await;
        let proof = proof_of_work_blocking(last_block.proof).await?;
        let previous_hash = hash_block(&last_block);
        let miner_id = self.reward.then_some(self.node_id.as_str());
        Ok(self.mine(proof, previous_hash, miner_id).await)
    }

    /// Register `address`, bootstrapping from the seed first when configured.
    pub async fn register(&self, address: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        NodeRegistry::register(self.transport.as_ref(), &self.strategy, &mut state, address).await
    }

    /// Record a node announced by a peer.
    pub async fn receive_broadcast(&self, address: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        NodeRegistry::receive_broadcast(&mut state, address)
    }
}
