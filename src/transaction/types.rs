//! Transaction types for powledger
use serde::{Deserialize, Serialize};

/// Sender used by the mining reward transaction to mark newly minted value.
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the miner of a block.
pub const MINING_REWARD: f64 = 1.0;

/// A value transfer waiting in the pending pool or recorded in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Reward paid to `miner_id` for finding a proof.
    pub fn reward(miner_id: impl Into<String>) -> Self {
        Self::new(REWARD_SENDER, miner_id, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
