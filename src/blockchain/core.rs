//! Ledger internals
//!
//! - [`chain`]: blocks and the append-only [`Ledger`] with its pending pool
//! - [`state`]: [`NodeState`], the ledger plus the known peer set
//! - [`validation`]: link and proof checks over a whole chain

pub mod chain;
pub mod state;
pub mod validation;

pub use self::chain::{Block, Ledger, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
pub use self::state::NodeState;
pub use self::validation::{is_valid_chain, validate_chain};
