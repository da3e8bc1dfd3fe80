//! Blocks, the ledger and whole-chain validation. Everything lives under
//! [`core`] and is re-exported here.

pub mod core;
pub use self::core::*;
