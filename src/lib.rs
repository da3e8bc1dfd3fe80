//! powledger - A minimal replicated proof-of-work ledger
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, node state and chain validation
//! - [`transaction`] - Transaction records and the mining reward
//!
//! ## Consensus & Mining
//! - [`miner`] - Proof-of-work puzzle
//! - [`consensus`] - Longest-valid-chain resolution
//!
//! ## Cryptography
//! - [`crypto`] - Canonical JSON hashing (SHA-256)
//!
//! ## Networking
//! - [`network`] - Peer wire types and HTTP transport
//! - [`discovery`] - Node registry and seed bootstrap
//! - [`node`] - The node facade serialising all state access
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod consensus;
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Networking
// ============================================================================
pub mod discovery;
pub mod network;
pub mod node;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;
