//! Error types for powledger

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Peer {peer} answered with status {status}")]
    PeerResponse { peer: String, status: u16 },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid chain: {0}")]
    InvalidChain(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Mining error: {0}")]
    MiningError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        ChainError::NetworkError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
