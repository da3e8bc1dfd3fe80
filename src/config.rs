//! Configuration management for powledger

use rand::seq::SliceRandom;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::discovery::DiscoveryStrategy;
use crate::error::{ChainError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

/// How registration reaches the rest of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMode {
    Isolated,
    Seed,
    SeedValidated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_discovery")]
    pub discovery: DiscoveryMode,
    #[serde(default)]
    pub seed_nodes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerConfig {
    /// Identifier credited by mining rewards; random when unset.
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default = "default_reward")]
    pub reward: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
            discovery: default_discovery(),
            seed_nodes: Vec::new(),
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            reward: default_reward(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    5000
}

fn default_discovery() -> DiscoveryMode {
    DiscoveryMode::Isolated
}

fn default_reward() -> bool {
    true
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.api_port == 0 {
            return Err(ChainError::ConfigError(
                "network.api_port must be non-zero".to_string(),
            ));
        }
        if self.network.discovery != DiscoveryMode::Isolated && self.network.seed_nodes.is_empty() {
            return Err(ChainError::ConfigError(
                "network.seed_nodes must list at least one node for seed discovery".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the discovery strategy, picking one seed at random from `seed_nodes`.
    pub fn discovery_strategy(&self) -> Result<DiscoveryStrategy> {
        if self.network.discovery == DiscoveryMode::Isolated {
            return Ok(DiscoveryStrategy::Isolated);
        }
        let seed = self
            .network
            .seed_nodes
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| ChainError::ConfigError("no seed nodes configured".to_string()))?;
        Ok(match self.network.discovery {
            DiscoveryMode::Isolated => DiscoveryStrategy::Isolated,
            DiscoveryMode::Seed => DiscoveryStrategy::SeedBootstrap { seed },
            DiscoveryMode::SeedValidated => DiscoveryStrategy::SeedBootstrapValidated { seed },
        })
    }

    /// The configured node id, or a fresh random 32-hex-digit one.
    pub fn node_id(&self) -> String {
        match &self.miner.node_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => hex::encode(rand::random::<[u8; 16]>()),
        }
    }
}

/// Load configuration from `path`, falling back to defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }
    let text = fs::read_to_string(path)?;
    Config::from_toml(&text)
}
