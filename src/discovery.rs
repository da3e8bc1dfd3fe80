//! Peer discovery and the node registry
//!
//! A node learns about peers in two ways: its own registration (optionally
//! bootstrapped from a seed node) and announcements pushed by peers that just
//! registered. Announcements travel a single hop and are never re-broadcast.

use tracing::{info, warn};

use crate::blockchain::NodeState;
use crate::error::{ChainError, Result};
use crate::network::PeerTransport;

/// How a node bootstraps its view of the network when it registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Never contact a seed.
    Isolated,
    /// Adopt whatever the seed returns for its node set and chain; failed
    /// fetches are ignored and registration proceeds.
    SeedBootstrap { seed: String },
    /// Adopt the seed's node set and chain only if both fetches succeed;
    /// otherwise registration is refused.
    SeedBootstrapValidated { seed: String },
}

impl DiscoveryStrategy {
    pub fn seed(&self) -> Option<&str> {
        match self {
            DiscoveryStrategy::Isolated => None,
            DiscoveryStrategy::SeedBootstrap { seed }
            | DiscoveryStrategy::SeedBootstrapValidated { seed } => Some(seed),
        }
    }
}

/// Reduce `address` to its network location (`host[:port]`).
///
/// Accepts full URLs (`http://10.0.0.2:5000/nodes/register`) as well as bare
/// `host:port` strings.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.contains("://") {
        let parsed = url::Url::parse(trimmed)
            .map_err(|e| ChainError::InvalidAddress(format!("{}: {}", trimmed, e)))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ChainError::InvalidAddress(format!("{}: missing host", trimmed)))?;
        let authority = trimmed
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or_default()
            .split(|c| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or_default();
        // the url crate drops a port equal to the scheme default
        let explicit_port = authority
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse::<u16>().ok());
        return Ok(match parsed.port().or(explicit_port) {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        });
    }

    let location = trimmed.split('/').next().unwrap_or_default();
    if location.is_empty() {
        return Err(ChainError::InvalidAddress(format!(
            "'{}' has no network location",
            address
        )));
    }
    Ok(location.to_string())
}

/// Registry operations over a node's peer set.
pub struct NodeRegistry;

impl NodeRegistry {
    /// Register `address` with this node.
    ///
    /// Returns `Ok(false)` when the address is already known or the validated
    /// seed bootstrap failed. New addresses are announced to every currently
    /// known peer before being added; announcement failures are only logged.
    pub async fn register(
        transport: &dyn PeerTransport,
        strategy: &DiscoveryStrategy,
        state: &mut NodeState,
        address: &str,
    ) -> Result<bool> {
        let node = normalize_address(address)?;

        if !Self::bootstrap(transport, strategy, state).await {
            return Ok(false);
        }

        if state.knows(&node) {
            return Ok(false);
        }

        for peer in state.node_list() {
            if let Err(e) = transport.announce_node(&peer, &node).await {
                warn!(%peer, %node, error = %e, "node announcement failed");
            }
        }
        state.add_node(node.clone());
        info!(%node, total = state.node_count(), "node registered");
        Ok(true)
    }

    /// Record a node announced by a peer. No further broadcast happens.
    pub fn receive_broadcast(state: &mut NodeState, address: &str) -> Result<bool> {
        let node = normalize_address(address)?;
        let added = state.add_node(node.clone());
        if added {
            info!(%node, total = state.node_count(), "node learned from broadcast");
        }
        Ok(added)
    }

    /// Pull the seed's node set and chain into `state` as the new baseline.
    ///
    /// The seed chain is adopted without validation. Returns false only when
    /// a validated bootstrap could not fetch both.
    async fn bootstrap(
        transport: &dyn PeerTransport,
        strategy: &DiscoveryStrategy,
        state: &mut NodeState,
    ) -> bool {
        let (seed, validated) = match strategy {
            DiscoveryStrategy::Isolated => return true,
            DiscoveryStrategy::SeedBootstrap { seed } => (seed.as_str(), false),
            DiscoveryStrategy::SeedBootstrapValidated { seed } => (seed.as_str(), true),
        };

        let nodes = transport.fetch_nodes(seed).await;
        let chain = transport
            .fetch_chain(seed)
            .await
            .and_then(|response| {
                if response.chain.is_empty() {
                    Err(ChainError::InvalidChain("seed returned an empty chain".to_string()))
                } else {
                    Ok(response.chain)
                }
            });

        if validated {
            return match (nodes, chain) {
                (Ok(nodes), Ok(chain)) => {
                    if let Err(e) = state.ledger.replace_chain(chain) {
                        warn!(%seed, error = %e, "seed chain not adopted");
                        return false;
                    }
                    state.replace_nodes(nodes.nodes);
                    info!(%seed, "bootstrapped from seed");
                    true
                }
                (nodes, chain) => {
                    if let Err(e) = nodes {
                        warn!(%seed, error = %e, "seed node list unavailable");
                    }
                    if let Err(e) = chain {
                        warn!(%seed, error = %e, "seed chain unavailable");
                    }
                    false
                }
            };
        }

        match nodes {
            Ok(nodes) => state.replace_nodes(nodes.nodes),
            Err(e) => warn!(%seed, error = %e, "seed node list unavailable"),
        }
        match chain {
            Ok(chain) => {
                if let Err(e) = state.ledger.replace_chain(chain) {
                    warn!(%seed, error = %e, "seed chain not adopted");
                }
            }
            Err(e) => warn!(%seed, error = %e, "seed chain unavailable"),
        }
        true
    }
}
