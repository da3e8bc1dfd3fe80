//! Longest-valid-chain consensus
//!
//! Every known peer is polled for its chain and node set. The longest chain
//! that is strictly longer than the local one and passes validation wins;
//! among equally long candidates the first one seen is kept. When a winner
//! exists the local chain and node set are replaced by the peer's.

use tracing::{debug, info, warn};

use crate::blockchain::{validate_chain, Block, NodeState};
use crate::network::PeerTransport;

/// Outcome of a resolution round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A longer valid peer chain replaced the local one.
    Replaced,
    /// The local chain was kept.
    Authoritative,
}

impl Resolution {
    pub fn replaced(&self) -> bool {
        matches!(self, Resolution::Replaced)
    }
}

struct Candidate {
    peer: String,
    chain: Vec<Block>,
    nodes: Vec<String>,
}

/// Consensus engine resolving divergent local histories.
pub struct Consensus;

impl Consensus {
    /// Poll all known peers and adopt the longest valid chain, if any beats ours.
    ///
    /// Unreachable peers and peers answering with an error are skipped. A peer
    /// counts only if both its chain and its node list were fetched. Peers are
    /// queried one after the other with no timeout.
    pub async fn resolve(transport: &dyn PeerTransport, state: &mut NodeState) -> Resolution {
        let mut max_length = state.ledger.len();
        let mut best: Option<Candidate> = None;

        for peer in state.node_list() {
            let chain = match transport.fetch_chain(&peer).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%peer, error = %e, "skipping peer: chain unavailable");
                    continue;
                }
            };
            let nodes = match transport.fetch_nodes(&peer).await {
                Ok(response) => response.nodes,
                Err(e) => {
                    warn!(%peer, error = %e, "skipping peer: node list unavailable");
                    continue;
                }
            };

            if chain.length != chain.chain.len() {
                debug!(
                    %peer,
                    reported = chain.length,
                    actual = chain.chain.len(),
                    "rejecting candidate: length mismatch"
                );
                continue;
            }
            if chain.length <= max_length {
                continue;
            }
            if let Err(e) = validate_chain(&chain.chain) {
                debug!(%peer, error = %e, "rejecting candidate chain");
                continue;
            }

            max_length = chain.length;
            best = Some(Candidate {
                peer,
                chain: chain.chain,
                nodes,
            });
        }

        match best {
            Some(candidate) => {
                let Candidate { peer, chain, nodes } = candidate;
                let length = chain.len();
                if let Err(e) = state.ledger.replace_chain(chain) {
                    warn!(%peer, error = %e, "candidate chain could not be adopted");
                    return Resolution::Authoritative;
                }
                state.replace_nodes(nodes);
                info!(%peer, length, "chain replaced by longer peer chain");
                Resolution::Replaced
            }
            None => Resolution::Authoritative,
        }
    }
}
