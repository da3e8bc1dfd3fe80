//! Peer RPC surface
//!
//! Nodes talk to each other over three JSON endpoints:
//!
//! | Operation     | Request                          | Response               |
//! |---------------|----------------------------------|------------------------|
//! | fetch chain   | `GET /chain`                     | `{chain, length}`      |
//! | fetch nodes   | `GET /nodes`                     | `{nodes}`              |
//! | announce node | `POST /nodes/register {node}`    | ack (ignored)          |
//!
//! [`PeerTransport`] abstracts the client side so consensus and discovery can
//! run against in-process peers in tests. [`HttpTransport`] is the production
//! implementation. Calls carry no timeout and are never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blockchain::Block;
use crate::error::{ChainError, Result};

/// Body of `GET /chain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// Body of `GET /nodes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<String>,
}

/// Body of `POST /nodes/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterNodeRequest {
    pub node: String,
}

/// Client side of the peer RPC surface. `peer` is a `host:port` location.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainResponse>;

    async fn fetch_nodes(&self, peer: &str) -> Result<NodesResponse>;

    async fn announce_node(&self, peer: &str, node: &str) -> Result<()>;
}

/// [`PeerTransport`] over plain HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn url(peer: &str, path: &str) -> String {
        format!("http://{}{}", peer, path)
    }

    fn check_status(peer: &str, response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ChainError::PeerResponse {
                peer: peer.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        let url = Self::url(peer, "/chain");
        debug!(%url, "fetching chain");
        let response = self.client.get(&url).send().await?;
        Self::check_status(peer, &response)?;
        Ok(response.json::<ChainResponse>().await?)
    }

    async fn fetch_nodes(&self, peer: &str) -> Result<NodesResponse> {
        let url = Self::url(peer, "/nodes");
        debug!(%url, "fetching nodes");
        let response = self.client.get(&url).send().await?;
        Self::check_status(peer, &response)?;
        Ok(response.json::<NodesResponse>().await?)
    }

    async fn announce_node(&self, peer: &str, node: &str) -> Result<()> {
        let url = Self::url(peer, "/nodes/register");
        debug!(%url, node, "announcing node");
        let response = self
            .client
            .post(&url)
            .json(&RegisterNodeRequest {
                node: node.to_string(),
            })
            .send()
            .await?;
        Self::check_status(peer, &response)
    }
}
