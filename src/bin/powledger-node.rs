#![forbid(unsafe_code)]
//! HTTP node for powledger

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use powledger::api::run_api_server;
use powledger::config::{load_config, DiscoveryMode};
use powledger::node::Node;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "powledger.toml")]
    config: String,
    /// Port to serve the API on
    #[arg(short, long)]
    port: Option<u16>,
    /// How registration bootstraps from the network
    #[arg(long, value_enum)]
    discovery: Option<DiscoveryMode>,
    /// Seed node (`host:port`); may be repeated
    #[arg(long = "seed")]
    seeds: Vec<String>,
    /// Identifier credited by mining rewards
    #[arg(long)]
    node_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.network.api_port = port;
    }
    if let Some(discovery) = cli.discovery {
        config.network.discovery = discovery;
    }
    if !cli.seeds.is_empty() {
        config.network.seed_nodes = cli.seeds;
    }
    if cli.node_id.is_some() {
        config.miner.node_id = cli.node_id;
    }
    config.validate()?;

    let addr: SocketAddr = format!("{}:{}", config.network.host, config.network.api_port).parse()?;
    let node = Arc::new(Node::from_config(&config)?);

    run_api_server(node, addr).await
}
