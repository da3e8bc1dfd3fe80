//! HTTP serving layer for a powledger node
//!
//! Exposes the peer RPC surface (`/chain`, `/nodes`, `/nodes/register`) next
//! to the client operations (mining, transactions, registration, consensus).

use axum::{
    extract::{Query, Request, State},
    http::{self, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::ChainError;
use crate::network::{ChainResponse, NodesResponse, RegisterNodeRequest};
use crate::node::{MineOutcome, Node, NodeStatus};
use crate::transaction::Transaction;

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlockchainError(e @ ChainError::MiningError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::BlockchainError(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::BlockchainError(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Serialize)]
pub struct MinedBlockResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

/// Fields are optional so a missing one maps to a 400 with a clear message.
#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Serialize)]
struct TransactionPoolResponse {
    transactions_pool: Vec<Transaction>,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_nodes: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct RegisterQuery {
    pub address: Option<String>,
}

#[derive(Serialize)]
struct ResolveResponse {
    message: String,
    chain: Vec<crate::blockchain::Block>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the router with all endpoints.
pub fn build_api_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        // Ledger endpoints
        .route("/mine", get(mine))
        .route("/transactions/new", axum::routing::post(new_transaction))
        .route("/transactions", get(get_transactions))
        .route("/chain", get(get_chain))
        // Network endpoints
        .route("/nodes", get(get_nodes))
        .route("/nodes/register", get(register_self).post(receive_broadcast))
        .route("/nodes/resolve", get(resolve))
        // System endpoints
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(node)
        .layer(cors)
}

/// Serve `node` on `addr` until Ctrl-C.
pub async fn run_api_server(node: Arc<Node>, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(node.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    node.set_status(NodeStatus::Ready).await;
    tracing::info!(%addr, node_id = %node.node_id(), "API server listening");

    let shutdown_node = node.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            shutdown_node.set_status(NodeStatus::Stopping).await;
        })
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn index() -> Redirect {
    Redirect::to("/chain")
}

async fn mine(State(node): State<Arc<Node>>) -> Result<Response, ApiError> {
    if node.resolve().await.replaced() {
        return Ok((
            StatusCode::BAD_REQUEST,
            MessageResponse::new("Chain has been synced up, try mining again"),
        )
            .into_response());
    }

    match node.mine_next().await? {
        MineOutcome::Appended(block) => Ok(Json(MinedBlockResponse {
            message: "New block added".to_string(),
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        })
        .into_response()),
        MineOutcome::ChainReplaced => Ok((
            StatusCode::BAD_REQUEST,
            MessageResponse::new("Block already mined, try mining again"),
        )
            .into_response()),
    }
}

async fn new_transaction(
    State(node): State<Arc<Node>>,
    Json(req): Json<NewTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(sender), Some(recipient), Some(amount)) = (req.sender, req.recipient, req.amount) else {
        return Err(ApiError::InvalidInput("Missing required fields".to_string()));
    };
    if !amount.is_finite() {
        return Err(ApiError::InvalidInput("Amount must be a finite number".to_string()));
    }

    let index = node.submit_transaction(sender, recipient, amount).await;
    Ok(MessageResponse::new(format!(
        "Transaction will be added to block {}",
        index
    )))
}

async fn get_transactions(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(TransactionPoolResponse {
        transactions_pool: node.pending().await,
    })
}

async fn get_chain(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let chain = node.chain().await;
    Json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

async fn get_nodes(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(NodesResponse {
        nodes: node.nodes().await,
    })
}

/// Register this node's own address: `?address=` when given, else the `Host`
/// the request was sent to.
async fn register_self(
    State(node): State<Arc<Node>>,
    Query(query): Query<RegisterQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let address = requested_address(query, &headers)
        .ok_or_else(|| ApiError::InvalidInput("No address to register".to_string()))?;

    let response = if node.register(&address).await? {
        RegisterResponse {
            message: "New nodes registered".to_string(),
            total_nodes: Some(node.nodes().await),
        }
    } else {
        RegisterResponse {
            message: "Node already registered".to_string(),
            total_nodes: None,
        }
    };
    Ok(Json(response))
}

fn requested_address(query: RegisterQuery, headers: &HeaderMap) -> Option<String> {
    query.address.or_else(|| {
        headers
            .get(http::header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    })
}

async fn receive_broadcast(
    State(node): State<Arc<Node>>,
    Json(req): Json<RegisterNodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    node.receive_broadcast(&req.node).await?;
    Ok(Json(RegisterResponse {
        message: "Nodes broadcast".to_string(),
        total_nodes: Some(node.nodes().await),
    }))
}

async fn resolve(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let message = if node.resolve().await.replaced() {
        "Chain was replaced"
    } else {
        "Current chain is authoritative"
    };
    Json(ResolveResponse {
        message: message.to_string(),
        chain: node.chain().await,
    })
}

async fn health_check(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let status = node.status().await;
    let body = serde_json::json!({
        "status": if status == NodeStatus::Ready { "healthy" } else { "unhealthy" },
        "node_state": status,
        "node_id": node.node_id(),
        "length": node.chain_length().await,
        "peers": node.nodes().await.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });
    let code = if status == NodeStatus::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body))
}
