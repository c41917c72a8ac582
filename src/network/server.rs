//! HTTP server exposing a string-valued cache.

use crate::cache::DistributedCache;
use crate::config::ServerConfig;
use crate::error::{Error, NetworkError, Result};
use crate::network::rpc::{
    ErrorResponse, GetResponse, MessageResponse, OwnerDataResponse, SetRequest,
};
use crate::types::{AddOwnerOutcome, CacheStats, RemoveOwnerOutcome};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Cache shared between request handlers.
pub type SharedCache = Arc<DistributedCache<String>>;

/// Failure returned by a route handler.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) => ApiError::NotFound(err.to_string()),
            Error::AlreadyExists(_) | Error::InvalidIdentity(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Build the route table over `cache`.
pub fn router(cache: SharedCache) -> Router {
    Router::new()
        .route("/get/:key", get(get_value))
        .route("/set/:key", post(set_value))
        .route("/delete/:key", delete(delete_value))
        .route("/nodes", get(list_nodes))
        .route("/nodes/:name", post(add_node).delete(remove_node))
        .route("/data/:name", get(node_data))
        .route("/stats", get(stats))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(cache)
}

async fn get_value(State(cache): State<SharedCache>, Path(key): Path<String>) -> ApiResult<GetResponse> {
    match cache.get(&key) {
        Some(value) => Ok(Json(GetResponse { key, value })),
        None => Err(ApiError::NotFound("Key not found".to_string())),
    }
}

async fn set_value(
    State(cache): State<SharedCache>,
    Path(key): Path<String>,
    Json(body): Json<SetRequest>,
) -> ApiResult<MessageResponse> {
    let owner = cache.set_located(key.clone(), body.value)?;
    Ok(Json(MessageResponse::new(format!(
        "Key '{}' set on node '{}'",
        key, owner
    ))))
}

async fn delete_value(
    State(cache): State<SharedCache>,
    Path(key): Path<String>,
) -> ApiResult<MessageResponse> {
    if cache.delete(&key) {
        Ok(Json(MessageResponse::new(format!("Key '{}' deleted", key))))
    } else {
        Err(ApiError::NotFound("Key not found".to_string()))
    }
}

async fn list_nodes(State(cache): State<SharedCache>) -> Json<Vec<String>> {
    Json(cache.owners())
}

async fn add_node(
    State(cache): State<SharedCache>,
    Path(name): Path<String>,
) -> ApiResult<MessageResponse> {
    let outcome = {
        let name = name.clone();
        run_migration(move || cache.add_owner_named(name)).await??
    };
    match outcome {
        AddOwnerOutcome::Added { migrated } => Ok(Json(MessageResponse::new(format!(
            "Node '{}' added, {} keys migrated",
            name, migrated
        )))),
        AddOwnerOutcome::AlreadyExists => Err(Error::AlreadyExists(name).into()),
    }
}

async fn remove_node(
    State(cache): State<SharedCache>,
    Path(name): Path<String>,
) -> ApiResult<MessageResponse> {
    let outcome = {
        let name = name.clone();
        run_migration(move || cache.remove_owner(&name)).await?
    };
    match outcome {
        RemoveOwnerOutcome::Removed { remigrated, dropped } => {
            Ok(Json(MessageResponse::new(format!(
                "Node '{}' removed, {} keys remigrated, {} dropped",
                name, remigrated, dropped
            ))))
        }
        RemoveOwnerOutcome::NotFound => Err(ApiError::NotFound("Node not found".to_string())),
    }
}

/// Run a membership change on the blocking pool.
///
/// Migration is synchronous and holds the ring's write lock for its whole
/// duration, so it must not occupy a runtime worker.
async fn run_migration<F, T>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("migration task failed: {}", e)))
}

async fn node_data(
    State(cache): State<SharedCache>,
    Path(name): Path<String>,
) -> ApiResult<OwnerDataResponse> {
    cache
        .owner_contents(&name)
        .map(|data| Json(OwnerDataResponse { data }))
        .ok_or_else(|| ApiError::NotFound("Node not found".to_string()))
}

async fn stats(State(cache): State<SharedCache>) -> Json<CacheStats> {
    Json(cache.stats())
}

async fn metrics(State(cache): State<SharedCache>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        cache.metrics().to_prometheus(),
    )
}

/// HTTP server for the cache.
pub struct HttpServer {
    /// Address to bind to.
    bind_addr: SocketAddr,

    /// The cache being served.
    cache: SharedCache,

    /// Shutdown signal receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

impl HttpServer {
    /// Create a new server and the sender that stops it.
    pub fn new(config: &ServerConfig, cache: SharedCache) -> (Self, mpsc::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let server = Self {
            bind_addr: config.bind_addr,
            cache,
            shutdown_rx,
        };

        (server, shutdown_tx)
    }

    /// Bind the configured address and serve until shutdown is signalled.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(NetworkError::Io)?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown is signalled.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let Self {
            cache,
            mut shutdown_rx,
            ..
        } = self;
        let addr = listener.local_addr().map_err(NetworkError::Io)?;
        info!(addr = %addr, owners = ?cache.owners(), "HTTP server listening");

        axum::serve(listener, router(cache))
            .with_graceful_shutdown(async move {
                // A dropped sender also stops the server.
                let _ = shutdown_rx.recv().await;
                debug!("Shutdown signal received");
            })
            .await
            .map_err(NetworkError::Io)?;

        info!("HTTP server shut down");
        Ok(())
    }
}
