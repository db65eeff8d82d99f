//! Agent Callback API
//!
//! HTTP surface agents use to report back: VIP port plug/unplug, pool stats
//! and pool destruction. Handlers delegate to AgentCallbacks.

use crate::application::AgentCallbacks;
use crate::domain::entities::PoolStats;
use crate::domain::error::DriverError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Plug or unplug request for a VIP port.
#[derive(Debug, Clone, Deserialize)]
pub struct PortRequest {
    #[serde(default)]
    pub port_id: Option<String>,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolStatsRequest {
    pub stats: PoolStats,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolDestroyedRequest {
    pub host: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Clone)]
pub struct CallbackState {
    pub callbacks: Arc<AgentCallbacks>,
}

pub struct CallbackApi {
    listen_addr: String,
    state: CallbackState,
}

impl CallbackApi {
    pub fn new(listen_addr: String, callbacks: Arc<AgentCallbacks>) -> Self {
        Self {
            listen_addr,
            state: CallbackState { callbacks },
        }
    }

    /// Run the callback API until the listener fails.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone()).layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("agent callback API listening on {}", self.listen_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/ports/plug", post(plug_vip_port_handler))
        .route("/api/v1/ports/unplug", post(unplug_vip_port_handler))
        .route("/api/v1/pools/:id/stats", post(pool_stats_handler))
        .route("/api/v1/pools/:id/destroyed", post(pool_destroyed_handler))
        .with_state(state)
}

fn error_response(err: DriverError) -> Response {
    let status = match &err {
        DriverError::PortNotFound { .. }
        | DriverError::PoolNotFound { .. }
        | DriverError::NetworkResourceNotFound { .. } => StatusCode::NOT_FOUND,
        DriverError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DriverError::BackendRejected { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({
            "error": err.to_string()
        })),
    )
        .into_response()
}

// Handler functions

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn plug_vip_port_handler(
    State(state): State<CallbackState>,
    Json(req): Json<PortRequest>,
) -> Response {
    match state
        .callbacks
        .plug_vip_port(req.port_id.as_deref(), &req.host)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "port_id": req.port_id,
                "plugged": true
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn unplug_vip_port_handler(
    State(state): State<CallbackState>,
    Json(req): Json<PortRequest>,
) -> Response {
    match state
        .callbacks
        .unplug_vip_port(req.port_id.as_deref(), &req.host)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "port_id": req.port_id,
                "plugged": false
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn pool_stats_handler(
    State(state): State<CallbackState>,
    Path(pool_id): Path<String>,
    Json(req): Json<PoolStatsRequest>,
) -> Response {
    match state
        .callbacks
        .update_pool_stats(&pool_id, req.stats, &req.host)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn pool_destroyed_handler(
    State(state): State<CallbackState>,
    Path(pool_id): Path<String>,
    Json(req): Json<PoolDestroyedRequest>,
) -> Response {
    state.callbacks.pool_destroyed(&pool_id, &req.host).await;
    StatusCode::NO_CONTENT.into_response()
}
