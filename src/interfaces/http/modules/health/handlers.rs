//! Liveness endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ItemRepository;
use crate::shared::types::PaginationConfig;

#[derive(Clone)]
pub struct HealthState {
    pub repo: Arc<dyn ItemRepository>,
    pub pagination: PaginationConfig,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: StorageHealth,
    pub pagination: PaginationBounds,
}

/// Result of counting the item collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageHealth {
    pub reachable: bool,
    pub item_count: Option<u64>,
    pub latency_ms: u64,
}

/// Page size limits currently enforced.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationBounds {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

async fn probe_storage(repo: &dyn ItemRepository) -> StorageHealth {
    let started = Instant::now();
    let count = repo.count().await;
    let latency_ms = started.elapsed().as_millis() as u64;
    match count {
        Ok(count) => StorageHealth {
            reachable: true,
            item_count: Some(count),
            latency_ms,
        },
        Err(e) => {
            warn!(error = %e, "Storage probe failed");
            StorageHealth {
                reachable: false,
                item_count: None,
                latency_ms,
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Storage unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = probe_storage(state.repo.as_ref()).await;
    let (code, status) = if storage.reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage,
        pagination: PaginationBounds {
            default_page_size: state.pagination.default_page_size,
            max_page_size: state.pagination.max_page_size,
        },
    };
    (code, Json(body))
}
