use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use common::stats::ScanCancelled;
use common::storage::{ClientInitError, StorageError};

use crate::http_server::session::Forbidden;
use crate::ServiceState;

pub mod list;
pub mod usage;

pub use list::{BucketInfo, ListBucketsQuery, ListBucketsResponse};
pub use usage::StorageUsageResponse;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler))
        .with_state(state)
}

/// Failures shared by the bucket endpoints.
#[derive(Debug, thiserror::Error)]
pub enum BucketsError {
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    #[error("Failed to create storage clients: {0}")]
    ClientInit(#[from] ClientInitError),
    #[error("Failed to list buckets: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Cancelled(#[from] ScanCancelled),
}

impl IntoResponse for BucketsError {
    fn into_response(self) -> Response {
        match self {
            BucketsError::Forbidden(forbidden) => forbidden.into_response(),
            BucketsError::ClientInit(e) => {
                tracing::error!("BUCKETS API: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({"error": "Storage cluster is misconfigured"})),
                )
                    .into_response()
            }
            BucketsError::Storage(e) => {
                tracing::error!("BUCKETS API: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": e.to_string()})),
                )
                    .into_response()
            }
            BucketsError::Cancelled(e) => {
                tracing::debug!("BUCKETS API: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({"error": "Request cancelled"})),
                )
                    .into_response()
            }
        }
    }
}
