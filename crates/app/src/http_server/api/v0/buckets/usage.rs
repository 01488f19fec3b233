use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use common::stats::{aggregate, format_bytes};

use super::BucketsError;
use crate::http_server::session::Session;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageUsageResponse {
    pub total_size: i64,
    pub total_objects: i64,
    pub total_buckets: usize,
    pub buckets_with_stats: usize,
    pub formatted_size: String,
}

/// Dashboard summary over every visible bucket, computed with the short
/// per-bucket budget.
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
) -> Result<impl IntoResponse, BucketsError> {
    let clients = state.factory().create_clients(&session.principal())?;
    let names: Vec<String> = clients
        .data
        .list_buckets()
        .await?
        .into_iter()
        .map(|b| b.name)
        .collect();

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let settings = state.stats();
    let summary = aggregate(
        clients.data.as_ref(),
        &names,
        settings.quick_timeout,
        settings.workers,
        &cancel,
    )
    .await?;

    tracing::info!(
        "STORAGE USAGE API: {} of {} buckets scanned for {}",
        summary.buckets_with_stats,
        summary.total_buckets,
        session.claims().identity
    );

    Ok((
        http::StatusCode::OK,
        Json(StorageUsageResponse {
            total_size: summary.total_size_bytes,
            total_objects: summary.total_object_count,
            total_buckets: summary.total_buckets,
            buckets_with_stats: summary.buckets_with_stats,
            formatted_size: format_bytes(summary.total_size_bytes),
        }),
    )
        .into_response())
}
