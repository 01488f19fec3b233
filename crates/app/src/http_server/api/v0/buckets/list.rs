use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use common::auth::Capability;
use common::stats::{bucket_stats, format_bytes, unknown_stats};

use super::BucketsError;
use crate::http_server::session::Session;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBucketsQuery {
    /// Skip scanning; every bucket reports unknown usage
    #[serde(default)]
    pub quick: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBucketsResponse {
    pub buckets: Vec<BucketInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<String>,
    /// Bytes, or -1 when unknown
    pub size: i64,
    /// Objects, or -1 when unknown
    pub object_count: i64,
    pub formatted_size: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Query(query): Query<ListBucketsQuery>,
) -> Result<impl IntoResponse, BucketsError> {
    session.require(Capability::ListBuckets)?;

    let clients = state.factory().create_clients(&session.principal())?;
    let buckets = clients.data.list_buckets().await?;
    let names: Vec<String> = buckets.iter().map(|b| b.name.clone()).collect();

    tracing::info!(
        "BUCKETS API: Listing {} buckets for {} (quick: {})",
        names.len(),
        session.claims().identity,
        query.quick
    );

    let stats = if query.quick {
        unknown_stats(&names)
    } else {
        // in-flight scans stop if the client goes away
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let settings = state.stats();
        bucket_stats(
            clients.data.as_ref(),
            &names,
            settings.full_timeout,
            settings.workers,
            &cancel,
        )
        .await?
    };

    let buckets = buckets
        .into_iter()
        .zip(stats)
        .map(|(bucket, stat)| BucketInfo {
            name: bucket.name,
            creation_date: bucket.creation_date,
            size: stat.usage.size_bytes,
            object_count: stat.usage.object_count,
            formatted_size: format_bytes(stat.usage.size_bytes),
        })
        .collect();

    Ok((http::StatusCode::OK, Json(ListBucketsResponse { buckets })).into_response())
}
