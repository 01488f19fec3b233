use axum::routing::get;
use axum::Router;

pub mod auth;
pub mod buckets;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/auth", auth::router(state.clone()))
        .nest("/buckets", buckets::router(state.clone()))
        .route("/storage-usage", get(buckets::usage::handler))
        .with_state(state)
}
