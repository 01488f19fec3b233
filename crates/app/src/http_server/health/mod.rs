use axum::routing::get;
use axum::Router;

use crate::ServiceState;

mod livez;
mod version;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(livez::handler))
        .route("/version", get(version::handler))
        .with_state(state)
}
