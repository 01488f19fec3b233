use axum::routing::{get, post};
use axum::Router;

pub mod login;
pub mod logout;
pub mod session;

pub use login::{LoginRequest, LoginResponse};
pub use session::SessionResponse;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/login", post(login::handler))
        .route("/logout", post(logout::handler))
        .route("/session", get(session::handler))
        .with_state(state)
}
