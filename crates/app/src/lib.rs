// Library exports for the binary and integration tests

mod config;
pub mod http_server;
pub mod process;
mod state;
pub mod version;

// Re-export key types for convenience
pub use config::Config as ServiceConfig;
pub use process::spawn_service;
pub use state::State as ServiceState;
pub use state::{StateSetupError, StatsSettings};
