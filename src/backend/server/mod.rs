//! Server setup: configuration, shared state and initialization

pub mod config;
pub mod init;
pub mod state;

pub use config::IngestConfig;
pub use init::{create_app, create_app_from_config};
pub use state::AppState;
