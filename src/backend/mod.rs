//! Backend Module
//!
//! Reference ingest service for submissions delivered by the collecting
//! client, directly or from its offline queue. Compiled only with the `ssr`
//! feature.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, shared state, initialization
//! - **`routes`** - Route configuration and router assembly
//! - **`ingest`** - Submission storage and handlers
//! - **`error`** - `BackendError` and its HTTP rendering
//!
//! # Endpoints
//!
//! - `POST /api/sync/submissions` - body `{ "submission": { ... } }`.
//!   Responds `{ "ok": true, "submission_id": n }`; a `client_uuid` seen
//!   before adds `"duplicate": true` and stores nothing. A missing
//!   `client_uuid` is a 422 with `{ "ok": false, "error": ... }`.
//! - `GET /api/health` - `{ "ok": true }`
//!
//! # Example
//!
//! ```rust,no_run
//! use openfield_collect::backend::server::{create_app_from_config, IngestConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngestConfig::from_env()?;
//! let app = create_app_from_config(&config).await?;
//! let listener = tokio::net::TcpListener::bind(config.addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Backend error types
pub mod error;

/// Submission ingest
pub mod ingest;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

pub use error::BackendError;
pub use server::{create_app, create_app_from_config, IngestConfig};
