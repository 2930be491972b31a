//! OpenField Collect - Main Library
//!
//! Field data collection with an offline-first submission path and audio
//! interviews.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between the desktop client and the ingest
//!   service
//!   - Submission field map and wire names
//!   - Ingest request/acknowledgement shapes
//!   - Application configuration
//!
//! - **`egui_app`** - Native desktop client (egui/eframe)
//!   - Offline queue persisted in a local SQLite database
//!   - Sync engine draining the queue to the ingest endpoint
//!   - Sync Center panel
//!   - Audio interview capture with consent gating
//!
//! - **`backend`** - Ingest service (only compiled with the `ssr` feature)
//!   - `POST /api/sync/submissions`, idempotent on `client_uuid`
//!   - `GET /api/health`
//!
//! # Feature Flags
//!
//! - **`ssr`** - Builds the Axum ingest service
//! - **`native-audio`** - Microphone capture through cpal
//!
//! # Thread Safety
//!
//! - **Client**: egui is single-threaded immediate mode; queue state lives
//!   behind `tokio::sync::RwLock` and is published through `watch` channels
//!   to the UI thread.
//! - **Server**: handlers share a `SqlitePool`.

/// Shared types and data structures
pub mod shared;

/// Ingest service
#[cfg(feature = "ssr")]
pub mod backend;

/// egui native desktop app
#[cfg(not(target_arch = "wasm32"))]
pub mod egui_app;
