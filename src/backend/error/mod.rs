//! Backend Error Module
//!
//! Errors raised by the ingest handlers and their HTTP rendering.
//!
//! - **`types`** - `BackendError` and its status mapping
//! - **`conversion`** - `IntoResponse` producing `{ "ok": false, "error": ... }`

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
