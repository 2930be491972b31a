//! Integration tests
//!
//! - `offline_test` - queue, sync engine and manager over HTTP and SQLite
//! - `capture_test` - capture session and interview gating
//! - `ingest_test` - ingest endpoint (`ssr`)

mod capture_test;
mod ingest_test;
mod offline_test;
