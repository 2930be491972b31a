//! Submission ingest: storage and HTTP handlers

pub mod db;
pub mod handlers;

pub use handlers::{health, ingest_submission};
