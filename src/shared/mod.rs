//! Shared Module
//!
//! Types shared between the collecting client and the ingest backend: the
//! submission payload and its wire envelope, configuration, and errors.
//! Everything here is platform-agnostic and designed for serialization.

/// Submission payload and ingest wire types
pub mod submission;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

pub use config::{AppConfig, AppConfigBuilder, ConfigError, ConfigFile, FacilityOption};
pub use error::SharedError;
pub use submission::{
    fields, FieldValue, IngestAck, IngestRequest, SubmissionFields, OFFLINE_SYNC_SOURCE,
};
