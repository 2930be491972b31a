//! Common test utilities and helpers
//!
//! - Scripted capture device
//! - Mock ingest endpoint helpers
//! - Submission and on-disk database fixtures

pub mod capture;
pub mod database;
pub mod mock_ingest;

pub use capture::*;
pub use database::*;
pub use mock_ingest::*;
