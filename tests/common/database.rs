//! Submission and local database fixtures

use std::path::PathBuf;

use openfield_collect::egui_app::local_db::LocalDatabase;
use openfield_collect::shared::{fields, SubmissionFields};
use tempfile::TempDir;

/// Minimal visit submission
pub fn visit(enumerator: &str, facility: &str) -> SubmissionFields {
    let mut submission = SubmissionFields::new();
    submission.set(fields::ENUMERATOR_NAME, enumerator);
    submission.set(fields::FACILITY_NAME, facility);
    submission
}

/// On-disk database in a temporary directory. Keep the `TempDir` alive for
/// as long as the database is used.
pub async fn temp_database() -> (LocalDatabase, TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline.db");
    let db = LocalDatabase::open(&path).await.unwrap();
    (db, dir, path)
}
