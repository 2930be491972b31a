//! egui Native Desktop App Module
//!
//! Field data collection client: the visit form, the audio interview and the
//! offline queue with its sync center.
//!
//! # Architecture
//!
//! - **`config`** - Configuration loading (file, `.env`, environment)
//! - **`local_db`** - Local SQLite store backing the offline queue
//! - **`offline`** - Offline queue and the manager tying it to sync
//! - **`sync`** - Delivery to the ingest endpoint and connectivity
//! - **`capture`** - Audio interview capture and consent gating
//! - **`bridge`** - Composes form state into submission payloads
//! - **`state`** - Central UI state polled each frame
//! - **`views`** / **`theme`** - egui rendering
//!
//! # Module Structure
//!
//! ```text
//! egui_app/
//! ├── mod.rs        - Module exports and documentation
//! ├── main.rs       - Desktop entry point
//! ├── config.rs     - Configuration loading
//! ├── bridge.rs     - Submission composer
//! ├── local_db/     - SQLite key/value store
//! ├── offline/      - Queue, storage seam, manager
//! ├── sync/         - Sync engine, HTTP transport, network monitor
//! ├── capture/      - Capture session, interview form, devices
//! ├── state/        - AppState
//! ├── views/        - Form, sync center, top bar
//! └── theme/        - Colors and frames
//! ```

pub mod bridge;
pub mod capture;
pub mod config;
pub mod local_db;
pub mod offline;
pub mod state;
pub mod sync;
pub mod theme;
pub mod views;

// Re-export commonly used types
pub use config::Config;
pub use offline::{LocalOfflineManager, OfflineManager};
pub use state::AppState;
