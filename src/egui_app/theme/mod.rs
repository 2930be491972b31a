//! Theme Module
//!
//! Color scheme and styling for the collection app:
//!
//! - Color constants for the brown/tan theme and status colors
//! - Frame builders for panels, cards and dialogs
//! - The queue status pill
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::egui_app::theme::{colors, styles};
//!
//! // Apply global theme
//! styles::apply_global_theme(ctx);
//!
//! // Use frame builders
//! styles::card_frame().show(ui, |ui| {
//!     // Form section content
//! });
//! ```

pub mod colors;
pub mod styles;

pub use colors::*;
pub use styles::*;
