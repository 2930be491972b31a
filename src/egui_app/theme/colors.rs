//! Color Constants for the Field Collection Theme
//!
//! Warm brown/tan scheme; status colors are shared by the sync center pills
//! and the capture panel.

use eframe::egui::Color32;

/// Top bar background - Dark brown
pub const TOP_BAR_BG: Color32 = Color32::from_rgb(0x3E, 0x2A, 0x24);

/// Dark background for main areas
pub const BG_DARK: Color32 = Color32::from_rgb(0x2F, 0x1E, 0x1A);

/// Side panel background - Dark brown
pub const PANEL_BG: Color32 = Color32::from_rgb(0x3A, 0x27, 0x21);

/// Form card background - Off-white
pub const CARD_BG: Color32 = Color32::from_rgb(0xF7, 0xF2, 0xEC);

/// Form card border - Muted brown
pub const CARD_BORDER: Color32 = Color32::from_rgb(0xC7, 0xB2, 0x9A);

/// Hovered widget background - Lighter brown
pub const HOVER: Color32 = Color32::from_rgb(0x5C, 0x3A, 0x2C);

/// Input background
pub const INPUT_BG: Color32 = Color32::from_rgb(0xE6, 0xD7, 0xC7);

/// Input border - Muted tan
pub const INPUT_BORDER: Color32 = Color32::from_rgb(0xC3, 0xA9, 0x90);

/// Text on dark backgrounds
pub const TEXT_LIGHT: Color32 = Color32::from_rgb(0xF0, 0xE0, 0xD6);

/// Text on light backgrounds
pub const TEXT_DARK: Color32 = Color32::from_rgb(0x2F, 0x1E, 0x1A);

/// Secondary text color (muted)
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0x8B, 0x7B, 0x6B);

/// Online status indicator - Green
pub const STATUS_ONLINE: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);

/// Offline status indicator - Red
pub const STATUS_OFFLINE: Color32 = Color32::from_rgb(0xDC, 0x35, 0x45);

/// Success color - Green
pub const SUCCESS: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);

/// Error color - Red
pub const ERROR: Color32 = Color32::from_rgb(0xE5, 0x73, 0x73);

/// Warning color - Orange
pub const WARNING: Color32 = Color32::from_rgb(0xFF, 0xA7, 0x26);

/// Accent color for primary actions
pub const ACCENT: Color32 = Color32::from_rgb(0x5C, 0x3A, 0x2C);

/// Pending pill - Tan
pub const PILL_PENDING: Color32 = Color32::from_rgb(0xD8, 0xC0, 0xA8);

/// Syncing pill - Orange
pub const PILL_SYNCING: Color32 = Color32::from_rgb(0xFF, 0xC1, 0x07);

/// Error pill - Red
pub const PILL_ERROR: Color32 = Color32::from_rgb(0xE5, 0x73, 0x73);

/// Recording indicator - Bright red
pub const RECORDING: Color32 = Color32::from_rgb(0xE5, 0x39, 0x35);

/// Timestamp text color
pub const TIMESTAMP: Color32 = Color32::from_rgb(0x8B, 0x7B, 0x6B);
