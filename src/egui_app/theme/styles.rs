//! Theme Styling Functions
//!
//! Helpers applying the brown color scheme consistently across panels, form
//! cards and status pills.

use eframe::egui::{self, Color32, CornerRadius, Stroke};

use super::colors;
use crate::egui_app::offline::EntryStatus;

/// Apply the global theme to the egui context
pub fn apply_global_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    // Window styling
    style.visuals.window_fill = colors::CARD_BG;
    style.visuals.window_stroke = Stroke::new(1.0, colors::CARD_BORDER);

    // Panel styling
    style.visuals.panel_fill = colors::BG_DARK;

    // Widget styling
    style.visuals.widgets.noninteractive.bg_fill = colors::INPUT_BG;
    style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors::TEXT_DARK);

    style.visuals.widgets.inactive.bg_fill = colors::INPUT_BG;
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, colors::TEXT_DARK);

    style.visuals.widgets.hovered.bg_fill = colors::HOVER;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, colors::TEXT_LIGHT);

    style.visuals.widgets.active.bg_fill = colors::ACCENT;
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, colors::TEXT_LIGHT);

    // Selection color
    style.visuals.selection.bg_fill = colors::HOVER;
    style.visuals.selection.stroke = Stroke::new(1.0, colors::TEXT_LIGHT);

    ctx.set_style(style);
}

/// Create a frame style for the top bar
pub fn top_bar_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::TOP_BAR_BG)
        .inner_margin(egui::Margin::symmetric(12, 8))
}

/// Create a frame style for the sync center side panel
pub fn side_panel_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::PANEL_BG)
        .inner_margin(egui::Margin::same(12))
}

/// Create a frame style for the main form area
pub fn main_area_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::BG_DARK)
        .inner_margin(egui::Margin::same(16))
}

/// Create a frame for a form section card
pub fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::CARD_BG)
        .stroke(Stroke::new(1.0, colors::CARD_BORDER))
        .corner_radius(CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(16, 12))
}

/// Create a frame for a queued entry row
pub fn entry_row_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(Color32::from_rgba_unmultiplied(
            colors::HOVER.r(),
            colors::HOVER.g(),
            colors::HOVER.b(),
            96,
        ))
        .corner_radius(CornerRadius::same(6))
        .inner_margin(egui::Margin::symmetric(10, 6))
}

/// Create a frame for modal dialogs
pub fn modal_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::CARD_BG)
        .stroke(Stroke::new(2.0, colors::CARD_BORDER))
        .corner_radius(CornerRadius::same(12))
        .inner_margin(egui::Margin::same(20))
        .shadow(egui::epaint::Shadow {
            offset: [0, 4],
            blur: 12,
            spread: 0,
            color: Color32::from_black_alpha(60),
        })
}

/// Pill background for a queue entry status
pub fn status_pill_color(status: EntryStatus) -> Color32 {
    match status {
        EntryStatus::Pending => colors::PILL_PENDING,
        EntryStatus::Syncing => colors::PILL_SYNCING,
        EntryStatus::Error => colors::PILL_ERROR,
    }
}

/// Render a status pill
pub fn status_pill(ui: &mut egui::Ui, status: EntryStatus) -> egui::Response {
    egui::Frame::new()
        .fill(status_pill_color(status))
        .corner_radius(CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(status.label()).small().strong().color(colors::TEXT_DARK));
        })
        .response
}
