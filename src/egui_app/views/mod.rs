use eframe::egui;

use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

pub mod form_view;
pub mod sync_center;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_panel")
        .frame(styles::top_bar_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(colors::TEXT_LIGHT, egui::RichText::new("OpenField Collect").size(18.0).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);

                    if !state.offline_enabled() {
                        ui.colored_label(colors::TEXT_SECONDARY, "Offline sync disabled");
                        return;
                    }

                    let waiting = state.queue_entries.len();
                    if state.is_draining() {
                        ui.colored_label(colors::WARNING, "Syncing…");
                    } else if waiting > 0 {
                        ui.colored_label(colors::WARNING, format!("{} waiting", waiting));
                    }

                    ui.add_space(16.0);

                    if state.is_online {
                        ui.colored_label(colors::STATUS_ONLINE, "● Online");
                    } else {
                        ui.colored_label(colors::STATUS_OFFLINE, "● Offline");
                    }
                });
            });
        });
}

/// Sync center side panel. Hidden while online with an empty queue.
pub fn render_sync_panel(ctx: &egui::Context, state: &mut AppState) {
    let Some(view) = state.sync_center_view() else {
        return;
    };

    let mut action = None;
    egui::SidePanel::right("sync_center")
        .frame(styles::side_panel_frame())
        .default_width(320.0)
        .resizable(true)
        .show(ctx, |ui| {
            action = state.sync_center.render(ui, &view);
        });

    if let Some(action) = action {
        tracing::debug!(?action, "Sync center action");
        state.handle_sync_center_action(action);
    }
}

pub fn render_main_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default()
        .frame(styles::main_area_frame())
        .show(ctx, |ui| form_view::render(ui, state));
}
