//! # Sync Center
//!
//! Presents the offline queue: connectivity, per-entry status and the
//! sync-now / clear-queue actions. [`SyncCenter::view`] derives everything
//! shown from the queue and the connectivity flag, so the panel is rebuilt on
//! every queue snapshot or connectivity change.

use chrono::{DateTime, Utc};
use eframe::egui;
use reqwest::Url;

use crate::egui_app::offline::{EntryMeta, EntryStatus, QueueEntry};
use crate::egui_app::theme::{colors, styles};

/// User action requested from the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCenterAction {
    SyncNow,
    /// Confirmed by the user
    ClearQueue,
}

/// One rendered queue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCenterRow {
    pub id: String,
    pub label: String,
    pub queued: String,
    pub status: EntryStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Everything the panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCenterView {
    pub online: bool,
    pub can_sync: bool,
    pub can_clear: bool,
    /// Newest first
    pub rows: Vec<SyncCenterRow>,
    pub link: Option<Url>,
}

/// Sync center controller
#[derive(Debug, Clone, Default)]
pub struct SyncCenter {
    link_url: Option<Url>,
    confirm_open: bool,
}

impl SyncCenter {
    pub fn new(link_url: Option<Url>) -> Self {
        Self {
            link_url,
            confirm_open: false,
        }
    }

    /// Derive the panel. `None` when the queue is empty and the device is
    /// online: nothing is shown then.
    pub fn view(&self, entries: &[QueueEntry], online: bool, now: DateTime<Utc>) -> Option<SyncCenterView> {
        if entries.is_empty() && online {
            return None;
        }

        let rows = entries
            .iter()
            .rev()
            .map(|entry| SyncCenterRow {
                id: entry.id.clone(),
                label: entry_label(&entry.meta),
                queued: relative_time(entry.meta.queued_at, now),
                status: entry.status,
                attempts: entry.attempts,
                last_error: Some(entry.last_error.trim())
                    .filter(|error| !error.is_empty())
                    .map(str::to_string),
            })
            .collect();

        Some(SyncCenterView {
            online,
            can_sync: online && !entries.is_empty(),
            can_clear: !entries.is_empty(),
            rows,
            link: self.link_url.clone(),
        })
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm_open
    }

    /// Open the clear confirmation. Ignored for an empty queue.
    pub fn request_clear(&mut self, queue_len: usize) -> bool {
        self.confirm_open = queue_len > 0;
        self.confirm_open
    }

    /// Accept the confirmation. Returns whether the queue should be cleared.
    pub fn confirm_clear(&mut self) -> bool {
        std::mem::replace(&mut self.confirm_open, false)
    }

    pub fn cancel_clear(&mut self) {
        self.confirm_open = false;
    }

    /// Draw the panel and the confirmation dialog
    pub fn render(&mut self, ui: &mut egui::Ui, view: &SyncCenterView) -> Option<SyncCenterAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Sync Center").size(18.0).strong().color(colors::TEXT_LIGHT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (color, text) = if view.online {
                    (colors::STATUS_ONLINE, "● Online")
                } else {
                    (colors::STATUS_OFFLINE, "● Offline")
                };
                ui.colored_label(color, text);
            });
        });
        ui.add_space(4.0);
        ui.colored_label(
            colors::TEXT_SECONDARY,
            match view.rows.len() {
                0 => "No submissions waiting".to_string(),
                1 => "1 submission waiting to sync".to_string(),
                n => format!("{} submissions waiting to sync", n),
            },
        );
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let sync = egui::Button::new(egui::RichText::new("Sync now").color(colors::TEXT_LIGHT)).fill(colors::ACCENT);
            if ui.add_enabled(view.can_sync, sync).clicked() {
                action = Some(SyncCenterAction::SyncNow);
            }
            if ui.add_enabled(view.can_clear, egui::Button::new("Clear queue")).clicked() {
                self.request_clear(view.rows.len());
            }
        });

        if let Some(link) = &view.link {
            ui.add_space(4.0);
            ui.hyperlink_to("Open sync center", link.as_str());
        }

        ui.add_space(8.0);
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for row in &view.rows {
                styles::entry_row_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&row.label).strong().color(colors::TEXT_LIGHT));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            styles::status_pill(ui, row.status);
                        });
                    });
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&row.queued).small().color(colors::TIMESTAMP));
                        if row.attempts > 0 {
                            ui.label(
                                egui::RichText::new(format!("· {} attempt(s)", row.attempts))
                                    .small()
                                    .color(colors::TIMESTAMP),
                            );
                        }
                    });
                    if let Some(error) = &row.last_error {
                        ui.label(egui::RichText::new(error).small().color(colors::ERROR));
                    }
                });
                ui.add_space(4.0);
            }
        });

        if self.confirm_open {
            egui::Window::new("Clear offline queue?")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .frame(styles::modal_frame())
                .show(ui.ctx(), |ui| {
                    ui.colored_label(
                        colors::TEXT_DARK,
                        format!(
                            "{} queued submission(s) will be deleted from this device and never sent.",
                            view.rows.len()
                        ),
                    );
                    ui.add_space(12.0);
                    ui.horizontal(|ui| {
                        let clear = egui::Button::new(egui::RichText::new("Clear").color(colors::TEXT_LIGHT))
                            .fill(colors::STATUS_OFFLINE);
                        if ui.add(clear).clicked() && self.confirm_clear() {
                            action = Some(SyncCenterAction::ClearQueue);
                        }
                        if ui.button("Cancel").clicked() {
                            self.cancel_clear();
                        }
                    });
                });
        }

        action
    }
}

/// Human label for an entry: facility and enumerator when known
pub fn entry_label(meta: &EntryMeta) -> String {
    match (meta.facility.trim(), meta.enumerator.trim()) {
        ("", "") => "Untitled submission".to_string(),
        (facility, "") => facility.to_string(),
        ("", enumerator) => enumerator.to_string(),
        (facility, enumerator) => format!("{} · {}", facility, enumerator),
    }
}

/// Coarse "time ago" text
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{} min ago", s / 60),
        s if s < 86_400 => format!("{} h ago", s / 3_600),
        s => format!("{} d ago", s / 86_400),
    }
}
