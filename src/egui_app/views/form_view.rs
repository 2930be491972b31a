//! Data collection form with the interview section

use eframe::egui;

use crate::egui_app::capture::session::format_elapsed;
use crate::egui_app::capture::{CaptureState, GatingError, SourceMode};
use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.set_max_width(720.0);

        if let Some(error) = &state.startup_error {
            ui.colored_label(colors::ERROR, error);
            ui.add_space(8.0);
        }

        styles::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new("Visit details").size(16.0).strong().color(colors::TEXT_DARK));
            ui.add_space(8.0);
            render_visit_fields(ui, state);
        });

        ui.add_space(12.0);

        styles::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new("Interview").size(16.0).strong().color(colors::TEXT_DARK));
            ui.add_space(8.0);
            render_interview(ui, state);
        });

        ui.add_space(12.0);

        ui.horizontal(|ui| {
            let label = if state.is_submitting() { "Submitting…" } else { "Submit" };
            let submit = egui::Button::new(egui::RichText::new(label).color(colors::TEXT_LIGHT)).fill(colors::ACCENT);
            if ui.add_enabled(!state.is_submitting(), submit).clicked() {
                state.handle_submit();
            }
        });

        if let Some(error) = &state.gating_error {
            ui.add_space(4.0);
            ui.colored_label(colors::ERROR, error.to_string());
        }

        if let Some(notice) = &state.notice {
            ui.add_space(4.0);
            let color = if notice.is_error { colors::ERROR } else { colors::SUCCESS };
            ui.colored_label(color, &notice.text);
        }
    });
}

fn render_visit_fields(ui: &mut egui::Ui, state: &mut AppState) {
    egui::Grid::new("visit_fields")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.colored_label(colors::TEXT_SECONDARY, "Enumerator");
            ui.text_edit_singleline(&mut state.enumerator_input);
            ui.end_row();

            if !state.config.facilities().is_empty() {
                ui.colored_label(colors::TEXT_SECONDARY, "Facility");
                let selected = state
                    .facility_choice
                    .and_then(|index| state.config.facilities().get(index))
                    .map(|option| option.label.clone())
                    .unwrap_or_else(|| "Select…".to_string());
                egui::ComboBox::from_id_salt("facility_choice")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut state.facility_choice, None, "None");
                        for (index, option) in state.config.facilities().iter().enumerate() {
                            ui.selectable_value(&mut state.facility_choice, Some(index), &option.label);
                        }
                    });
                ui.end_row();
            }

            ui.colored_label(colors::TEXT_SECONDARY, "Facility name");
            ui.text_edit_singleline(&mut state.facility_name_input);
            ui.end_row();
        });
}

fn render_interview(ui: &mut egui::Ui, state: &mut AppState) {
    let mut mode = state.interview.mode();
    ui.horizontal(|ui| {
        ui.radio_value(&mut mode, SourceMode::Text, "Typed notes");
        ui.radio_value(&mut mode, SourceMode::Audio, "Audio recording");
    });
    if mode != state.interview.mode() {
        state.set_interview_mode(mode);
    }
    ui.add_space(8.0);

    match state.interview.mode() {
        SourceMode::Text => {
            ui.add(
                egui::TextEdit::multiline(&mut state.interview.notes)
                    .hint_text("Interview notes")
                    .desired_rows(6)
                    .desired_width(f32::INFINITY),
            );
            if state.gating_error == Some(GatingError::NotesEmpty) {
                ui.colored_label(colors::ERROR, "Notes are required");
            }
        }
        SourceMode::Audio => render_audio(ui, state),
    }
}

fn render_audio(ui: &mut egui::Ui, state: &mut AppState) {
    let mut consent = state.interview.consent();
    if ui.checkbox(&mut consent, "Respondent consented to the interview").changed() {
        state.interview.set_consent(consent);
    }
    let mut allowed = state.interview.audio_allowed();
    if ui.checkbox(&mut allowed, "Respondent allows audio recording").changed() {
        state.interview.set_audio_allowed(allowed);
    }
    ui.add_space(8.0);

    let session_state = state.interview.session().state();
    ui.horizontal(|ui| {
        let recording_color = if session_state == CaptureState::Recording {
            colors::RECORDING
        } else {
            colors::TEXT_SECONDARY
        };
        ui.colored_label(recording_color, format!("● {}", session_state.label()));
        ui.monospace(format_elapsed(state.interview.session().elapsed_ms()));
    });

    ui.horizontal(|ui| {
        if ui.add_enabled(session_state.accepts_start(), egui::Button::new("Record")).clicked() {
            state.start_recording();
        }
        if ui
            .add_enabled(session_state == CaptureState::Recording, egui::Button::new("Pause"))
            .clicked()
        {
            state.pause_recording();
        }
        if ui
            .add_enabled(session_state == CaptureState::Paused, egui::Button::new("Resume"))
            .clicked()
        {
            state.resume_recording();
        }
        if ui.add_enabled(session_state.is_active(), egui::Button::new("Stop")).clicked() {
            state.stop_recording();
        }
        let has_result = matches!(
            session_state,
            CaptureState::StoppedWithAudio | CaptureState::StoppedEmpty | CaptureState::Error
        );
        if ui.add_enabled(has_result, egui::Button::new("Discard")).clicked() {
            state.clear_recording();
        }
    });

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.import_path_input)
                .hint_text("Path to an audio file, or drop one on the window"),
        );
        if ui.button("Import").clicked() {
            state.import_from_input();
        }
    });

    if let Some(status) = state.interview.session().status() {
        ui.colored_label(colors::TEXT_SECONDARY, status);
    }
    if let Some(artifact) = state.interview.session().artifact() {
        ui.colored_label(
            colors::TEXT_SECONDARY,
            format!("{} · {} · {} bytes", artifact.file_name(), artifact.mime(), artifact.size()),
        );
    }
    if let Some(error) = state.interview.capture_error() {
        ui.colored_label(colors::ERROR, error.to_string());
    }

    ui.add_space(8.0);
    ui.add(
        egui::TextEdit::multiline(&mut state.interview.notes)
            .hint_text("Optional notes")
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
}
