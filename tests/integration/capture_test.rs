//! Capture session and interview gating with a scripted microphone

use std::io::Write;

use assert_matches::assert_matches;
use openfield_collect::egui_app::bridge::{FormSnapshot, Provenance, SubmissionComposer};
use openfield_collect::egui_app::capture::{
    AudioArtifact, CaptureError, CaptureState, GatingError, ImportedAudio, SourceMode,
};
use openfield_collect::shared::fields;
use pretty_assertions::assert_eq;

use crate::common::*;

#[tokio::test]
async fn test_record_pause_resume_stop() {
    let (mut session, clock) = manual_session();
    let device = ScriptedDevice::new();

    assert_eq!(session.start(&device).await, Ok(true));
    assert_eq!(session.state(), CaptureState::Recording);
    assert_eq!(session.encoding(), Some(SCRIPTED_MIME));

    device.script.fragment(b"abc");
    clock.advance(2_000);
    session.pump();

    assert!(session.pause());
    assert!(device.script.is_paused());
    clock.advance(5_000);
    assert_eq!(session.elapsed_ms(), 2_000);

    assert!(session.resume());
    device.script.fragment(b"def");
    clock.advance(1_000);

    assert!(session.stop());
    assert_eq!(session.state(), CaptureState::StoppedWithAudio);
    assert_eq!(session.elapsed_ms(), 3_000);
    assert!(device.script.is_released());

    let artifact = session.artifact().unwrap();
    assert_matches!(artifact, AudioArtifact::Recorded(_));
    assert_eq!(artifact.size(), 6);
    assert_eq!(artifact.mime(), SCRIPTED_MIME);
    assert_eq!(artifact.to_data_url().unwrap(), "data:audio/webm;codecs=opus;base64,YWJjZGVm");
}

#[tokio::test]
async fn test_stop_without_fragments() {
    let (mut session, _clock) = manual_session();
    let device = ScriptedDevice::new();

    session.start(&device).await.unwrap();
    session.stop();

    assert_eq!(session.state(), CaptureState::StoppedEmpty);
    assert!(session.artifact().is_none());
    assert_eq!(session.status(), Some("No audio captured."));
}

#[tokio::test]
async fn test_start_ignored_unless_idle() {
    let (mut session, _clock) = manual_session();
    let device = ScriptedDevice::new();

    session.start(&device).await.unwrap();
    assert_eq!(session.start(&device).await, Ok(false));
    session.pause();
    assert_eq!(session.start(&device).await, Ok(false));
    assert_eq!(device.script.opened(), 1);
}

#[tokio::test]
async fn test_permission_denied_moves_to_error() {
    let (mut session, _clock) = manual_session();
    let device = ScriptedDevice::refusing(CaptureError::PermissionDenied);

    assert_eq!(session.start(&device).await, Err(CaptureError::PermissionDenied));
    assert_eq!(session.state(), CaptureState::Error);
    assert_eq!(session.error(), Some(&CaptureError::PermissionDenied));
}

#[tokio::test]
async fn test_stream_failure_moves_to_error() {
    let (mut session, _clock) = manual_session();
    let device = ScriptedDevice::new();

    session.start(&device).await.unwrap();
    device.script.fragment(b"abc");
    device.script.fail("device unplugged");
    session.pump();

    assert_eq!(session.state(), CaptureState::Error);
    assert!(session.artifact().is_none());
    assert!(device.script.is_released());
}

#[tokio::test]
async fn test_new_recording_replaces_previous() {
    let (mut session, _clock) = manual_session();
    let device = ScriptedDevice::new();

    session.start(&device).await.unwrap();
    device.script.fragment(b"old");
    session.stop();
    assert_eq!(session.artifact().unwrap().size(), 3);

    session.clear();
    session.start(&device).await.unwrap();
    device.script.fragment(b"newer");
    session.stop();
    assert_eq!(session.artifact().unwrap().size(), 5);
}

#[tokio::test]
async fn test_consent_revoked_stops_recording() {
    let (mut interview, _clock) = manual_interview();
    let device = ScriptedDevice::new();
    interview.set_mode(SourceMode::Audio);
    interview.set_consent(true);

    assert_eq!(interview.start_recording(&device).await, Ok(true));
    assert!(interview.audio_allowed());
    device.script.fragment(b"abc");

    interview.set_consent(false);
    assert!(!interview.session().state().is_active());
    assert_eq!(interview.capture_error(), Some(&CaptureError::ConsentRequired));
    assert_eq!(interview.check_submission(), Err(GatingError::ConsentMissing));
}

#[tokio::test]
async fn test_recording_requires_consent() {
    let (mut interview, _clock) = manual_interview();
    let device = ScriptedDevice::new();
    interview.set_mode(SourceMode::Audio);

    assert_eq!(
        interview.start_recording(&device).await,
        Err(CaptureError::ConsentRequired)
    );
    assert_eq!(device.script.opened(), 0);
    assert_eq!(interview.session().state(), CaptureState::Idle);
}

#[tokio::test]
async fn test_audio_gating_order() {
    let (mut interview, _clock) = manual_interview();
    let device = ScriptedDevice::new();
    interview.set_mode(SourceMode::Audio);

    assert_eq!(interview.check_submission(), Err(GatingError::ConsentMissing));
    interview.set_consent(true);
    assert_eq!(interview.check_submission(), Err(GatingError::AudioNotAllowed));

    interview.start_recording(&device).await.unwrap();
    assert_eq!(interview.check_submission(), Err(GatingError::RecordingActive));

    interview.session_mut().stop();
    assert_eq!(interview.check_submission(), Err(GatingError::ArtifactMissing));

    interview.clear_recording();
    interview.start_recording(&device).await.unwrap();
    device.script.fragment(b"abc");
    interview.session_mut().stop();
    assert_eq!(interview.check_submission(), Ok(()));
}

#[tokio::test]
async fn test_switch_to_text_discards_recording() {
    let (mut interview, _clock) = manual_interview();
    let device = ScriptedDevice::new();
    interview.set_mode(SourceMode::Audio);
    interview.set_consent(true);
    interview.start_recording(&device).await.unwrap();

    interview.set_mode(SourceMode::Text);
    assert_eq!(interview.session().state(), CaptureState::Idle);
    assert!(!interview.audio_allowed());
    assert!(device.script.is_released());
    assert_eq!(interview.check_submission(), Err(GatingError::NotesEmpty));
}

#[tokio::test]
async fn test_recorded_interview_composes_into_submission() {
    let (mut interview, _clock) = manual_interview();
    let device = ScriptedDevice::new();
    interview.set_mode(SourceMode::Audio);
    interview.set_consent(true);
    interview.start_recording(&device).await.unwrap();
    device.script.fragment(b"abc");
    interview.session_mut().stop();

    let form = FormSnapshot::new().with(fields::ENUMERATOR_NAME, "A");
    let composed = SubmissionComposer::new()
        .compose(&form, Some(&interview), Provenance::Offline)
        .unwrap();

    assert_eq!(composed.fields.text(fields::INTERVIEW_MODE), Some("AUDIO"));
    assert_eq!(composed.fields.text(fields::CONSENT_OBTAINED), Some("1"));
    assert_eq!(composed.fields.text(fields::AUDIO_FILE_NAME), Some("interview.webm"));
    assert_eq!(
        composed.fields.text(fields::AUDIO_DATA_URL),
        Some("data:audio/webm;codecs=opus;base64,YWJj")
    );
    assert_eq!(composed.fields.text(fields::SYNC_SOURCE), Some("offline_queue"));
}

#[tokio::test]
async fn test_import_stops_active_recording() {
    let (mut interview, _clock) = manual_interview();
    let device = ScriptedDevice::new();
    interview.set_mode(SourceMode::Audio);
    interview.set_consent(true);
    interview.start_recording(&device).await.unwrap();

    let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
    file.write_all(b"ID3").unwrap();
    interview.import_audio(ImportedAudio::from_path(file.path()).unwrap());

    assert!(device.script.is_released());
    assert_eq!(interview.session().state(), CaptureState::StoppedWithAudio);
    assert_eq!(interview.session().artifact().unwrap().mime(), "audio/mpeg");
    assert_eq!(interview.check_submission(), Ok(()));
}
