use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::watch;

use crate::egui_app::bridge::{BridgeError, FormSnapshot, Provenance, SubmissionComposer};
use crate::egui_app::capture::{
    CaptureState, GatingError, ImportedAudio, InterviewForm, PlatformCaptureDevice, SourceMode,
    SystemClock,
};
use crate::egui_app::offline::{self, LocalOfflineManager, QueueEntry, QueueSnapshot, SubmitOutcome};
use crate::egui_app::sync::{self, Connectivity, DrainReport};
use crate::egui_app::views::sync_center::{SyncCenter, SyncCenterAction, SyncCenterView};
use crate::egui_app::Config;
use crate::shared::fields;

/// Banner shown under the form after a submit or a drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Central application state shared across egui views.
pub struct AppState {
    pub config: Config,
    runtime: Runtime,
    offline: Option<Arc<LocalOfflineManager>>,
    queue_rx: Option<watch::Receiver<QueueSnapshot>>,
    connectivity_rx: Option<watch::Receiver<Connectivity>>,
    pub queue_entries: Vec<QueueEntry>,
    pub is_online: bool,
    pub sync_center: SyncCenter,

    device: PlatformCaptureDevice,
    composer: SubmissionComposer,
    pub interview: InterviewForm,

    pub enumerator_input: String,
    /// Index into the configured facilities
    pub facility_choice: Option<usize>,
    pub facility_name_input: String,
    pub import_path_input: String,

    pub gating_error: Option<GatingError>,
    pub notice: Option<Notice>,
    pub startup_error: Option<String>,
    submit_result: Option<Receiver<SubmitOutcome>>,
    drain_result: Option<Receiver<Result<DrainReport, String>>>,
    pub last_drain: Option<DrainReport>,
}

impl AppState {
    pub fn new(config: Config) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("openfield-sync")
            .enable_all()
            .build()?;

        let mut startup_error = None;
        let offline = match runtime.block_on(offline::open(&config.app)) {
            Ok(manager) => manager.map(Arc::new),
            Err(e) => {
                tracing::error!("Offline queue unavailable: {}", e);
                startup_error = Some(format!("Offline queue unavailable: {}", e));
                None
            }
        };

        let queue_rx = offline.as_ref().map(|manager| manager.subscribe_queue());
        let connectivity_rx = offline.as_ref().map(|manager| manager.subscribe_connectivity());
        let queue_entries = queue_rx
            .as_ref()
            .map(|rx| rx.borrow().entries.clone())
            .unwrap_or_default();

        if let Some(manager) = &offline {
            spawn_probe_loop(&runtime, Arc::clone(manager), config.app.probe_interval);
        }

        tracing::info!(offline_enabled = offline.is_some(), "AppState initialized");

        Ok(Self {
            sync_center: SyncCenter::new(config.app.sync_center_url.clone()),
            config,
            runtime,
            offline,
            queue_rx,
            connectivity_rx,
            queue_entries,
            is_online: false,
            device: PlatformCaptureDevice::default(),
            composer: SubmissionComposer::new(),
            interview: InterviewForm::new(Arc::new(SystemClock::new())),
            enumerator_input: String::new(),
            facility_choice: None,
            facility_name_input: String::new(),
            import_path_input: String::new(),
            gating_error: None,
            notice: None,
            startup_error,
            submit_result: None,
            drain_result: None,
            last_drain: None,
        })
    }

    pub fn offline_enabled(&self) -> bool {
        self.offline.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_result.is_some()
    }

    pub fn is_draining(&self) -> bool {
        self.drain_result.is_some()
    }

    /// Poll background results and capture events. Called once per frame.
    pub fn update(&mut self) {
        self.refresh_queue();
        self.check_submit_result();
        self.check_drain_result();
        self.interview.session_mut().pump();
    }

    fn refresh_queue(&mut self) {
        if let Some(rx) = self.queue_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                self.queue_entries = rx.borrow_and_update().entries.clone();
            }
        }
        if let Some(rx) = self.connectivity_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                let status = *rx.borrow_and_update();
                tracing::info!(status = status.label(), "Connectivity changed");
                self.is_online = status.is_online();
            }
        }
    }

    /// Derived sync center panel, `None` when hidden
    pub fn sync_center_view(&self) -> Option<SyncCenterView> {
        self.offline.as_ref()?;
        self.sync_center
            .view(&self.queue_entries, self.is_online, chrono::Utc::now())
    }

    pub fn handle_sync_center_action(&mut self, action: SyncCenterAction) {
        match action {
            SyncCenterAction::SyncNow => self.sync_now(),
            SyncCenterAction::ClearQueue => self.clear_queue(),
        }
    }

    /// Snapshot of the visible form fields in form order
    pub fn form_snapshot(&self) -> FormSnapshot {
        let mut snapshot = FormSnapshot::new().with(fields::ENUMERATOR_NAME, self.enumerator_input.trim());

        if let Some(option) = self
            .facility_choice
            .and_then(|index| self.config.facilities().get(index))
        {
            snapshot.push(fields::FACILITY_ID, option.id.clone());
            snapshot = snapshot.with_facility_label(option.label.clone());
        }
        if !self.facility_name_input.trim().is_empty() {
            snapshot.push(fields::FACILITY_NAME, self.facility_name_input.trim());
        }
        snapshot
    }

    pub fn handle_submit(&mut self) {
        if self.is_submitting() {
            return;
        }
        self.gating_error = None;
        self.notice = None;

        let Some(manager) = self.offline.clone() else {
            self.notice = Some(Notice::error("No sync endpoint configured"));
            return;
        };

        let composed = match self
            .composer
            .compose(&self.form_snapshot(), Some(&self.interview), Provenance::Direct)
        {
            Ok(composed) => composed,
            Err(BridgeError::Gating(e)) => {
                tracing::debug!(field = e.field(), "Submission blocked: {}", e);
                self.gating_error = Some(e);
                return;
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.to_string()));
                return;
            }
        };

        let (tx, rx) = channel();
        self.runtime.spawn(async move {
            let outcome = manager.submit(composed).await;
            let _ = tx.send(outcome);
        });
        self.submit_result = Some(rx);
    }

    fn check_submit_result(&mut self) {
        let Some(rx) = &self.submit_result else {
            return;
        };
        let Ok(outcome) = rx.try_recv() else {
            return;
        };
        self.submit_result = None;

        match outcome {
            SubmitOutcome::Delivered => {
                self.notice = Some(Notice::info("Submission sent"));
                self.reset_form();
            }
            SubmitOutcome::Queued(entry) => {
                tracing::info!(id = %entry.id, "Submission saved offline");
                self.notice = Some(Notice::info("Saved offline. It will sync when you are back online."));
                self.reset_form();
            }
        }
    }

    fn reset_form(&mut self) {
        self.composer.renew();
        self.interview.reset();
        self.facility_choice = None;
        self.facility_name_input.clear();
        self.import_path_input.clear();
        self.gating_error = None;
    }

    pub fn sync_now(&mut self) {
        if self.is_draining() {
            return;
        }
        let Some(manager) = self.offline.clone() else {
            return;
        };

        let (tx, rx) = channel();
        self.runtime.spawn(async move {
            let result = manager.sync_now().await.map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
        self.drain_result = Some(rx);
    }

    fn check_drain_result(&mut self) {
        let Some(rx) = &self.drain_result else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.drain_result = None;

        match result {
            Ok(report) => {
                if report.failed > 0 {
                    self.notice = Some(Notice::error(format!(
                        "{} submission(s) failed to sync",
                        report.failed
                    )));
                } else if report.delivered > 0 {
                    self.notice = Some(Notice::info(format!("{} submission(s) synced", report.delivered)));
                }
                self.last_drain = Some(report);
            }
            Err(e) => self.notice = Some(Notice::error(e)),
        }
    }

    pub fn clear_queue(&mut self) {
        let Some(manager) = self.offline.clone() else {
            return;
        };
        self.runtime.spawn(async move {
            manager.clear_queue().await;
        });
    }

    pub fn set_interview_mode(&mut self, mode: SourceMode) {
        self.interview.set_mode(mode);
        self.gating_error = None;
    }

    pub fn start_recording(&mut self) {
        self.gating_error = None;
        let result = self
            .runtime
            .block_on(self.interview.start_recording(&self.device));
        if let Err(e) = result {
            tracing::warn!("Recording not started: {}", e);
        }
    }

    pub fn pause_recording(&mut self) {
        self.interview.session_mut().pause();
    }

    pub fn resume_recording(&mut self) {
        self.interview.session_mut().resume();
    }

    pub fn stop_recording(&mut self) {
        self.interview.session_mut().stop();
    }

    pub fn clear_recording(&mut self) {
        self.interview.clear_recording();
    }

    /// Import the file named in the path input
    pub fn import_from_input(&mut self) {
        let path = self.import_path_input.trim();
        if path.is_empty() {
            return;
        }
        let path = PathBuf::from(path);
        self.import_audio(path);
    }

    pub fn import_audio(&mut self, path: PathBuf) {
        match ImportedAudio::from_path(&path) {
            Ok(file) => {
                tracing::info!(path = %path.display(), "Interview audio imported");
                self.interview.import_audio(file);
                self.gating_error = None;
            }
            Err(e) => {
                self.notice = Some(Notice::error(format!("Could not read {}: {}", path.display(), e)));
            }
        }
    }

    /// Whether the UI needs a timed repaint for the elapsed counter
    pub fn needs_tick(&self) -> bool {
        self.interview.session().needs_tick()
            || self.interview.session().state() == CaptureState::Stopping
            || self.is_submitting()
            || self.is_draining()
    }
}

/// Probe the sync endpoint periodically and feed the connectivity flag.
/// Regaining connectivity drains the queue inside `set_online`.
fn spawn_probe_loop(runtime: &Runtime, manager: Arc<LocalOfflineManager>, interval: std::time::Duration) {
    runtime.spawn(async move {
        let client = manager.engine().transport().http_client().clone();
        let url = manager.engine().transport().url().clone();
        loop {
            let status = sync::probe(&client, &url).await;
            if let Some(report) = manager.set_online(status.is_online()).await {
                tracing::info!(
                    delivered = report.delivered,
                    failed = report.failed,
                    "Queue drained after reconnect"
                );
            }
            tokio::time::sleep(interval).await;
        }
    });
}
