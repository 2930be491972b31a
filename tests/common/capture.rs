//! Scripted capture device
//!
//! The test drives what the "microphone" produces through a [`MicScript`]
//! handle shared with every stream the device opens.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use openfield_collect::egui_app::capture::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureSession, CaptureStream, InterviewForm,
    ManualClock,
};

pub const SCRIPTED_MIME: &str = "audio/webm;codecs=opus";

#[derive(Debug, Default)]
pub struct MicScript {
    events: Mutex<VecDeque<CaptureEvent>>,
    opened: AtomicUsize,
    paused: AtomicBool,
    released: AtomicBool,
}

impl MicScript {
    /// Queue encoded bytes as the next fragment
    pub fn fragment(&self, bytes: &[u8]) {
        self.events
            .lock()
            .unwrap()
            .push_back(CaptureEvent::Fragment(bytes.to_vec()));
    }

    pub fn fail(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push_back(CaptureEvent::Failed(message.to_string()));
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

struct ScriptedStream(Arc<MicScript>);

impl CaptureStream for ScriptedStream {
    fn mime_type(&self) -> &str {
        SCRIPTED_MIME
    }

    fn pause(&mut self) {
        self.0.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.0.paused.store(false, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.0.events.lock().unwrap().push_back(CaptureEvent::Finished);
    }

    fn poll_event(&mut self) -> Option<CaptureEvent> {
        self.0.events.lock().unwrap().pop_front()
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.0.released.store(true, Ordering::SeqCst);
    }
}

/// Device whose streams replay a [`MicScript`]
#[derive(Debug, Default)]
pub struct ScriptedDevice {
    pub script: Arc<MicScript>,
    /// Error returned by `open` instead of a stream
    pub refuse_with: Option<CaptureError>,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(error: CaptureError) -> Self {
        Self {
            refuse_with: Some(error),
            ..Self::default()
        }
    }
}

impl CaptureDevice for ScriptedDevice {
    fn supports_type(&self, mime: &str) -> bool {
        mime == SCRIPTED_MIME
    }

    async fn open(&self, _mime: Option<&str>) -> Result<Box<dyn CaptureStream>, CaptureError> {
        if let Some(error) = &self.refuse_with {
            return Err(error.clone());
        }
        self.script.opened.fetch_add(1, Ordering::SeqCst);
        self.script.released.store(false, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream(Arc::clone(&self.script))))
    }
}

pub fn manual_session() -> (CaptureSession, ManualClock) {
    let clock = ManualClock::new();
    (CaptureSession::new(Arc::new(clock.clone())), clock)
}

pub fn manual_interview() -> (InterviewForm, ManualClock) {
    let clock = ManualClock::new();
    (InterviewForm::new(Arc::new(clock.clone())), clock)
}
