//! # Native Microphone Capture
//!
//! [`CaptureDevice`] over the default cpal input device. The cpal stream is
//! not `Send`, so it lives on a dedicated capture thread driven by commands;
//! samples are downmixed to mono 16-bit PCM and written as one WAV fragment
//! when the recording stops.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use hound::{WavSpec, WavWriter};
use tokio::sync::oneshot;

use crate::egui_app::capture::device::{CaptureDevice, CaptureError, CaptureEvent, CaptureStream};

/// Type of the fragments produced by this device
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// How long to wait for the input stream to come up
const OPEN_TIMEOUT: Duration = Duration::from_secs(3);

enum Command {
    Pause,
    Resume,
    Stop,
}

/// Default system microphone
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCaptureDevice;

impl CaptureDevice for NativeCaptureDevice {
    fn supports_type(&self, mime: &str) -> bool {
        mime == WAV_MIME_TYPE
    }

    async fn open(&self, _mime: Option<&str>) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        thread::Builder::new()
            .name("openfield-capture".to_string())
            .spawn(move || run_capture(command_rx, event_tx, ready_tx))
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        match tokio::time::timeout(OPEN_TIMEOUT, ready_rx).await {
            Ok(Ok(Ok(()))) => Ok(Box::new(NativeStream {
                commands: command_tx,
                events: event_rx,
                finished: false,
            })),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(CaptureError::Device("capture thread exited".to_string())),
            Err(_) => Err(CaptureError::Device("timed out opening the microphone".to_string())),
        }
    }
}

/// Handle to the capture thread. Dropping it releases the microphone.
struct NativeStream {
    commands: Sender<Command>,
    events: Receiver<CaptureEvent>,
    finished: bool,
}

impl CaptureStream for NativeStream {
    fn mime_type(&self) -> &str {
        WAV_MIME_TYPE
    }

    fn pause(&mut self) {
        let _ = self.commands.send(Command::Pause);
    }

    fn resume(&mut self) {
        let _ = self.commands.send(Command::Resume);
    }

    fn stop(&mut self) {
        let _ = self.commands.send(Command::Stop);
    }

    fn poll_event(&mut self) -> Option<CaptureEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => {
                self.finished = matches!(event, CaptureEvent::Finished | CaptureEvent::Failed(_));
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Some(CaptureEvent::Failed("capture thread stopped unexpectedly".to_string()))
            }
        }
    }
}

fn run_capture(
    commands: Receiver<Command>,
    events: Sender<CaptureEvent>,
    ready: oneshot::Sender<Result<(), CaptureError>>,
) {
    let samples = Arc::new(Mutex::new(Vec::<i16>::new()));
    let capturing = Arc::new(AtomicBool::new(true));

    let (stream, sample_rate) = match open_input(samples.clone(), capturing.clone(), events.clone()) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready.send(Err(CaptureError::Device(e.to_string())));
        return;
    }
    let _ = ready.send(Ok(()));

    let mut stop_requested = false;
    while let Ok(command) = commands.recv() {
        match command {
            Command::Pause => {
                capturing.store(false, Ordering::SeqCst);
                if let Err(e) = stream.pause() {
                    tracing::debug!("Input stream pause unsupported: {}", e);
                }
            }
            Command::Resume => {
                capturing.store(true, Ordering::SeqCst);
                if let Err(e) = stream.play() {
                    tracing::warn!("Failed to resume input stream: {}", e);
                }
            }
            Command::Stop => {
                stop_requested = true;
                break;
            }
        }
    }
    drop(stream);

    if !stop_requested {
        tracing::debug!("Capture handle dropped, microphone released");
        return;
    }

    let recorded = match samples.lock() {
        Ok(mut buffer) => std::mem::take(&mut *buffer),
        Err(_) => Vec::new(),
    };
    if !recorded.is_empty() {
        match encode_wav(&recorded, sample_rate) {
            Ok(bytes) => {
                let _ = events.send(CaptureEvent::Fragment(bytes));
            }
            Err(e) => {
                let _ = events.send(CaptureEvent::Failed(format!("WAV encoding failed: {}", e)));
                return;
            }
        }
    }
    let _ = events.send(CaptureEvent::Finished);
}

fn open_input(
    samples: Arc<Mutex<Vec<i16>>>,
    capturing: Arc<AtomicBool>,
    events: Sender<CaptureEvent>,
) -> Result<(cpal::Stream, u32), CaptureError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(CaptureError::Unsupported)?;
    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::Device(e.to_string()))?;
    let config: StreamConfig = supported.config();
    let sample_rate = config.sample_rate.0;

    tracing::info!(
        device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
        sample_rate,
        channels = config.channels,
        "Opening input device"
    );

    let stream = match supported.sample_format() {
        SampleFormat::F32 => build_input_stream::<f32>(&device, &config, samples, capturing, events)?,
        SampleFormat::I16 => build_input_stream::<i16>(&device, &config, samples, capturing, events)?,
        SampleFormat::U16 => build_input_stream::<u16>(&device, &config, samples, capturing, events)?,
        other => {
            tracing::warn!("Unsupported sample format: {:?}", other);
            return Err(CaptureError::Unsupported);
        }
    };
    Ok((stream, sample_rate))
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<i16>>>,
    capturing: Arc<AtomicBool>,
    events: Sender<CaptureEvent>,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let err_fn = move |err: cpal::StreamError| {
        let _ = events.send(CaptureEvent::Failed(err.to_string()));
    };

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if !capturing.load(Ordering::Relaxed) {
                    return;
                }
                let Ok(mut buffer) = samples.lock() else {
                    return;
                };
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|sample| sample.to_sample::<f32>()).sum();
                    let mono = (sum / channels as f32).clamp(-1.0, 1.0);
                    buffer.push((mono * i16::MAX as f32) as i16);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| match e {
            BuildStreamError::DeviceNotAvailable => CaptureError::DeviceBusy,
            BuildStreamError::StreamConfigNotSupported => CaptureError::Unsupported,
            other => CaptureError::Device(other.to_string()),
        })
}

/// Mono 16-bit PCM as a WAV file
fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
