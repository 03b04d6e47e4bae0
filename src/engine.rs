//! Recording orchestrator
//!
//! Owns the configuration and the start/stop lifecycle. `start` wires
//! writer, adapters, session task, and capture source together; `stop`
//! unwinds them in order, relocates the finished file into the output
//! directory, and optionally hands it to the GIF transcoder. Nothing is
//! thrown past the stop boundary: every internal error becomes a status
//! line plus a structured code in the report.

use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::capture::{CaptureSource, DisplayHandle, SampleRouter};
use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::pipeline::session::{RecordingSession, SESSION_CHANNEL_CAPACITY, SessionParts};
use crate::pipeline::stats::SessionStats;
use crate::pipeline::state::SessionState;
use crate::pipeline::types::StreamKind;
use crate::pipeline::writer::{ContainerWriter, TrackSpec};
use crate::transcode;
use crate::utils::path::{scratch_capture_path, shorten_path};
use crate::utils::status::StatusFeed;

/// The finalized recording plus session counters
#[derive(Debug, Clone, Serialize)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub gif_path: Option<PathBuf>,
    pub video_frames: u64,
    pub audio_samples: u64,
    pub mic_samples: u64,
}

/// Result of one `stop` call
///
/// `error` carries the structured code for programmatic callers; the
/// status string is what a human sees either way.
#[derive(Debug, Serialize)]
pub struct StopReport {
    pub status: String,
    pub artifact: Option<OutputArtifact>,
    pub error: Option<RecorderError>,
}

struct ActiveSession {
    writer: ContainerWriter,
    router: SampleRouter,
    cancel: CancellationToken,
    task: JoinHandle<SessionParts>,
    stats: Arc<SessionStats>,
}

pub struct RecorderEngine {
    config: RecorderConfig,
    capture: Box<dyn CaptureSource>,
    state: SessionState,
    status: StatusFeed,
    session: Option<ActiveSession>,
}

impl RecorderEngine {
    pub fn new(config: RecorderConfig, capture: Box<dyn CaptureSource>) -> Self {
        Self {
            config,
            capture,
            state: SessionState::NotStarted,
            status: StatusFeed::default(),
            session: None,
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Status feed for front-ends: snapshot now, subscribe for changes
    pub fn status(&self) -> StatusFeed {
        self.status.clone()
    }

    /// Live counters of the active session, if any
    pub fn stats(&self) -> Option<Arc<SessionStats>> {
        self.session.as_ref().map(|s| s.stats.clone())
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_active()
    }

    /// Enumerate capturable displays through the capture source
    pub fn list_displays(&self) -> Result<Vec<DisplayHandle>, RecorderError> {
        self.capture.list_sources().map_err(|e| {
            self.status.set(format!("Failed to get displays: {e}"));
            RecorderError::Enumeration(e.to_string())
        })
    }

    /// Start a recording session.
    ///
    /// On failure the partially constructed writer and adapters are
    /// discarded, the scratch file is removed, and the session state
    /// stays NotStarted.
    pub async fn start(&mut self) -> Result<(), RecorderError> {
        if self.session.is_some() || !self.state.can_transition_to(&SessionState::Active) {
            return Err(RecorderError::Start(format!(
                "cannot start while session is {}",
                self.state
            )));
        }

        let display = match &self.config.display {
            Some(display) => display.clone(),
            None => {
                let displays = self.list_displays().map_err(|e| {
                    RecorderError::Start(format!("no display available: {e}"))
                })?;
                displays
                    .first()
                    .cloned()
                    .ok_or_else(|| RecorderError::Start("no display available".into()))?
            }
        };

        info!("Starting recording for display {}", display);

        let spec = self.config.resolve(&display);

        let mut tracks = vec![TrackSpec::video(spec.region.width, spec.region.height)];
        if self.config.record_audio {
            tracks.push(TrackSpec::system_audio());
        }
        if self.config.record_microphone {
            tracks.push(TrackSpec::microphone());
        }

        let scratch = scratch_capture_path(chrono::Utc::now().timestamp());
        let stats = Arc::new(SessionStats::new());

        let (writer, adapters) = match ContainerWriter::open(&scratch, &tracks, stats.clone()) {
            Ok(opened) => opened,
            Err(e) => {
                self.status.set(format!("Error: {e}"));
                return Err(RecorderError::Start(e.to_string()));
            }
        };

        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let router = SampleRouter::new(tx, stats.clone());
        let cancel = CancellationToken::new();
        let task = RecordingSession::spawn(
            rx,
            cancel.clone(),
            writer.handle(),
            adapters,
            stats.clone(),
        );

        if let Err(e) = self.capture.start_capture(spec, router.clone()).await {
            // Unwind: nothing of this session may stay referenced
            cancel.cancel();
            drop(router);
            if let Ok(parts) = task.await {
                drop(parts);
            }
            let scratch = writer.path().to_path_buf();
            drop(writer);
            let _ = std::fs::remove_file(&scratch);

            self.status.set(format!("Error: {e}"));
            return Err(RecorderError::Start(e.to_string()));
        }

        self.session = Some(ActiveSession {
            writer,
            router,
            cancel,
            task,
            stats,
        });
        self.state = SessionState::Active;
        self.status.set("Recording...");
        Ok(())
    }

    /// Stop the session, finalize the container, relocate the file, and
    /// optionally convert it to a GIF.
    ///
    /// Never returns an error as such; problems are reported through the
    /// status string and the structured error in the report. Calling stop
    /// without a session is a no-op.
    pub async fn stop(&mut self) -> StopReport {
        let Some(active) = self.session.take() else {
            return StopReport {
                status: self.status.snapshot(),
                artifact: None,
                error: None,
            };
        };

        info!("Stopping recording...");
        self.state = SessionState::Stopping;

        // Halt delivery first, tolerating an already-stopped source
        if let Err(e) = self.capture.stop_capture().await {
            warn!("Stop capture reported an error (likely already stopped): {e}");
        }

        // Cancellation-first: samples still in flight are dropped even
        // though the source may keep delivering for a moment
        active.cancel.cancel();
        drop(active.router);

        let mut adapters = match active.task.await {
            Ok(parts) => parts.adapters,
            Err(e) => {
                error!("Session task failed: {e}");
                Vec::new()
            }
        };

        let mut counts = [0u64; 3];
        for adapter in &mut adapters {
            adapter.finish();
            counts[adapter.kind().index()] = adapter.accepted();
        }
        // Release the muxer references held by the track inputs so the
        // writer can close the container exclusively
        drop(adapters);

        info!(
            "Capture finished. Frames: {}, Audio: {}, Mic: {}",
            counts[StreamKind::Video.index()],
            counts[StreamKind::SystemAudio.index()],
            counts[StreamKind::Microphone.index()]
        );
        info!("Session summary: {}", active.stats.summary());

        let finalize_result = active.writer.finalize().await;
        self.state = SessionState::Finalized;

        match finalize_result {
            Ok(scratch) => self.relocate_and_transcode(scratch, counts).await,
            Err(e) => {
                self.status.set(format!("Failed to save file: {e}"));
                StopReport {
                    status: self.status.snapshot(),
                    artifact: None,
                    error: Some(RecorderError::Finalize(e.to_string())),
                }
            }
        }
    }

    async fn relocate_and_transcode(&mut self, scratch: PathBuf, counts: [u64; 3]) -> StopReport {
        let mut artifact = OutputArtifact {
            path: scratch.clone(),
            gif_path: None,
            video_frames: counts[StreamKind::Video.index()],
            audio_samples: counts[StreamKind::SystemAudio.index()],
            mic_samples: counts[StreamKind::Microphone.index()],
        };

        let final_path = match relocate(&scratch, &self.config.output_dir) {
            Ok(path) => path,
            Err(e) => {
                // The recording survives at the scratch path
                self.status.set(format!(
                    "Failed to save file: {e} (recording left at {})",
                    scratch.display()
                ));
                return StopReport {
                    status: self.status.snapshot(),
                    artifact: Some(artifact),
                    error: Some(RecorderError::Relocation(e.to_string())),
                };
            }
        };

        artifact.path = final_path.clone();
        self.status.set(format!(
            "Video saved to {}",
            shorten_path(&self.config.output_dir)
        ));

        if self.config.convert_to_gif {
            self.status.set("Converting to GIF...");
            match transcode::convert_to_gif(&final_path, self.config.gif_fps).await {
                Ok(gif) => {
                    artifact.gif_path = Some(gif);
                    self.status.set(format!(
                        "Video and GIF saved to {}",
                        shorten_path(&self.config.output_dir)
                    ));
                }
                Err(e) => {
                    warn!("GIF conversion failed: {e}");
                    self.status
                        .set(format!("Video saved, GIF conversion failed: {e}"));
                    return StopReport {
                        status: self.status.snapshot(),
                        artifact: Some(artifact),
                        error: Some(RecorderError::Transcode(e.to_string())),
                    };
                }
            }
        }

        StopReport {
            status: self.status.snapshot(),
            artifact: Some(artifact),
            error: None,
        }
    }
}

/// Move the finished recording into the output directory, overwriting
/// any same-named prior artifact. Falls back to copy-and-remove when the
/// rename crosses filesystems.
fn relocate(scratch: &Path, output_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let file_name = scratch.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "scratch path has no file name",
        )
    })?;
    let dest = output_dir.join(file_name);

    if dest.exists() {
        std::fs::remove_file(&dest)?;
    }

    match std::fs::rename(scratch, &dest) {
        Ok(()) => Ok(dest),
        Err(_) => {
            std::fs::copy(scratch, &dest)?;
            std::fs::remove_file(scratch)?;
            Ok(dest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::time::Duration;

    use crate::capture::{CaptureSpec, SampleRouter};
    use crate::config::CropInput;
    use crate::pipeline::types::{SampleBuffer, Timestamp};

    fn test_display() -> DisplayHandle {
        DisplayHandle {
            id: 1,
            name: "Test".into(),
            width: 1920,
            height: 1080,
            scale_factor: 1.0,
        }
    }

    /// Capture source that never delivers anything
    struct NullCapture;

    #[async_trait]
    impl CaptureSource for NullCapture {
        fn list_sources(&self) -> Result<Vec<DisplayHandle>> {
            Ok(vec![test_display()])
        }

        async fn start_capture(&mut self, _spec: CaptureSpec, _router: SampleRouter) -> Result<()> {
            Ok(())
        }

        async fn stop_capture(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Capture source that delivers a fixed script of samples on start
    struct ScriptedCapture {
        samples: Vec<SampleBuffer>,
    }

    #[async_trait]
    impl CaptureSource for ScriptedCapture {
        fn list_sources(&self) -> Result<Vec<DisplayHandle>> {
            Ok(vec![test_display()])
        }

        async fn start_capture(&mut self, _spec: CaptureSpec, router: SampleRouter) -> Result<()> {
            for sample in self.samples.drain(..) {
                router.route(sample);
            }
            Ok(())
        }

        async fn stop_capture(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn config_with_dir(dir: &Path) -> RecorderConfig {
        RecorderConfig {
            display: Some(test_display()),
            output_dir: dir.to_path_buf(),
            record_microphone: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stop_without_start_completes_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine =
            RecorderEngine::new(config_with_dir(dir.path()), Box::new(NullCapture));

        let report = engine.stop().await;

        assert!(report.error.is_none());
        assert!(report.artifact.is_none());
        // No output file was produced
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(engine.state(), SessionState::NotStarted);
    }

    #[tokio::test]
    async fn test_relocate_moves_and_overwrites() {
        let scratch_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        let scratch = scratch_dir.path().join("capture_42.mp4");
        std::fs::write(&scratch, b"new recording").unwrap();

        // A prior artifact with the same name gets overwritten
        let prior = out_dir.path().join("capture_42.mp4");
        std::fs::write(&prior, b"old recording").unwrap();

        let dest = relocate(&scratch, out_dir.path()).unwrap();

        assert_eq!(dest, prior);
        assert_eq!(std::fs::read(&dest).unwrap(), b"new recording");
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_relocate_creates_output_dir() {
        let scratch_dir = tempfile::tempdir().unwrap();
        let out_root = tempfile::tempdir().unwrap();
        let out_dir = out_root.path().join("nested").join("dir");

        let scratch = scratch_dir.path().join("capture_7.mp4");
        std::fs::write(&scratch, b"data").unwrap();

        let dest = relocate(&scratch, &out_dir).unwrap();
        assert!(dest.exists());
        assert!(dest.starts_with(&out_dir));
    }

    /// End-to-end: 100 image-bearing video samples and 50 audio samples,
    /// audio on, mic off. Expects full acceptance, a finalized file in
    /// the output directory, and no mic track.
    #[tokio::test]
    async fn test_end_to_end_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_dir(dir.path());
        config.record_audio = true;
        config.crop = CropInput::default();

        // One black 1920x1080 NV12 frame, shared by all video samples
        let frame = {
            let mut data = vec![0u8; 1920 * 1080];
            data.extend_from_slice(&vec![128u8; 1920 * 1080 / 2]);
            Bytes::from(data)
        };
        // 20 ms of stereo silence at 48 kHz
        let audio_chunk = Bytes::from(vec![0u8; 960 * 2 * 4]);

        let mut samples = Vec::new();
        for i in 0..100i64 {
            samples.push(SampleBuffer::video(
                frame.clone(),
                Timestamp::from_micros(i * 16_666),
                1920,
                1080,
                true,
            ));
        }
        for i in 0..50i64 {
            samples.push(SampleBuffer::audio(
                StreamKind::SystemAudio,
                audio_chunk.clone(),
                Timestamp::from_micros(1_000 + i * 20_000),
                48_000,
                2,
            ));
        }

        let mut engine =
            RecorderEngine::new(config, Box::new(ScriptedCapture { samples }));

        match engine.start().await {
            Ok(()) => {}
            Err(e) => {
                // Host without an H.264/AAC capable FFmpeg build; the
                // pipeline itself is covered by the session tests.
                eprintln!("skipping end-to-end test: {e}");
                return;
            }
        }

        assert!(engine.is_recording());
        assert_eq!(engine.status().snapshot(), "Recording...");

        // Wait for the session task to drain the scripted samples
        let stats = engine.stats().unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(60);
        while (stats.accepted(StreamKind::Video) < 100
            || stats.accepted(StreamKind::SystemAudio) < 50)
            && std::time::Instant::now() < deadline
        {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let report = engine.stop().await;

        assert!(report.error.is_none(), "stop error: {:?}", report.error);
        let artifact = report.artifact.expect("artifact missing");
        assert_eq!(artifact.video_frames, 100);
        assert_eq!(artifact.audio_samples, 50);
        assert_eq!(artifact.mic_samples, 0);

        assert!(artifact.path.exists());
        assert!(artifact.path.starts_with(dir.path()));
        let name = artifact.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("capture_") && name.ends_with(".mp4"));

        assert_eq!(engine.state(), SessionState::Finalized);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine =
            RecorderEngine::new(config_with_dir(dir.path()), Box::new(NullCapture));

        if engine.start().await.is_err() {
            // No encoder on this host
            return;
        }

        let second = engine.start().await;
        assert!(matches!(second, Err(RecorderError::Start(_))));

        let report = engine.stop().await;
        // Nothing was delivered, so the container is empty and finalize
        // reports it
        assert!(matches!(report.error, Some(RecorderError::Finalize(_))));
    }
}
