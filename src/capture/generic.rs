//! Generic capture backend
//!
//! A capture-service stand-in for hosts without a platform capture
//! integration: it delivers paced blank NV12 video frames, silent system
//! audio, and real microphone input through cpal. Every delivery context
//! runs concurrently with the others and pushes into the same router, so
//! the whole recorder is exercisable end-to-end even where no screen
//! grabber is wired up; the frames just have nothing on them.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use log::{info, warn};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::audio::MicCapture;
use super::router::SampleRouter;
use super::source::{CaptureSource, CaptureSpec, DisplayHandle, enumerate_displays};
use crate::pipeline::types::{SampleBuffer, StreamKind, Timestamp};

/// Silence chunk cadence for the system-audio context
const AUDIO_CHUNK_MILLIS: u64 = 20;

pub struct GenericCapture {
    cancel_token: Option<CancellationToken>,
}

impl GenericCapture {
    pub fn new() -> Self {
        Self { cancel_token: None }
    }

    /// A black NV12 frame: zero luma plus neutral chroma
    fn black_nv12(width: u32, height: u32) -> Bytes {
        let luma = vec![0u8; (width * height) as usize];
        let chroma = vec![128u8; (width * height / 2) as usize];
        let mut data = luma;
        data.extend_from_slice(&chroma);
        Bytes::from(data)
    }
}

impl Default for GenericCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureSource for GenericCapture {
    fn list_sources(&self) -> Result<Vec<DisplayHandle>> {
        enumerate_displays()
    }

    async fn start_capture(&mut self, spec: CaptureSpec, router: SampleRouter) -> Result<()> {
        if self.cancel_token.is_some() {
            return Err(anyhow!("Capture already running"));
        }

        let cancel = CancellationToken::new();
        self.cancel_token = Some(cancel.clone());

        let start = Instant::now();

        // Video delivery context
        {
            let router = router.clone();
            let cancel = cancel.clone();
            let width = spec.region.width;
            let height = spec.region.height;
            let interval = spec.frame_interval;
            let frame = Self::black_nv12(width, height);

            tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() || router.is_closed() {
                        break;
                    }

                    let pts = Timestamp::from_duration(start.elapsed());
                    router.route(SampleBuffer::video(frame.clone(), pts, width, height, true));

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
            });
        }

        // System audio delivery context. Loopback capture needs a
        // platform service, so this backend delivers silence at the
        // requested format.
        if spec.capture_audio {
            let router = router.clone();
            let cancel = cancel.clone();
            let sample_rate = spec.sample_rate;
            let channels = spec.channels;
            let chunk_frames = (sample_rate as u64 * AUDIO_CHUNK_MILLIS / 1000) as usize;
            let silence =
                Bytes::from(vec![0u8; chunk_frames * channels as usize * size_of::<f32>()]);

            tokio::spawn(async move {
                let mut ticker =
                    tokio::time::interval(std::time::Duration::from_millis(AUDIO_CHUNK_MILLIS));
                loop {
                    if cancel.is_cancelled() || router.is_closed() {
                        break;
                    }

                    let pts = Timestamp::from_duration(start.elapsed());
                    router.route(SampleBuffer::audio(
                        StreamKind::SystemAudio,
                        silence.clone(),
                        pts,
                        sample_rate,
                        channels,
                    ));

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                }
            });
        }

        // Microphone delivery context
        if spec.capture_microphone {
            if let Err(e) = MicCapture::start(cancel.clone(), router.clone(), start) {
                warn!("Microphone unavailable, recording continues without it: {e}");
            }
        }

        info!(
            "Generic capture started: {}x{} on {} (audio: {}, mic: {})",
            spec.region.width,
            spec.region.height,
            spec.display,
            spec.capture_audio,
            spec.capture_microphone
        );

        Ok(())
    }

    async fn stop_capture(&mut self) -> Result<()> {
        if let Some(cancel) = self.cancel_token.take() {
            cancel.cancel();
            info!("Generic capture stopped");
        }
        Ok(())
    }
}
