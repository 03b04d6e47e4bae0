//! Container writer: MP4 muxing with H.264 video and AAC audio tracks
//!
//! The writer owns the output file and the finalize lifecycle. Each track
//! gets an encoder input implementing [`EncoderInput`], so the adapters
//! observe one uniform backpressure contract regardless of backend. All
//! sample timestamps are rebased against the session origin published
//! through the [`WriterHandle`].

use ac_ffmpeg::codec::audio::frame::get_sample_format;
use ac_ffmpeg::codec::audio::{AudioEncoder, AudioFrameMut};
use ac_ffmpeg::codec::video::{self, VideoEncoder};
use ac_ffmpeg::codec::{CodecParameters, Encoder};
use ac_ffmpeg::format::io::IO;
use ac_ffmpeg::format::muxer::{Muxer, OutputFormat};
use ac_ffmpeg::time::{TimeBase, Timestamp as CodecTimestamp};
use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use super::adapter::{EncoderInput, WriterAdapter};
use super::stats::SessionStats;
use super::types::{SampleBuffer, StreamKind, Timestamp};

/// Encoder fallback chain: try the common H.264 encoders in order.
/// Tuned for real-time recording to disk rather than streaming.
const ENCODER_CHAIN: &[(&str, &[(&str, &str)])] = &[
    // libx264 - CPU encoder, the usual FFmpeg default
    (
        "libx264",
        &[
            ("profile", "high"),
            ("preset", "fast"),
            ("tune", "zerolatency"),
            ("crf", "21"),
            ("threads", "0"),
        ],
    ),
    // OpenH264 - present in builds without x264 (e.g. conda FFmpeg)
    ("libopenh264", &[("allow_skip_frames", "0")]),
    // NVIDIA NVENC
    ("h264_nvenc", &[("preset", "p4"), ("profile", "high")]),
    // Intel Quick Sync Video
    ("h264_qsv", &[("preset", "fast")]),
];

const VIDEO_TIME_BASE: (i32, i32) = (1, 90_000);

/// Errors opening the container
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("failed to create output file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Container writer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Configuring,
    Writing,
    Finalizing,
    Failed,
    Closed,
}

impl WriterState {
    /// Check if this state transition is valid
    pub fn can_transition_to(&self, target: &WriterState) -> bool {
        use WriterState::*;

        match (self, target) {
            (Configuring, Writing) => true,
            (Writing, Finalizing) => true,
            (Writing, Failed) => true,
            // Failed still allows a best-effort close
            (Failed, Finalizing) => true,
            (Finalizing, Closed) => true,
            (Closed, _) => false,
            (a, b) if a == b => true,
            _ => false,
        }
    }
}

/// Format parameters for one track, fixed before any data is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSpec {
    Video {
        width: u32,
        height: u32,
    },
    Audio {
        kind: StreamKind,
        sample_rate: u32,
        channels: u16,
        bit_rate: u32,
    },
}

impl TrackSpec {
    pub fn video(width: u32, height: u32) -> Self {
        TrackSpec::Video { width, height }
    }

    /// System audio: AAC 48 kHz stereo at 128 kbps
    pub fn system_audio() -> Self {
        TrackSpec::Audio {
            kind: StreamKind::SystemAudio,
            sample_rate: 48_000,
            channels: 2,
            bit_rate: 128_000,
        }
    }

    /// Microphone: AAC 48 kHz mono at 64 kbps
    pub fn microphone() -> Self {
        TrackSpec::Audio {
            kind: StreamKind::Microphone,
            sample_rate: 48_000,
            channels: 1,
            bit_rate: 64_000,
        }
    }

    pub fn kind(&self) -> StreamKind {
        match self {
            TrackSpec::Video { .. } => StreamKind::Video,
            TrackSpec::Audio { kind, .. } => *kind,
        }
    }
}

/// Shared writer state observed by all adapters
///
/// Carries the failed flag and the session origin. Adapters treat a
/// failed writer as "not ready"; the origin rebases every timestamp that
/// enters the container.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    inner: Arc<WriterShared>,
}

#[derive(Debug)]
struct WriterShared {
    failed: AtomicBool,
    origin_micros: AtomicI64,
    origin_set: AtomicBool,
}

impl WriterHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(WriterShared {
                failed: AtomicBool::new(false),
                origin_micros: AtomicI64::new(0),
                origin_set: AtomicBool::new(false),
            }),
        }
    }

    /// Anchor the container session at the given timestamp.
    ///
    /// Called exactly once per session, from the serialized session task,
    /// when the clock establishes the origin.
    pub fn begin_session(&self, origin: Timestamp) {
        self.inner.origin_micros.store(origin.micros, Ordering::Relaxed);
        self.inner.origin_set.store(true, Ordering::Release);
        info!("Container session started at {origin}");
    }

    pub fn origin(&self) -> Option<Timestamp> {
        if self.inner.origin_set.load(Ordering::Acquire) {
            Some(Timestamp::from_micros(
                self.inner.origin_micros.load(Ordering::Relaxed),
            ))
        } else {
            None
        }
    }

    pub fn has_session(&self) -> bool {
        self.inner.origin_set.load(Ordering::Acquire)
    }

    pub fn mark_failed(&self) {
        self.inner.failed.store(true, Ordering::Release);
    }

    pub fn is_failed(&self) -> bool {
        self.inner.failed.load(Ordering::Acquire)
    }
}

impl Default for WriterHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Muxer plus output file, guarded by one mutex shared by the track
/// inputs. Lock holders only push already-encoded packets, never block
/// on anything slower than the page cache.
struct MuxSink {
    muxer: Muxer<File>,
}

// The muxer wraps raw FFmpeg state; access is serialized by the mutex.
unsafe impl Send for MuxSink {}

type SharedSink = Arc<Mutex<MuxSink>>;

/// Owns the output file handle and the finalize/flush lifecycle
pub struct ContainerWriter {
    path: PathBuf,
    state: WriterState,
    handle: WriterHandle,
    sink: SharedSink,
}

impl ContainerWriter {
    /// Open a container at `path` with the given track layout.
    ///
    /// Exactly one video track is mandatory; up to two audio tracks may
    /// follow. Returns the writer plus one adapter per track, in spec
    /// order.
    pub fn open(
        path: &Path,
        specs: &[TrackSpec],
        stats: Arc<SessionStats>,
    ) -> Result<(ContainerWriter, Vec<WriterAdapter>), OpenError> {
        let videos = specs
            .iter()
            .filter(|s| matches!(s, TrackSpec::Video { .. }))
            .count();
        if videos != 1 || specs.len() > 3 {
            return Err(OpenError::UnsupportedFormat(format!(
                "expected one video track and up to two audio tracks, got {} tracks ({} video)",
                specs.len(),
                videos
            )));
        }

        let file_name = path.to_string_lossy();
        let output_format = OutputFormat::guess_from_file_name(&file_name).ok_or_else(|| {
            OpenError::UnsupportedFormat(format!("unable to guess container format for {file_name}"))
        })?;

        let file = File::create(path)?;
        let io = IO::from_seekable_write_stream(file);

        enum PendingInput {
            Video(VideoEncoder, u32, u32),
            Audio(AudioEncoder, StreamKind, u32, u16),
        }

        let mut muxer_builder = Muxer::builder();
        let mut pending = Vec::with_capacity(specs.len());

        for spec in specs {
            match *spec {
                TrackSpec::Video { width, height } => {
                    let encoder = Self::create_video_encoder(width, height)?;
                    let params: CodecParameters = encoder.codec_parameters().into();
                    muxer_builder
                        .add_stream(&params)
                        .map_err(|e| OpenError::UnsupportedFormat(e.to_string()))?;
                    pending.push(PendingInput::Video(encoder, width, height));
                }
                TrackSpec::Audio {
                    kind,
                    sample_rate,
                    channels,
                    bit_rate,
                } => {
                    let encoder = Self::create_audio_encoder(sample_rate, channels, bit_rate)?;
                    let params: CodecParameters = encoder.codec_parameters().into();
                    muxer_builder
                        .add_stream(&params)
                        .map_err(|e| OpenError::UnsupportedFormat(e.to_string()))?;
                    pending.push(PendingInput::Audio(encoder, kind, sample_rate, channels));
                }
            }
        }

        let muxer = muxer_builder
            .build(io, output_format)
            .map_err(|e| OpenError::UnsupportedFormat(e.to_string()))?;

        let sink: SharedSink = Arc::new(Mutex::new(MuxSink { muxer }));
        let handle = WriterHandle::new();

        let mut adapters = Vec::with_capacity(pending.len());
        for (stream_index, input) in pending.into_iter().enumerate() {
            let (kind, boxed): (StreamKind, Box<dyn EncoderInput>) = match input {
                PendingInput::Video(encoder, width, height) => (
                    StreamKind::Video,
                    Box::new(VideoTrackInput {
                        encoder,
                        stream_index,
                        width: width as usize,
                        height: height as usize,
                        time_base: TimeBase::new(VIDEO_TIME_BASE.0, VIDEO_TIME_BASE.1),
                        sink: sink.clone(),
                        handle: handle.clone(),
                    }),
                ),
                PendingInput::Audio(encoder, kind, sample_rate, channels) => {
                    let samples_per_frame = encoder.samples_per_frame().unwrap_or(1024);
                    (
                        kind,
                        Box::new(AudioTrackInput {
                            encoder,
                            stream_index,
                            sample_rate,
                            channels: channels as usize,
                            samples_per_frame,
                            buffered: vec![Vec::new(); channels as usize],
                            base_samples: None,
                            frames_emitted: 0,
                            rate_warned: false,
                            sink: sink.clone(),
                            handle: handle.clone(),
                        }),
                    )
                }
            };
            adapters.push(WriterAdapter::new(kind, boxed, handle.clone(), stats.clone()));
        }

        info!("Container opened at {} with {} tracks", path.display(), adapters.len());

        // Configuring -> Writing: all tracks are attached and the header
        // is in place once the muxer is built.
        Ok((
            ContainerWriter {
                path: path.to_path_buf(),
                state: WriterState::Writing,
                handle,
                sink,
            },
            adapters,
        ))
    }

    fn create_video_encoder(width: u32, height: u32) -> Result<VideoEncoder, OpenError> {
        let time_base = TimeBase::new(VIDEO_TIME_BASE.0, VIDEO_TIME_BASE.1);
        let pixel_format = video::frame::get_pixel_format("nv12");

        for (codec, options) in ENCODER_CHAIN {
            let mut builder = match VideoEncoder::builder(codec) {
                Ok(b) => b,
                Err(e) => {
                    debug!("Encoder {codec} not available, skipping: {e}");
                    continue;
                }
            };
            builder = builder
                .pixel_format(pixel_format)
                .width(width as usize)
                .height(height as usize)
                .time_base(time_base);
            for (k, v) in *options {
                builder = builder.set_option(k, v);
            }
            match builder.build() {
                Ok(encoder) => {
                    info!("Using video encoder: {codec}");
                    return Ok(encoder);
                }
                Err(e) => {
                    debug!("Encoder {codec} failed to initialize: {e}");
                    continue;
                }
            }
        }

        Err(OpenError::UnsupportedFormat(
            "no H.264 encoder available in this FFmpeg build".into(),
        ))
    }

    fn create_audio_encoder(
        sample_rate: u32,
        channels: u16,
        bit_rate: u32,
    ) -> Result<AudioEncoder, OpenError> {
        use ac_ffmpeg::codec::audio::ChannelLayout;

        let layout = ChannelLayout::from_channels(channels as u32).ok_or_else(|| {
            OpenError::UnsupportedFormat(format!("no channel layout for {channels} channels"))
        })?;

        let bit_rate = bit_rate.to_string();

        AudioEncoder::builder("aac")
            .and_then(|builder| {
                builder
                    .sample_rate(sample_rate)
                    .channel_layout(layout)
                    .sample_format(get_sample_format("fltp"))
                    .set_option("b", bit_rate.as_str())
                    .build()
            })
            .map_err(|e| OpenError::UnsupportedFormat(format!("AAC encoder unavailable: {e}")))
    }

    pub fn handle(&self) -> WriterHandle {
        self.handle.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> WriterState {
        if self.handle.is_failed() && self.state == WriterState::Writing {
            WriterState::Failed
        } else {
            self.state
        }
    }

    /// Flush pending writes and close the container.
    ///
    /// All adapters must be finished (and dropped) first so the muxer is
    /// uniquely owned here and the trailer lands on disk before the call
    /// returns. Safe to call when no session was ever started: the file
    /// is still closed best-effort and the empty recording is reported as
    /// an error.
    pub async fn finalize(self) -> Result<PathBuf> {
        let ContainerWriter {
            path,
            state,
            handle,
            sink,
        } = self;
        debug!("Finalizing container ({state:?} -> Finalizing)");

        let had_session = handle.has_session();

        let flush_result = tokio::task::spawn_blocking(move || match Arc::try_unwrap(sink) {
            Ok(mutex) => {
                let mut sink = mutex.into_inner().unwrap_or_else(|p| p.into_inner());
                let res = sink.muxer.flush();
                // Dropping the muxer writes the container trailer
                drop(sink);
                res.map_err(|e| anyhow!("muxer flush failed: {e}"))
            }
            Err(shared) => {
                // An adapter still holds the sink; flush through the lock
                let mut sink = shared.lock().unwrap_or_else(|p| p.into_inner());
                sink.muxer
                    .flush()
                    .map_err(|e| anyhow!("muxer flush failed: {e}"))
            }
        })
        .await
        .map_err(|e| anyhow!("finalize task failed: {e}"))
        .and_then(|r| r);

        debug!("Container closed");

        flush_result?;

        if !had_session {
            return Err(anyhow!(
                "no samples were written; discarding empty recording at {}",
                path.display()
            ));
        }

        Ok(path)
    }
}

// ── Video track input ───────────────────────────────────────────

struct VideoTrackInput {
    encoder: VideoEncoder,
    stream_index: usize,
    width: usize,
    height: usize,
    time_base: TimeBase,
    sink: SharedSink,
    handle: WriterHandle,
}

impl VideoTrackInput {
    fn drain_packets(&mut self) -> Result<()> {
        while let Some(packet) = self
            .encoder
            .take()
            .map_err(|e| anyhow!("video encoder output failed: {e}"))?
        {
            let mut sink = self.sink.lock().unwrap_or_else(|p| p.into_inner());
            if let Err(e) = sink.muxer.push(packet.with_stream_index(self.stream_index)) {
                // Container-level errors poison the whole writer
                self.handle.mark_failed();
                return Err(anyhow!("container write failed: {e}"));
            }
        }
        Ok(())
    }

    /// Copy one tightly packed source plane into an encoder plane whose
    /// rows may be padded to an alignment boundary.
    fn copy_plane(source: &[u8], width: usize, rows: usize, destination: &mut [u8]) {
        let line_size = destination.len() / rows.max(1);
        if line_size == width && source.len() >= width * rows {
            destination[..width * rows].copy_from_slice(&source[..width * rows]);
            return;
        }

        let copy_width = width.min(line_size);
        for r in 0..rows {
            let src_start = r * width;
            let dst_start = r * line_size;
            if src_start + copy_width > source.len() || dst_start + copy_width > destination.len()
            {
                break;
            }
            destination[dst_start..dst_start + copy_width]
                .copy_from_slice(&source[src_start..src_start + copy_width]);
        }
    }
}

impl EncoderInput for VideoTrackInput {
    fn can_accept_more(&self) -> bool {
        !self.handle.is_failed()
    }

    fn append(&mut self, sample: &SampleBuffer) -> Result<()> {
        let origin = self
            .handle
            .origin()
            .ok_or_else(|| anyhow!("video append before session origin"))?;

        let luma_len = self.width * self.height;
        let chroma_len = luma_len / 2;
        if sample.data.len() < luma_len + chroma_len {
            return Err(anyhow!(
                "short video sample: {} bytes for {}x{}",
                sample.data.len(),
                self.width,
                self.height
            ));
        }

        let rel_micros = sample.pts.micros_since(origin);
        let pts_ticks = rel_micros * (VIDEO_TIME_BASE.1 as i64) / 1_000_000;

        let pixel_format = video::frame::get_pixel_format("nv12");
        let mut frame = video::VideoFrameMut::black(pixel_format, self.width, self.height)
            .with_time_base(self.time_base)
            .with_pts(CodecTimestamp::new(pts_ticks, self.time_base));

        {
            let mut planes = frame.planes_mut();
            Self::copy_plane(
                &sample.data[..luma_len],
                self.width,
                self.height,
                planes[0].data_mut(),
            );
            Self::copy_plane(
                &sample.data[luma_len..luma_len + chroma_len],
                self.width,
                self.height / 2,
                planes[1].data_mut(),
            );
        }

        self.encoder
            .push(frame.freeze())
            .map_err(|e| anyhow!("video encode failed: {e}"))?;

        self.drain_packets()
    }

    fn finish(&mut self) -> Result<()> {
        self.encoder
            .flush()
            .map_err(|e| anyhow!("video encoder flush failed: {e}"))?;
        self.drain_packets()
    }
}

// ── Audio track input ───────────────────────────────────────────

struct AudioTrackInput {
    encoder: AudioEncoder,
    stream_index: usize,
    sample_rate: u32,
    channels: usize,
    samples_per_frame: usize,
    /// Deinterleaved accumulation buffers, one per channel
    buffered: Vec<Vec<f32>>,
    /// Track position of the first buffered sample, in samples
    base_samples: Option<i64>,
    frames_emitted: u64,
    rate_warned: bool,
    sink: SharedSink,
    handle: WriterHandle,
}

impl AudioTrackInput {
    fn drain_packets(&mut self) -> Result<()> {
        while let Some(packet) = self
            .encoder
            .take()
            .map_err(|e| anyhow!("audio encoder output failed: {e}"))?
        {
            let mut sink = self.sink.lock().unwrap_or_else(|p| p.into_inner());
            if let Err(e) = sink.muxer.push(packet.with_stream_index(self.stream_index)) {
                self.handle.mark_failed();
                return Err(anyhow!("container write failed: {e}"));
            }
        }
        Ok(())
    }

    fn emit_frame(&mut self, samples: usize) -> Result<()> {
        let time_base = TimeBase::new(1, self.sample_rate as i32);
        let pts = self.base_samples.unwrap_or(0)
            + self.frames_emitted as i64 * self.samples_per_frame as i64;

        let mut frame = AudioFrameMut::silence(
            self.encoder.codec_parameters().channel_layout(),
            self.encoder.codec_parameters().sample_format(),
            self.encoder.codec_parameters().sample_rate(),
            self.samples_per_frame,
        )
        .with_time_base(time_base)
        .with_pts(CodecTimestamp::new(pts, time_base));

        {
            let mut planes = frame.planes_mut();
            for (ch, buffer) in self.buffered.iter().enumerate() {
                let data = planes[ch].data_mut();
                let plane: &mut [f32] = unsafe {
                    std::slice::from_raw_parts_mut(
                        data.as_mut_ptr() as *mut f32,
                        data.len() / std::mem::size_of::<f32>(),
                    )
                };
                plane[..samples].copy_from_slice(&buffer[..samples]);
            }
            for buffer in &mut self.buffered {
                buffer.drain(..samples);
            }
        }

        self.encoder
            .push(frame.freeze())
            .map_err(|e| anyhow!("audio encode failed: {e}"))?;
        self.frames_emitted += 1;

        self.drain_packets()
    }
}

impl EncoderInput for AudioTrackInput {
    fn can_accept_more(&self) -> bool {
        !self.handle.is_failed()
    }

    fn append(&mut self, sample: &SampleBuffer) -> Result<()> {
        let origin = self
            .handle
            .origin()
            .ok_or_else(|| anyhow!("audio append before session origin"))?;

        if let Some(rate) = sample.sample_rate
            && rate != self.sample_rate
            && !self.rate_warned
        {
            warn!(
                "Audio delivered at {rate} Hz but track expects {} Hz; timing may drift",
                self.sample_rate
            );
            self.rate_warned = true;
        }

        let src_channels = sample.channels.unwrap_or(1).max(1) as usize;
        let frame_bytes = src_channels * std::mem::size_of::<f32>();
        let frames = sample.data.len() / frame_bytes;
        if frames == 0 {
            return Ok(());
        }

        if self.base_samples.is_none() {
            let rel_micros = sample.pts.micros_since(origin);
            self.base_samples = Some(rel_micros * self.sample_rate as i64 / 1_000_000);
        }

        for i in 0..frames {
            for ch in 0..self.channels {
                // Map missing source channels by repeating the last one
                let src_ch = ch.min(src_channels - 1);
                let offset = (i * src_channels + src_ch) * 4;
                let value = f32::from_le_bytes([
                    sample.data[offset],
                    sample.data[offset + 1],
                    sample.data[offset + 2],
                    sample.data[offset + 3],
                ]);
                self.buffered[ch].push(value);
            }
        }

        while self.buffered[0].len() >= self.samples_per_frame {
            self.emit_frame(self.samples_per_frame)?;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        // Pad the tail to a whole encoder frame with silence
        let remaining = self.buffered[0].len();
        if remaining > 0 {
            for buffer in &mut self.buffered {
                buffer.resize(self.samples_per_frame, 0.0);
            }
            self.emit_frame(self.samples_per_frame)?;
        }

        self.encoder
            .flush()
            .map_err(|e| anyhow!("audio encoder flush failed: {e}"))?;
        self.drain_packets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_spec_profiles() {
        match TrackSpec::system_audio() {
            TrackSpec::Audio {
                kind,
                sample_rate,
                channels,
                bit_rate,
            } => {
                assert_eq!(kind, StreamKind::SystemAudio);
                assert_eq!(sample_rate, 48_000);
                assert_eq!(channels, 2);
                assert_eq!(bit_rate, 128_000);
            }
            other => panic!("unexpected spec: {other:?}"),
        }

        match TrackSpec::microphone() {
            TrackSpec::Audio {
                kind,
                channels,
                bit_rate,
                ..
            } => {
                assert_eq!(kind, StreamKind::Microphone);
                assert_eq!(channels, 1);
                assert_eq!(bit_rate, 64_000);
            }
            other => panic!("unexpected spec: {other:?}"),
        }

        assert_eq!(TrackSpec::video(1920, 1080).kind(), StreamKind::Video);
    }

    #[test]
    fn test_writer_handle_origin_once_visible() {
        let handle = WriterHandle::new();
        assert!(handle.origin().is_none());
        assert!(!handle.has_session());

        handle.begin_session(Timestamp::from_micros(42));
        assert_eq!(handle.origin(), Some(Timestamp::from_micros(42)));
        assert!(handle.has_session());
    }

    #[test]
    fn test_writer_handle_failed_flag() {
        let handle = WriterHandle::new();
        let observer = handle.clone();

        assert!(!observer.is_failed());
        handle.mark_failed();
        assert!(observer.is_failed());
    }

    #[test]
    fn test_writer_state_transitions() {
        use WriterState::*;

        assert!(Configuring.can_transition_to(&Writing));
        assert!(Writing.can_transition_to(&Finalizing));
        assert!(Writing.can_transition_to(&Failed));
        assert!(Failed.can_transition_to(&Finalizing));
        assert!(Finalizing.can_transition_to(&Closed));

        assert!(!Closed.can_transition_to(&Writing));
        assert!(!Configuring.can_transition_to(&Failed));
        assert!(!Finalizing.can_transition_to(&Writing));
    }

    #[test]
    fn test_copy_plane_handles_padded_rows() {
        // 4x2 source into a destination padded to 6 bytes per row
        let source: Vec<u8> = (0..8).collect();
        let mut destination = vec![0xFFu8; 12];
        VideoTrackInput::copy_plane(&source, 4, 2, &mut destination);

        assert_eq!(&destination[0..4], &[0, 1, 2, 3]);
        assert_eq!(&destination[6..10], &[4, 5, 6, 7]);
        // Padding bytes untouched
        assert_eq!(destination[4], 0xFF);
        assert_eq!(destination[11], 0xFF);
    }

    #[test]
    fn test_copy_plane_exact_fit() {
        let source: Vec<u8> = (0..8).collect();
        let mut destination = vec![0u8; 8];
        VideoTrackInput::copy_plane(&source, 4, 2, &mut destination);
        assert_eq!(destination, source);
    }
}
