//! Core types for the recording pipeline

use bytes::Bytes;
use std::time::Duration;

/// Timestamp representation for captured samples
///
/// Timestamps are microseconds on the capture service's presentation
/// clock. They are only meaningful relative to each other; the container
/// rebases them against the session origin (see `SessionClock`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    /// Microseconds on the capture clock
    pub micros: i64,
}

impl Timestamp {
    /// Create a new timestamp from microseconds
    pub fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Create a timestamp from a duration since the capture clock's zero
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            micros: duration.as_micros() as i64,
        }
    }

    /// Convert to a duration (negative values clamp to zero)
    pub fn as_duration(&self) -> Duration {
        Duration::from_micros(self.micros.max(0) as u64)
    }

    /// Microseconds elapsed since `origin`, clamped to zero for samples
    /// that predate it
    pub fn micros_since(&self, origin: Timestamp) -> i64 {
        (self.micros - origin.micros).max(0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}us", self.micros)
    }
}

/// Kind of captured stream
///
/// A closed set: each kind maps to at most one writer adapter per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Video frames
    Video,
    /// System audio (what is playing through the speakers)
    SystemAudio,
    /// Microphone input
    Microphone,
}

impl StreamKind {
    /// Stable index for per-stream counter arrays
    pub fn index(&self) -> usize {
        match self {
            StreamKind::Video => 0,
            StreamKind::SystemAudio => 1,
            StreamKind::Microphone => 2,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, StreamKind::SystemAudio | StreamKind::Microphone)
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::SystemAudio => write!(f, "audio"),
            StreamKind::Microphone => write!(f, "mic"),
        }
    }
}

/// One timestamped unit of captured media
///
/// Video samples carry raw NV12 pixel data (luma plane followed by the
/// interleaved chroma plane, tightly packed). Audio samples carry
/// interleaved little-endian f32 PCM.
#[derive(Clone)]
pub struct SampleBuffer {
    /// Which stream this sample belongs to
    pub kind: StreamKind,

    /// Raw media data
    pub data: Bytes,

    /// Presentation timestamp on the capture clock
    pub pts: Timestamp,

    /// Whether a video sample carries decodable image content.
    /// The capture service may deliver status-only buffers (idle frames,
    /// stream markers) with no image attached.
    pub has_image: bool,

    /// Frame width (video only)
    pub width: Option<u32>,

    /// Frame height (video only)
    pub height: Option<u32>,

    /// Sample rate (audio only)
    pub sample_rate: Option<u32>,

    /// Number of channels (audio only)
    pub channels: Option<u16>,
}

impl SampleBuffer {
    /// Create a new video sample
    pub fn video(data: Bytes, pts: Timestamp, width: u32, height: u32, has_image: bool) -> Self {
        Self {
            kind: StreamKind::Video,
            data,
            pts,
            has_image,
            width: Some(width),
            height: Some(height),
            sample_rate: None,
            channels: None,
        }
    }

    /// Create a new audio sample for either audio stream kind
    pub fn audio(
        kind: StreamKind,
        data: Bytes,
        pts: Timestamp,
        sample_rate: u32,
        channels: u16,
    ) -> Self {
        debug_assert!(kind.is_audio(), "audio sample with kind {kind}");
        Self {
            kind,
            data,
            pts,
            has_image: false,
            width: None,
            height: None,
            sample_rate: Some(sample_rate),
            channels: Some(channels),
        }
    }

    /// Get the size of the sample data in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("SampleBuffer");
        debug
            .field("kind", &self.kind)
            .field("pts", &self.pts)
            .field("size", &self.size());

        if self.kind == StreamKind::Video {
            debug.field("has_image", &self.has_image);
        }
        if let Some(width) = self.width {
            debug.field("width", &width);
        }
        if let Some(height) = self.height {
            debug.field("height", &height);
        }
        if let Some(sample_rate) = self.sample_rate {
            debug.field("sample_rate", &sample_rate);
        }
        if let Some(channels) = self.channels {
            debug.field("channels", &channels);
        }

        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_rebase() {
        let origin = Timestamp::from_micros(1_000_000);
        let later = Timestamp::from_micros(1_500_000);
        let earlier = Timestamp::from_micros(400_000);

        assert_eq!(later.micros_since(origin), 500_000);
        // Samples predating the origin clamp instead of going negative
        assert_eq!(earlier.micros_since(origin), 0);
    }

    #[test]
    fn test_timestamp_duration() {
        let ts = Timestamp::from_duration(Duration::from_millis(250));
        assert_eq!(ts.micros, 250_000);
        assert_eq!(ts.as_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_stream_kind_indices_are_distinct() {
        let kinds = [
            StreamKind::Video,
            StreamKind::SystemAudio,
            StreamKind::Microphone,
        ];
        for a in kinds {
            for b in kinds {
                if a != b {
                    assert_ne!(a.index(), b.index());
                }
            }
        }
    }

    #[test]
    fn test_sample_constructors() {
        let video = SampleBuffer::video(
            Bytes::from(vec![0u8; 16]),
            Timestamp::from_micros(0),
            1920,
            1080,
            true,
        );
        assert_eq!(video.kind, StreamKind::Video);
        assert_eq!(video.width, Some(1920));
        assert!(video.sample_rate.is_none());

        let audio = SampleBuffer::audio(
            StreamKind::SystemAudio,
            Bytes::from(vec![0u8; 16]),
            Timestamp::from_micros(0),
            48_000,
            2,
        );
        assert_eq!(audio.sample_rate, Some(48_000));
        assert_eq!(audio.channels, Some(2));
        assert!(audio.width.is_none());
    }
}
