//! Session clock for audio-video synchronization
//!
//! The clock decides when a recording session has a usable time origin.
//! Video is the timing reference: the container session must be anchored
//! to a frame with real image content, so the first such frame's
//! presentation timestamp becomes the origin. Audio and microphone
//! samples arriving before the origin are dropped by the session loop,
//! never buffered, so no sample in the container can predate the video
//! reference.

use log::info;

use super::types::{SampleBuffer, StreamKind, Timestamp};

/// Tracks whether a session origin has been established
///
/// Owned by the serialized session task; establishment is therefore
/// linearizable even though video samples arrive from a concurrent
/// delivery context.
#[derive(Debug, Default)]
pub struct SessionClock {
    origin: Option<Timestamp>,
}

impl SessionClock {
    /// Create a clock with no origin
    pub fn new() -> Self {
        Self { origin: None }
    }

    /// Try to establish the session origin from a video sample.
    ///
    /// Returns false without mutating anything when the origin is already
    /// set, when the sample is not video, or when the sample carries no
    /// decodable image content. Returns true exactly once per session.
    pub fn try_establish_origin(&mut self, sample: &SampleBuffer) -> bool {
        if self.origin.is_some() {
            return false;
        }
        if sample.kind != StreamKind::Video || !sample.has_image {
            return false;
        }

        self.origin = Some(sample.pts);
        info!("Session origin established at {}", sample.pts);
        true
    }

    /// The established origin, if any
    pub fn origin(&self) -> Option<Timestamp> {
        self.origin
    }

    /// Whether non-video streams may append yet
    pub fn has_origin(&self) -> bool {
        self.origin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn video_sample(pts: i64, has_image: bool) -> SampleBuffer {
        SampleBuffer::video(
            Bytes::from(vec![0u8; 8]),
            Timestamp::from_micros(pts),
            640,
            480,
            has_image,
        )
    }

    #[test]
    fn test_origin_requires_image_content() {
        let mut clock = SessionClock::new();

        // Status-only buffers never establish the origin
        assert!(!clock.try_establish_origin(&video_sample(100, false)));
        assert!(!clock.try_establish_origin(&video_sample(200, false)));
        assert!(clock.origin().is_none());

        assert!(clock.try_establish_origin(&video_sample(300, true)));
        assert_eq!(clock.origin(), Some(Timestamp::from_micros(300)));
    }

    #[test]
    fn test_origin_set_at_most_once() {
        let mut clock = SessionClock::new();

        assert!(clock.try_establish_origin(&video_sample(100, true)));

        // Later image-bearing frames are ordinary appends, not new origins
        assert!(!clock.try_establish_origin(&video_sample(200, true)));
        assert!(!clock.try_establish_origin(&video_sample(300, true)));
        assert_eq!(clock.origin(), Some(Timestamp::from_micros(100)));
    }

    #[test]
    fn test_audio_never_establishes_origin() {
        let mut clock = SessionClock::new();

        let audio = SampleBuffer::audio(
            StreamKind::SystemAudio,
            Bytes::from(vec![0u8; 8]),
            Timestamp::from_micros(50),
            48_000,
            2,
        );
        assert!(!clock.try_establish_origin(&audio));
        assert!(!clock.has_origin());
    }
}
