use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::{CaptureRegion, CaptureSpec, DisplayHandle};
use crate::utils::path::default_output_dir;

pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
pub const DEFAULT_GIF_FPS: u32 = 15;

/// Round a dimension down to the nearest even value, as required by the
/// H.264 profile in use (4:2:0 chroma needs even luma dimensions).
fn even_dimension(value: f64) -> u32 {
    ((value / 2.0).floor() * 2.0).max(0.0) as u32
}

/// User-typed crop rectangle, kept as raw text
///
/// The four fields arrive from free-form input. Anything non-numeric, or
/// a rectangle with zero area after even-normalization, falls back to
/// full-region capture at resolve time instead of failing the start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropInput {
    pub x: String,
    pub y: String,
    pub w: String,
    pub h: String,
}

impl CropInput {
    pub fn new(
        x: impl Into<String>,
        y: impl Into<String>,
        w: impl Into<String>,
        h: impl Into<String>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            w: w.into(),
            h: h.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.trim().is_empty()
            && self.y.trim().is_empty()
            && self.w.trim().is_empty()
            && self.h.trim().is_empty()
    }

    /// Parse into an even-normalized region. None means "use the full
    /// source region".
    fn resolve(&self) -> Option<CaptureRegion> {
        let x = self.x.trim().parse::<f64>().ok()?;
        let y = self.y.trim().parse::<f64>().ok()?;
        let w = self.w.trim().parse::<f64>().ok()?;
        let h = self.h.trim().parse::<f64>().ok()?;

        let width = even_dimension(w);
        let height = even_dimension(h);
        if width == 0 || height == 0 {
            return None;
        }

        Some(CaptureRegion {
            x: x.max(0.0) as u32,
            y: y.max(0.0) as u32,
            width,
            height,
        })
    }
}

/// Everything the orchestrator needs to start a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Chosen display; None means "first available"
    pub display: Option<DisplayHandle>,
    pub crop: CropInput,
    pub record_audio: bool,
    pub record_microphone: bool,
    pub convert_to_gif: bool,
    pub gif_fps: u32,
    pub output_dir: PathBuf,
    pub frame_rate: u32,
    pub sample_rate: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            display: None,
            crop: CropInput::default(),
            record_audio: true,
            record_microphone: true,
            convert_to_gif: false,
            gif_fps: DEFAULT_GIF_FPS,
            output_dir: default_output_dir(),
            frame_rate: DEFAULT_FRAME_RATE,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl RecorderConfig {
    /// Resolve the configuration against the chosen display.
    ///
    /// Malformed or zero-area crops fall back to the full display
    /// surface; either way the resulting dimensions are even.
    pub fn resolve(&self, display: &DisplayHandle) -> CaptureSpec {
        let region = self.crop.resolve().unwrap_or_else(|| {
            let full = CaptureRegion::full(display);
            CaptureRegion {
                width: even_dimension(full.width as f64),
                height: even_dimension(full.height as f64),
                ..full
            }
        });

        CaptureSpec {
            display: display.clone(),
            region,
            frame_interval: Duration::from_secs(1) / self.frame_rate.max(1),
            capture_audio: self.record_audio,
            capture_microphone: self.record_microphone,
            sample_rate: self.sample_rate,
            channels: 2,
        }
    }
}

/// Returns a version as specified in Cargo.toml
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn app_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> DisplayHandle {
        DisplayHandle {
            id: 1,
            name: "Main".into(),
            width: 1920,
            height: 1080,
            scale_factor: 1.0,
        }
    }

    #[test]
    fn test_even_normalization() {
        // normalized = 2 * floor(v / 2): always even, never larger
        for (input, expected) in [
            (0.0, 0),
            (1.0, 0),
            (2.0, 2),
            (99.0, 98),
            (100.0, 100),
            (1081.7, 1080),
        ] {
            let normalized = even_dimension(input);
            assert_eq!(normalized, expected);
            assert_eq!(normalized % 2, 0);
            assert!(normalized as f64 <= input);
        }
    }

    #[test]
    fn test_crop_resolves_to_even_region() {
        let config = RecorderConfig {
            crop: CropInput::new("10", "20", "101", "75"),
            ..Default::default()
        };
        let spec = config.resolve(&display());

        assert_eq!(spec.region.x, 10);
        assert_eq!(spec.region.y, 20);
        assert_eq!(spec.region.width, 100);
        assert_eq!(spec.region.height, 74);
    }

    #[test]
    fn test_malformed_crop_falls_back_to_full_region() {
        // Non-numeric X must not fail the start
        let config = RecorderConfig {
            crop: CropInput::new("abc", "0", "800", "600"),
            ..Default::default()
        };
        let spec = config.resolve(&display());

        assert_eq!(spec.region.x, 0);
        assert_eq!(spec.region.width, 1920);
        assert_eq!(spec.region.height, 1080);
    }

    #[test]
    fn test_zero_area_crop_falls_back_to_full_region() {
        let config = RecorderConfig {
            crop: CropInput::new("0", "0", "1", "600"),
            ..Default::default()
        };
        let spec = config.resolve(&display());
        assert_eq!(spec.region.width, 1920);
    }

    #[test]
    fn test_empty_crop_uses_full_region() {
        let config = RecorderConfig::default();
        assert!(config.crop.is_empty());

        let spec = config.resolve(&display());
        assert_eq!(spec.region.width, 1920);
        assert_eq!(spec.region.height, 1080);
    }

    #[test]
    fn test_odd_display_is_even_normalized() {
        let odd = DisplayHandle {
            width: 1921,
            height: 1081,
            ..display()
        };
        let spec = RecorderConfig::default().resolve(&odd);
        assert_eq!(spec.region.width, 1920);
        assert_eq!(spec.region.height, 1080);
    }

    #[test]
    fn test_negative_origin_clamps() {
        let config = RecorderConfig {
            crop: CropInput::new("-5", "-10", "100", "100"),
            ..Default::default()
        };
        let spec = config.resolve(&display());
        assert_eq!(spec.region.x, 0);
        assert_eq!(spec.region.y, 0);
        assert_eq!(spec.region.width, 100);
    }

    #[test]
    fn test_frame_interval_matches_rate() {
        let config = RecorderConfig {
            frame_rate: 30,
            ..Default::default()
        };
        let spec = config.resolve(&display());
        assert_eq!(spec.frame_interval, Duration::from_secs(1) / 30);
    }
}
