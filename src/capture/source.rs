//! Capture source boundary
//!
//! A capture source is anything that can push typed samples into the
//! router: a platform capture service, the built-in generic backend, or a
//! scripted source in tests. The recorder never couples to a particular
//! delivery mechanism; it only hands over a router and expects samples.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use display_info::DisplayInfo as OsDisplayInfo;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::router::SampleRouter;

/// Opaque handle to one capturable display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayHandle {
    pub id: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl std::fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} x {})", self.name, self.width, self.height)
    }
}

/// Region of the source surface to capture, in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn full(display: &DisplayHandle) -> Self {
        Self {
            x: 0,
            y: 0,
            width: display.width,
            height: display.height,
        }
    }
}

/// Fully resolved capture parameters handed to a capture source
///
/// Width and height are already even-normalized by config resolution;
/// sources may rely on that.
#[derive(Debug, Clone)]
pub struct CaptureSpec {
    pub display: DisplayHandle,
    pub region: CaptureRegion,
    pub frame_interval: Duration,
    pub capture_audio: bool,
    pub capture_microphone: bool,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Trait for capture service implementations
#[async_trait]
pub trait CaptureSource: Send {
    /// Enumerate capturable displays
    fn list_sources(&self) -> Result<Vec<DisplayHandle>>;

    /// Begin delivering samples for `spec` to `router` until stopped
    async fn start_capture(&mut self, spec: CaptureSpec, router: SampleRouter) -> Result<()>;

    /// Stop delivering samples. Calling this when capture never started,
    /// or has already stopped, is not an error.
    async fn stop_capture(&mut self) -> Result<()>;
}

/// Enumerate displays through the OS
pub fn enumerate_displays() -> Result<Vec<DisplayHandle>> {
    let displays =
        OsDisplayInfo::all().map_err(|e| anyhow!("Failed to enumerate displays: {}", e))?;

    let mut out = Vec::with_capacity(displays.len());
    for d in displays {
        out.push(DisplayHandle {
            id: d.id,
            name: d.name,
            width: d.width,
            height: d.height,
            scale_factor: d.scale_factor as f64,
        });
    }
    if out.is_empty() {
        return Err(anyhow!("No displays found"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_region_covers_display() {
        let display = DisplayHandle {
            id: 1,
            name: "Main".into(),
            width: 1920,
            height: 1080,
            scale_factor: 1.0,
        };
        let region = CaptureRegion::full(&display);
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 0);
        assert_eq!(region.width, 1920);
        assert_eq!(region.height, 1080);
    }
}
