//! Screen capture module
//!
//! Defines the boundary to the capture service (`CaptureSource`), the
//! non-blocking router producers deliver into, and a generic fallback
//! backend that keeps the recorder usable on hosts without a platform
//! capture integration.

pub mod audio;
pub mod generic;
pub mod router;
pub mod source;

pub use generic::GenericCapture;
pub use router::SampleRouter;
pub use source::{CaptureRegion, CaptureSource, CaptureSpec, DisplayHandle, enumerate_displays};
