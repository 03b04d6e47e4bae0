//! External GIF transcoding
//!
//! Conversion stays out of process behind a narrow interface: arguments
//! in, exit code and stderr out. The recording itself is already on disk
//! when this runs, so a missing or failing ffmpeg loses only the GIF.

use anyhow::{Result, bail};
use log::info;
use once_cell::sync::Lazy;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Standard install locations probed for the ffmpeg executable
const FFMPEG_CANDIDATES: &[&str] = &[
    "/usr/local/bin/ffmpeg",
    "/usr/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
];

static FFMPEG_PATH: Lazy<Option<PathBuf>> = Lazy::new(|| {
    FFMPEG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
});

/// The probed ffmpeg executable, if any
pub fn ffmpeg_executable() -> Option<&'static Path> {
    FFMPEG_PATH.as_deref()
}

fn gif_args(input: &Path, output: &Path, fps: u32) -> Vec<OsString> {
    vec![
        OsString::from("-i"),
        input.into(),
        OsString::from("-vf"),
        format!("fps={fps},scale=640:-1:flags=lanczos").into(),
        OsString::from("-y"),
        output.into(),
    ]
}

/// Convert `input` into a GIF next to it, at `fps` frames per second.
///
/// Returns the GIF path on success.
pub async fn convert_to_gif(input: &Path, fps: u32) -> Result<PathBuf> {
    let Some(ffmpeg) = ffmpeg_executable() else {
        bail!(
            "no ffmpeg executable found (looked in {})",
            FFMPEG_CANDIDATES.join(", ")
        );
    };

    let output = input.with_extension("gif");

    let result = Command::new(ffmpeg)
        .args(gif_args(input, &output, fps))
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
        let tail: Vec<&str> = tail.into_iter().rev().collect();
        bail!("ffmpeg exited with {}: {}", result.status, tail.join(" | "));
    }

    info!("GIF saved to {}", output.display());
    Ok(output)
}
