use crate::config::app_name;
use log::warn;
use std::env::var_os;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

fn home_path() -> Option<String> {
    #[cfg(not(target_os = "windows"))]
    let home = var_os("HOME").map(|home| home.to_string_lossy().to_string());

    #[cfg(target_os = "windows")]
    let home = var_os("HOMEDRIVE").and_then(|drive| {
        var_os("HOMEPATH")
            .map(|home| format!("{}{}", drive.to_string_lossy(), home.to_string_lossy()))
    });

    home
}

/// Abbreviate a path for the one-line status display
pub fn shorten_path(path: &Path) -> String {
    let mut display = path.display().to_string();
    if let Some(home) = home_path() {
        display = display.replace(&home, "~");
    }

    if display.chars().count() > 20 {
        let tail: String = {
            let chars: Vec<char> = display.chars().collect();
            chars[chars.len() - 17..].iter().collect()
        };
        format!("...{}", tail)
    } else {
        display
    }
}

/// Default directory recordings are saved to: `~/<app>/`, created on
/// demand. Creation failures are deferred to relocation time, where they
/// surface as a reported error instead of a panic.
pub fn default_output_dir() -> PathBuf {
    let Some(home) = home_path() else {
        return PathBuf::from(".");
    };

    let dir = PathBuf::from(home).join(app_name());
    if let Err(e) = DirBuilder::new().recursive(true).create(&dir) {
        warn!("Could not create {}: {}", dir.display(), e);
    }
    dir
}

/// File name for one recording. The `capture_<unixTimestamp>.mp4`
/// pattern is relied upon by downstream tooling; keep it stable.
pub fn capture_file_name(unix_ts: i64) -> String {
    format!("capture_{}.mp4", unix_ts)
}

/// Scratch location the container is written to before relocation
pub fn scratch_capture_path(unix_ts: i64) -> PathBuf {
    std::env::temp_dir().join(capture_file_name(unix_ts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_file_name_pattern() {
        assert_eq!(capture_file_name(1700000000), "capture_1700000000.mp4");
    }

    #[test]
    fn test_scratch_path_is_under_temp_dir() {
        let path = scratch_capture_path(123);
        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "capture_123.mp4"
        );
    }

    #[test]
    fn test_shorten_path_keeps_short_paths() {
        assert_eq!(shorten_path(Path::new("/tmp/a.mp4")), "/tmp/a.mp4");
    }

    #[test]
    fn test_shorten_path_truncates_long_paths() {
        let shortened = shorten_path(Path::new("/very/long/path/that/keeps/going/on/file.mp4"));
        assert!(shortened.starts_with("..."));
        assert_eq!(shortened.chars().count(), 20);
    }
}
