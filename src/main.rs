use clap::{Arg, ArgAction, Command};
use log::error;
use native_dialog::DialogBuilder;
use std::path::PathBuf;
use std::time::Duration;
use std::{panic, process};

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod transcode;
pub mod utils;

use crate::capture::GenericCapture;
use crate::config::{CropInput, RecorderConfig, app_name, version};
use crate::engine::RecorderEngine;

fn parsed_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Option<T> {
    matches.get_one::<String>(name).map(|raw| {
        raw.parse::<T>().unwrap_or_else(|_| {
            eprintln!("Invalid value for --{name}: {raw}");
            process::exit(2);
        })
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let matches = Command::new(app_name())
        .version(version())
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("list-displays")
                .long("list-displays")
                .help("List capturable displays and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("display")
                .short('d')
                .long("display")
                .value_name("ID")
                .help("Display id to record (default: first available)"),
        )
        .arg(Arg::new("crop-x").long("crop-x").value_name("PX").help("Crop origin X"))
        .arg(Arg::new("crop-y").long("crop-y").value_name("PX").help("Crop origin Y"))
        .arg(Arg::new("crop-w").long("crop-w").value_name("PX").help("Crop width"))
        .arg(Arg::new("crop-h").long("crop-h").value_name("PX").help("Crop height"))
        .arg(
            Arg::new("no-audio")
                .long("no-audio")
                .help("Do not record system audio")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-mic")
                .long("no-mic")
                .help("Do not record the microphone")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("gif")
                .long("gif")
                .help("Also convert the recording to a GIF")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("gif-fps")
                .long("gif-fps")
                .value_name("FPS")
                .help("GIF frame rate"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for finished recordings"),
        )
        .arg(
            Arg::new("choose-dir")
                .long("choose-dir")
                .help("Pick the output directory in a dialog")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("duration")
                .short('t')
                .long("duration")
                .value_name("SECONDS")
                .help("Stop automatically after this many seconds"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the final report as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list-displays") {
        match capture::enumerate_displays() {
            Ok(displays) => {
                for d in displays {
                    println!("{:>4}  {}", d.id, d);
                }
            }
            Err(e) => {
                eprintln!("Failed to enumerate displays: {e}");
                process::exit(1);
            }
        }
        return;
    }

    // kill the process as soon as a capture thread panics
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(105);
    }));

    let mut config = RecorderConfig {
        record_audio: !matches.get_flag("no-audio"),
        record_microphone: !matches.get_flag("no-mic"),
        convert_to_gif: matches.get_flag("gif"),
        ..Default::default()
    };

    if let Some(fps) = parsed_arg::<u32>(&matches, "gif-fps") {
        config.gif_fps = fps;
    }
    if let Some(dir) = matches.get_one::<String>("output") {
        config.output_dir = PathBuf::from(dir);
    }
    if matches.get_flag("choose-dir") {
        match DialogBuilder::file()
            .set_location(&config.output_dir)
            .open_single_dir()
            .show()
        {
            Ok(Some(dir)) => config.output_dir = dir,
            // Cancelled: keep the existing default
            Ok(None) => {}
            Err(e) => eprintln!("Directory picker unavailable: {e}"),
        }
    }

    // Crop values stay raw strings: malformed input falls back to
    // full-region capture instead of failing here
    let crop_arg = |name: &str| {
        matches
            .get_one::<String>(name)
            .cloned()
            .unwrap_or_default()
    };
    config.crop = CropInput::new(
        crop_arg("crop-x"),
        crop_arg("crop-y"),
        crop_arg("crop-w"),
        crop_arg("crop-h"),
    );

    if let Some(id) = parsed_arg::<u32>(&matches, "display") {
        match capture::enumerate_displays() {
            Ok(displays) => match displays.into_iter().find(|d| d.id == id) {
                Some(display) => config.display = Some(display),
                None => {
                    eprintln!("No display with id {id}; use --list-displays");
                    process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Failed to enumerate displays: {e}");
                process::exit(1);
            }
        }
    }

    let duration = parsed_arg::<u64>(&matches, "duration");
    let json = matches.get_flag("json");

    let mut engine = RecorderEngine::new(config, Box::new(GenericCapture::new()));

    // Ctrl-C requests a graceful stop
    let (stop_tx, mut stop_rx) = tokio::sync::mpsc::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .expect("Error setting Ctrl-C handler");

    if let Err(e) = engine.start().await {
        error!("Start failed: {e}");
        eprintln!("{}", engine.status().snapshot());
        process::exit(1);
    }

    eprintln!("{}", engine.status().snapshot());

    match duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = stop_rx.recv() => {}
            }
        }
        None => {
            eprintln!("Press Ctrl-C to stop.");
            let _ = stop_rx.recv().await;
        }
    }

    let report = engine.stop().await;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => error!("Failed to serialize report: {e}"),
        }
    } else {
        println!("{}", report.status);
        if let Some(artifact) = &report.artifact {
            println!(
                "  {} frames, {} audio samples, {} mic samples",
                artifact.video_frames, artifact.audio_samples, artifact.mic_samples
            );
            println!("  {}", artifact.path.display());
            if let Some(gif) = &artifact.gif_path {
                println!("  {}", gif.display());
            }
        }
    }

    if report.error.is_some() {
        process::exit(1);
    }
}
