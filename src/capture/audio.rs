//! Microphone capture for the generic backend
//!
//! Uses cpal for the default input device. Raw samples are converted to
//! interleaved f32 PCM and routed as microphone stream samples; AAC
//! encoding happens later, in the container writer's track input. cpal
//! requires a dedicated thread for the stream lifetime.

use anyhow::{Result, anyhow};
use bytes::Bytes;
use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::router::SampleRouter;
use crate::pipeline::types::{SampleBuffer, StreamKind, Timestamp};

pub struct MicCapture;

impl MicCapture {
    /// Start microphone capture, delivering PCM chunks to the router
    /// until the token is cancelled.
    ///
    /// `clock_start` is the capture clock zero shared with the other
    /// delivery contexts, so microphone timestamps line up with video.
    pub fn start(
        cancel: CancellationToken,
        router: SampleRouter,
        clock_start: Instant,
    ) -> Result<()> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No default input device found"))?;

        let config = device
            .default_input_config()
            .map_err(|e| anyhow!("Failed to get default input config: {}", e))?;

        info!("Microphone capture config: {:?}", config);

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();
        let sample_format = config.sample_format();

        thread::spawn(move || {
            let deliver = move |samples: &[f32]| {
                let mut data = Vec::with_capacity(samples.len() * 4);
                for s in samples {
                    data.extend_from_slice(&s.to_le_bytes());
                }
                let pts = Timestamp::from_duration(clock_start.elapsed());
                router.route(SampleBuffer::audio(
                    StreamKind::Microphone,
                    Bytes::from(data),
                    pts,
                    sample_rate,
                    channels,
                ));
            };

            let err_fn = |err| error!("Microphone stream error: {}", err);

            let run = move || -> Result<()> {
                let stream = match sample_format {
                    SampleFormat::F32 => device.build_input_stream(
                        &config.into(),
                        move |data: &[f32], _: &_| deliver(data),
                        err_fn,
                        None,
                    )?,
                    SampleFormat::I16 => device.build_input_stream(
                        &config.into(),
                        move |data: &[i16], _: &_| {
                            let floats: Vec<f32> =
                                data.iter().map(|s| *s as f32 / 32_768.0).collect();
                            deliver(&floats);
                        },
                        err_fn,
                        None,
                    )?,
                    SampleFormat::I32 => device.build_input_stream(
                        &config.into(),
                        move |data: &[i32], _: &_| {
                            let floats: Vec<f32> =
                                data.iter().map(|s| *s as f32 / 2_147_483_648.0).collect();
                            deliver(&floats);
                        },
                        err_fn,
                        None,
                    )?,
                    other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
                };

                stream.play()?;
                info!("Microphone capture started");

                while !cancel.is_cancelled() {
                    thread::sleep(Duration::from_millis(100));
                }

                stream.pause()?;
                info!("Microphone capture stopped");
                Ok(())
            };

            if let Err(e) = run() {
                error!("Microphone capture failed: {}", e);
            }
        });

        Ok(())
    }
}
