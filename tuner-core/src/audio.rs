//! # Audio Capture Module
//!
//! Real-time microphone capture using CPAL (Cross-Platform Audio Library).
//! Captured samples are accumulated and handed to the analysis side as full
//! [`AudioFrame`]s over a channel. Only built with the `capture` feature.

use crate::frame::AudioFrame;
use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use tracing::{error, info, warn};

/// Preferred capture rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Starts audio capture from the default input device.
///
/// # Arguments
/// * `sender` - Channel the full frames are sent on
/// * `frame_size` - Samples per frame
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and its sample rate
/// * `Err(e)` - No input device, no usable format, or the stream failed to start
pub fn start_audio_capture(sender: Sender<AudioFrame>, frame_size: usize) -> Result<(cpal::Stream, u32)> {
    if frame_size == 0 {
        return Err(anyhow!("frame size must be positive"));
    }
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    let device_name = device.name()?;
    info!(device = %device_name, "using audio input device");

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let channels = config.channels() as usize;
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    info!(sample_rate, channels, frame_size, "selected capture format");

    let err_fn = |err| error!("audio stream error: {}", err);

    let mut audio_buffer: Vec<f32> = Vec::with_capacity(frame_size * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Keep the first channel of interleaved input.
            audio_buffer.extend(data.iter().step_by(channels.max(1)));

            while audio_buffer.len() >= frame_size {
                let frame = AudioFrame::new(audio_buffer[..frame_size].to_vec(), sample_rate);
                if sender.try_send(frame).is_err() {
                    warn!("analysis is behind, dropping frame");
                }
                audio_buffer.drain(..frame_size);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the f32 input format closest to `target_rate`, preferring mono.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            let in_range = c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0;
            let rate_penalty = if in_range { 0 } else { min_diff.min(max_diff) };
            (c.channels() != 1, rate_penalty)
        })
}
