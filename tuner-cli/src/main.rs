//! # Tuner - Command-line front end
//!
//! Feeds audio frames into `tuner-core` and prints one reading per tick.
//!
//! ## Commands
//! - **analyze**: run the pipeline over a WAV file, one tick per frame
//! - **listen**: live microphone input (built with the `capture` feature)
//! - **metronome**: print the beat indicator at a given tempo
//! - **config**: print the default configuration as JSON

mod display;
mod wav;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tuner_core::metronome::{self, Metronome};
use tuner_core::{AudioFrame, AutocorrelationMethod, Tuner, TunerConfig};

#[derive(Parser, Debug)]
#[command(name = "tuner", version, about = "Instrument tuner and metronome")]
struct Cli {
    /// JSON config file; missing fields use defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Frequency of A4 in Hz, overriding the config
    #[arg(short = 'a', long, global = true)]
    reference_pitch: Option<f32>,

    /// Use FFT autocorrelation instead of the direct sum
    #[arg(long, global = true)]
    fft: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a WAV file frame by frame
    Analyze {
        file: PathBuf,
        /// Only print ticks where the display changes between note and silence or note name
        #[arg(long)]
        changes: bool,
    },
    /// Tune from the default microphone
    Listen {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<f64>,
    },
    /// Run the metronome beat indicator
    Metronome {
        #[arg(long, default_value = "120")]
        bpm: String,
        #[arg(long, default_value = "4")]
        beats_per_bar: String,
        /// Number of bars to play
        #[arg(long, default_value_t = 4)]
        bars: u32,
    },
    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Command::Analyze { file, changes } => analyze(&config, &file, changes),
        Command::Listen { seconds } => listen(&config, seconds),
        Command::Metronome {
            bpm,
            beats_per_bar,
            bars,
        } => run_metronome(&bpm, &beats_per_bar, bars),
        Command::Config => {
            println!("{}", TunerConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> Result<TunerConfig> {
    let mut config = match &cli.config {
        Some(path) => TunerConfig::load(path)?,
        None => TunerConfig::default(),
    };
    if let Some(reference_pitch) = cli.reference_pitch {
        config.reference_pitch = reference_pitch;
    }
    if cli.fft {
        config.autocorrelation = AutocorrelationMethod::Fft;
    }
    config.validate()?;
    Ok(config)
}

fn analyze(config: &TunerConfig, file: &Path, changes: bool) -> Result<()> {
    let recording = wav::read_file(file)?;
    let frames = AudioFrame::chunks_from(&recording.samples, recording.sample_rate, config.frame_size);
    if frames.is_empty() {
        bail!(
            "{} is shorter than one frame ({} samples)",
            file.display(),
            config.frame_size
        );
    }
    info!(
        file = %file.display(),
        sample_rate = recording.sample_rate,
        frames = frames.len(),
        "analyzing recording"
    );

    let mut tuner = Tuner::new(config);
    let mut detected = 0usize;
    let mut last_label: Option<String> = None;
    for (index, frame) in frames.iter().enumerate() {
        let result = tuner.process_frame(frame);
        if result.raw_frequency.is_some() {
            detected += 1;
        }
        let label = result.note.map(|n| n.note.to_string());
        if changes && label == last_label {
            continue;
        }
        last_label = label;
        let seconds = (index * config.frame_size) as f64 / recording.sample_rate as f64;
        println!("{seconds:>8.3}s  {}", display::format_reading(&result));
    }

    info!(detected, total = frames.len(), "analysis finished");
    Ok(())
}

#[cfg(feature = "capture")]
fn listen(config: &TunerConfig, seconds: Option<f64>) -> Result<()> {
    use crossbeam_channel::{after, never, select};
    use std::time::Duration;
    use tuner_core::audio;

    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<AudioFrame>(4);
    let (stream, sample_rate) = audio::start_audio_capture(frame_tx, config.frame_size)?;
    info!(sample_rate, "listening");

    let deadline = match seconds {
        Some(s) if s > 0.0 => after(Duration::from_secs_f64(s)),
        _ => never(),
    };

    let mut tuner = Tuner::new(config);
    loop {
        select! {
            recv(frame_rx) -> msg => match msg {
                Ok(frame) => {
                    let result = tuner.process_frame(&frame);
                    println!("{}", display::format_reading(&result));
                }
                Err(_) => {
                    warn!("audio channel closed");
                    break;
                }
            },
            recv(deadline) -> _ => break,
        }
    }

    drop(stream);
    info!("stopped listening");
    Ok(())
}

#[cfg(not(feature = "capture"))]
fn listen(_config: &TunerConfig, _seconds: Option<f64>) -> Result<()> {
    bail!("live input needs the `capture` feature (cargo build --features capture)")
}

fn run_metronome(bpm: &str, beats_per_bar: &str, bars: u32) -> Result<()> {
    let mut metronome = Metronome::new(
        metronome::parse_bpm(bpm),
        metronome::parse_beats_per_bar(beats_per_bar),
    );
    let total_beats = bars.saturating_mul(metronome.beats_per_bar());
    if total_beats == 0 {
        warn!("nothing to play");
        return Ok(());
    }

    info!(bpm = metronome.bpm(), beats_per_bar = metronome.beats_per_bar(), bars, "metronome");
    metronome.start();
    println!("{}", metronome.indicator(metronome.current_beat()));

    let ticker = crossbeam_channel::tick(metronome.interval());
    for _ in 0..total_beats {
        if ticker.recv().is_err() {
            break;
        }
        let beat = metronome.next_beat();
        println!(
            "{}  {}",
            metronome.indicator(beat.number),
            if beat.is_downbeat { "TICK" } else { "tick" }
        );
    }
    metronome.stop();
    Ok(())
}
