// tuner-core/src/lib.rs

//! The core logic for the instrument tuner.
//! This crate is responsible for pitch detection, temporal smoothing,
//! note mapping and metronome beat keeping. It is completely headless:
//! audio arrives as [`AudioFrame`]s and results leave as [`AnalysisResult`]s,
//! one per tick, at whatever cadence the caller drives.

#[cfg(feature = "capture")]
pub mod audio;
pub mod config;
pub mod fft;
pub mod frame;
pub mod metronome;
pub mod pitch;
pub mod smoothing;
pub mod tuning;

pub use config::{AutocorrelationMethod, TunerConfig};
pub use frame::AudioFrame;
pub use pitch::PitchEstimator;
pub use smoothing::{Smoother, TunerState};
pub use tuning::{NoteLabel, NoteResult};

/// Represents the result of a single tick of the pitch pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// This frame's raw estimate, before smoothing.
    pub raw_frequency: Option<f32>,
    /// The frequency to display.
    pub smoothed_frequency: Option<f32>,
    /// Nearest note to the smoothed frequency.
    pub note: Option<NoteResult>,
    /// Consecutive ticks without a usable estimate.
    pub silence_frames: u32,
}

impl AnalysisResult {
    pub fn is_silent(&self) -> bool {
        self.smoothed_frequency.is_none()
    }
}

/// Runs one tick: estimate, smooth, map to a note.
///
/// # Arguments
/// * `estimator` - Pitch estimator
/// * `smoother` - Smoothing and silence policy
/// * `reference_pitch` - Frequency of A4 in Hz
/// * `state` - The tuner's state, updated in place
/// * `frame` - This tick's audio
pub fn process_frame(
    estimator: &PitchEstimator,
    smoother: &Smoother,
    reference_pitch: f32,
    state: &mut TunerState,
    frame: &AudioFrame,
) -> AnalysisResult {
    let raw_frequency = estimator.estimate(frame);
    let smoothed_frequency = smoother.update(state, raw_frequency);
    let note = smoothed_frequency.and_then(|f| tuning::map_to_note(f, reference_pitch));

    AnalysisResult {
        raw_frequency,
        smoothed_frequency,
        note,
        silence_frames: state.silence_frame_count,
    }
}

/// A single tuner instance owning its own state.
#[derive(Debug, Clone)]
pub struct Tuner {
    estimator: PitchEstimator,
    smoother: Smoother,
    reference_pitch: f32,
    state: TunerState,
}

impl Default for Tuner {
    fn default() -> Self {
        Self::new(&TunerConfig::default())
    }
}

impl Tuner {
    pub fn new(config: &TunerConfig) -> Self {
        Self {
            estimator: PitchEstimator::from_config(config),
            smoother: Smoother::from_config(config),
            reference_pitch: config.reference_pitch,
            state: TunerState::default(),
        }
    }

    pub fn process_frame(&mut self, frame: &AudioFrame) -> AnalysisResult {
        process_frame(
            &self.estimator,
            &self.smoother,
            self.reference_pitch,
            &mut self.state,
            frame,
        )
    }

    pub fn state(&self) -> &TunerState {
        &self.state
    }

    pub fn reference_pitch(&self) -> f32 {
        self.reference_pitch
    }

    pub fn set_reference_pitch(&mut self, reference_pitch: f32) {
        if reference_pitch > 0.0 && reference_pitch.is_finite() {
            self.reference_pitch = reference_pitch;
        }
    }

    /// Forgets the held frequency and the silence count.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}
