//! # Smoothing Module
//!
//! Temporal stabilization of raw pitch estimates. Detected pitches are blended
//! exponentially into the displayed frequency; short dropouts decay the held value
//! instead of blanking it, and a long enough run of dropouts clears it.

use crate::config::TunerConfig;
use tracing::debug;

/// Per-tuner state carried from one tick to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TunerState {
    /// Frequency shown on the previous tick, if any.
    pub last_smoothed_frequency: Option<f32>,
    /// Consecutive ticks without a usable estimate.
    pub silence_frame_count: u32,
}

impl TunerState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Blend factor for a smoothing strength: `clamp(strength / 10, 0.05, 1)`.
pub fn smoothing_alpha(strength: f32) -> f32 {
    (strength / 10.0).clamp(0.05, 1.0)
}

/// Exponential smoothing of `current` into `previous`. The first detection passes through.
pub fn blend(previous: Option<f32>, current: f32, alpha: f32) -> f32 {
    match previous {
        Some(prev) => prev * (1.0 - alpha) + current * alpha,
        None => current,
    }
}

/// Applies the smoothing and silence policy to a stream of estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct Smoother {
    pub alpha: f32,
    pub silence_frame_threshold: u32,
    pub decay_factor: f32,
    pub max_plausible_hz: f32,
}

impl Default for Smoother {
    fn default() -> Self {
        Self::from_config(&TunerConfig::default())
    }
}

impl Smoother {
    pub fn from_config(config: &TunerConfig) -> Self {
        Self {
            alpha: smoothing_alpha(config.smoothing_strength),
            silence_frame_threshold: config.silence_frame_threshold,
            decay_factor: config.decay_factor,
            max_plausible_hz: config.max_plausible_hz,
        }
    }

    /// Whether an estimate is a usable pitch.
    pub fn accepts(&self, estimate: Option<f32>) -> bool {
        matches!(estimate, Some(f) if f.is_finite() && f > 0.0 && f < self.max_plausible_hz)
    }

    /// Folds one raw estimate into `state` and returns the frequency to display.
    ///
    /// # Arguments
    /// * `state` - The tuner's state, updated in place
    /// * `estimate` - This tick's raw estimate, `None` when undetected
    ///
    /// # Returns
    /// * `Some(frequency)` - Smoothed (or decaying) frequency to display
    /// * `None` - Nothing to display
    pub fn update(&self, state: &mut TunerState, estimate: Option<f32>) -> Option<f32> {
        let next = match estimate {
            Some(frequency) if self.accepts(estimate) => {
                state.silence_frame_count = 0;
                Some(blend(state.last_smoothed_frequency, frequency, self.alpha))
            }
            _ => {
                state.silence_frame_count = state.silence_frame_count.saturating_add(1);
                if state.silence_frame_count > self.silence_frame_threshold {
                    if state.last_smoothed_frequency.is_some() {
                        debug!(ticks = state.silence_frame_count, "silence held too long, clearing pitch");
                    }
                    None
                } else {
                    state.last_smoothed_frequency.map(|f| f * self.decay_factor)
                }
            }
        };
        state.last_smoothed_frequency = next;
        next
    }
}
