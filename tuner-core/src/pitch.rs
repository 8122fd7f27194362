//! # Pitch Detection Module
//!
//! Autocorrelation-based estimation of the fundamental frequency of a single
//! audio frame.
//!
//! ## Pipeline
//! 1. RMS gate rejects near-silent frames
//! 2. Leading and trailing low-level samples are trimmed
//! 3. Autocorrelation of the remaining window (direct or FFT)
//! 4. Skip the zero-lag lobe, then take the highest peak after it
//! 5. Confidence check against the zero-lag energy
//! 6. Parabolic interpolation for sub-sample accuracy

use crate::config::{AutocorrelationMethod, TunerConfig};
use crate::fft;
use crate::frame::AudioFrame;
use tracing::trace;

/// Estimates the fundamental frequency of audio frames.
///
/// Holds only thresholds, so one estimator can serve any number of tuners.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchEstimator {
    /// Frames with an RMS below this are silence.
    pub silence_rms_threshold: f32,
    /// Amplitude below which edge samples are trimmed.
    pub noise_trim_threshold: f32,
    /// Minimum peak-to-zero-lag autocorrelation ratio.
    pub confidence_ratio: f32,
    pub method: AutocorrelationMethod,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::from_config(&TunerConfig::default())
    }
}

impl PitchEstimator {
    pub fn from_config(config: &TunerConfig) -> Self {
        Self {
            silence_rms_threshold: config.silence_rms_threshold,
            noise_trim_threshold: config.noise_trim_threshold,
            confidence_ratio: config.confidence_ratio,
            method: config.autocorrelation,
        }
    }

    /// Estimates the fundamental frequency of one frame.
    ///
    /// # Arguments
    /// * `frame` - Samples in `[-1, 1]` and their sample rate
    ///
    /// # Returns
    /// * `Some(frequency)` - Detected frequency in Hz
    /// * `None` - No pitch detected (silence, noise, weak periodicity or a degenerate window)
    pub fn estimate(&self, frame: &AudioFrame) -> Option<f32> {
        let level = rms(&frame.samples);
        if !(level >= self.silence_rms_threshold) {
            trace!(rms = level, "frame below silence threshold");
            return None;
        }

        let window = trim_noise(&frame.samples, self.noise_trim_threshold)?;
        if window.is_empty() {
            return None;
        }

        let corr = match self.method {
            AutocorrelationMethod::Direct => autocorrelate(window),
            AutocorrelationMethod::Fft => fft::autocorrelate(window),
        };

        let rise = first_rise(&corr);
        let (peak, peak_value) = peak_lag(&corr, rise)?;

        let energy = corr[0];
        if !(energy > 0.0) || peak_value < self.confidence_ratio * energy {
            trace!(peak, peak_value, energy, "autocorrelation peak below confidence ratio");
            return None;
        }

        let lag = peak as f32 + parabolic_offset(&corr, peak).unwrap_or(0.0);
        if !(lag > f32::EPSILON) {
            return None;
        }

        let frequency = frame.sample_rate as f32 / lag;
        (frequency.is_finite() && frequency > 0.0).then_some(frequency)
    }
}

/// Root-mean-square amplitude; zero for an empty signal.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|&s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Cuts away quiet samples at both ends of `signal`.
///
/// The window starts at the first sample with `|s| >= threshold` and stops just
/// before the last such sample, so the last loud sample itself is excluded.
///
/// # Returns
/// * `Some(window)` - The trimmed window (may be empty when only one sample is loud)
/// * `None` - Every sample is below the threshold
pub fn trim_noise(signal: &[f32], threshold: f32) -> Option<&[f32]> {
    let start = signal.iter().position(|s| s.abs() >= threshold)?;
    let end = signal.iter().rposition(|s| s.abs() >= threshold).unwrap_or(start);
    Some(&signal[start..end])
}

/// Direct autocorrelation `c[i] = Σ_j signal[j] · signal[j + i]` for every lag.
pub fn autocorrelate(signal: &[f32]) -> Vec<f32> {
    (0..signal.len())
        .map(|lag| {
            signal[..signal.len() - lag]
                .iter()
                .zip(&signal[lag..])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// First lag at which the autocorrelation stops strictly decreasing.
pub fn first_rise(corr: &[f32]) -> usize {
    let mut lag = 0;
    while lag + 1 < corr.len() && corr[lag] > corr[lag + 1] {
        lag += 1;
    }
    lag
}

/// Highest autocorrelation value at or after `start`.
///
/// Only values above `-1` are considered, and a peak at lag 0 carries no period,
/// so both cases report no peak.
///
/// # Returns
/// * `Some((lag, value))` - Position and height of the maximum
/// * `None` - No usable peak
pub fn peak_lag(corr: &[f32], start: usize) -> Option<(usize, f32)> {
    let mut best = None;
    let mut max_value = -1.0;
    for (lag, &value) in corr.iter().enumerate().skip(start) {
        if value > max_value {
            max_value = value;
            best = Some((lag, value));
        }
    }
    best.filter(|&(lag, _)| lag > 0)
}

/// Sub-sample offset of the vertex of the parabola through `peak` and its neighbours.
///
/// Returns `None` when a neighbour is missing or the three points are collinear.
pub fn parabolic_offset(corr: &[f32], peak: usize) -> Option<f32> {
    if peak == 0 || peak + 1 >= corr.len() {
        return None;
    }
    let (x1, x2, x3) = (corr[peak - 1], corr[peak], corr[peak + 1]);
    let a = (x1 + x3 - 2.0 * x2) / 2.0;
    let b = (x3 - x1) / 2.0;
    if a == 0.0 {
        return None;
    }
    let offset = -b / (2.0 * a);
    offset.is_finite().then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_constant_signal() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn trim_excludes_last_loud_sample() {
        let signal = [0.0, 0.05, 0.5, -0.3, 0.2, 0.05, 0.0];
        assert_eq!(trim_noise(&signal, 0.1), Some(&signal[2..4]));
    }

    #[test]
    fn trim_of_quiet_signal_is_none() {
        assert_eq!(trim_noise(&[0.01, -0.05, 0.09], 0.1), None);
    }

    #[test]
    fn trim_with_single_loud_sample_is_empty() {
        assert_eq!(trim_noise(&[0.0, 0.9, 0.0], 0.1), Some(&[][..]));
    }

    #[test]
    fn direct_autocorrelation_values() {
        let corr = autocorrelate(&[1.0, 2.0, 3.0]);
        assert_eq!(corr, vec![14.0, 8.0, 3.0]);
    }

    #[test]
    fn first_rise_skips_zero_lag_lobe() {
        assert_eq!(first_rise(&[10.0, 6.0, 2.0, 3.0, 8.0, 4.0]), 2);
        assert_eq!(first_rise(&[5.0, 4.0, 3.0]), 2);
        assert_eq!(first_rise(&[]), 0);
    }

    #[test]
    fn peak_lag_after_rise() {
        let corr = [10.0, 6.0, 2.0, 3.0, 8.0, 4.0];
        assert_eq!(peak_lag(&corr, 2), Some((4, 8.0)));
    }

    #[test]
    fn peak_at_zero_lag_is_rejected() {
        assert_eq!(peak_lag(&[1.0], 0), None);
        assert_eq!(peak_lag(&[-2.0, -3.0], 0), None);
    }

    #[test]
    fn parabola_vertex() {
        // Samples of -(x - 2.25)^2 at x = 1, 2, 3.
        let f = |x: f32| -(x - 2.25) * (x - 2.25);
        let corr = [f(0.0), f(1.0), f(2.0), f(3.0)];
        let offset = parabolic_offset(&corr, 2).unwrap();
        assert!((offset - 0.25).abs() < 1e-5);
    }

    #[test]
    fn parabola_guards() {
        assert_eq!(parabolic_offset(&[1.0, 2.0], 1), None);
        assert_eq!(parabolic_offset(&[1.0, 2.0, 3.0], 0), None);
        assert_eq!(parabolic_offset(&[1.0, 2.0, 3.0, 4.0], 1), None);
    }

    #[test]
    fn isolated_click_fails_confidence() {
        let mut samples = vec![0.0; 2048];
        samples[1000] = 1.0;
        samples[1500] = 1.0;
        let frame = AudioFrame::new(samples, 44100);
        assert_eq!(PitchEstimator::default().estimate(&frame), None);
    }

    #[test]
    fn quiet_but_not_silent_frame_is_trimmed_away() {
        let samples: Vec<f32> = (0..2048)
            .map(|i| 0.05 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let frame = AudioFrame::new(samples, 44100);
        assert_eq!(PitchEstimator::default().estimate(&frame), None);
    }
}
