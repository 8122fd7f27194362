//! # Configuration Module
//!
//! Every tunable constant of the pitch pipeline lives in [`TunerConfig`].
//! Configs are plain JSON on disk; any field left out falls back to its default,
//! so a file containing `{ "reference_pitch": 442.0 }` is a complete config.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which autocorrelation routine the pitch estimator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutocorrelationMethod {
    /// Nested-loop sum over every lag, O(n²).
    #[default]
    Direct,
    /// Wiener–Khinchin through a zero-padded FFT, O(n log n).
    Fft,
}

/// Adjustable parameters for frame capture, estimation, smoothing and note mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Number of samples per analysis frame.
    pub frame_size: usize,
    /// Frames with an RMS below this are treated as silence.
    pub silence_rms_threshold: f32,
    /// Leading and trailing samples quieter than this are trimmed before autocorrelation.
    pub noise_trim_threshold: f32,
    /// The chosen autocorrelation peak must reach this fraction of the zero-lag energy.
    pub confidence_ratio: f32,
    /// Consecutive undetected ticks tolerated before the display is cleared.
    pub silence_frame_threshold: u32,
    /// Per-tick multiplicative decay applied to a held frequency during dropouts.
    pub decay_factor: f32,
    /// Smoothing strength `s`; the blend factor is `clamp(s / 10, 0.05, 1)`.
    pub smoothing_strength: f32,
    /// Estimates at or above this frequency are discarded as implausible.
    pub max_plausible_hz: f32,
    /// Frequency of A4 in Hz.
    pub reference_pitch: f32,
    pub autocorrelation: AutocorrelationMethod,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            silence_rms_threshold: 0.01,
            noise_trim_threshold: 0.1,
            confidence_ratio: 0.1,
            silence_frame_threshold: 8,
            decay_factor: 0.985,
            smoothing_strength: 6.0,
            max_plausible_hz: 5000.0,
            reference_pitch: 440.0,
            autocorrelation: AutocorrelationMethod::Direct,
        }
    }
}

impl TunerConfig {
    /// Loads a config from a JSON file and validates it.
    ///
    /// # Arguments
    /// * `path` - Path of the JSON file (e.g., "tuner.json")
    ///
    /// # Returns
    /// * `Ok(TunerConfig)` - Parsed config, defaults filled in for missing fields
    /// * `Err(e)` - File could not be read, parsed, or failed validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&data)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded tuner config");
        Ok(config)
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TunerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 {
            bail!("frame_size must be positive");
        }
        if !(self.reference_pitch > 0.0) {
            bail!("reference_pitch must be positive, got {}", self.reference_pitch);
        }
        if !(self.max_plausible_hz > 0.0) {
            bail!("max_plausible_hz must be positive, got {}", self.max_plausible_hz);
        }
        for (name, value) in [
            ("silence_rms_threshold", self.silence_rms_threshold),
            ("noise_trim_threshold", self.noise_trim_threshold),
            ("confidence_ratio", self.confidence_ratio),
            ("smoothing_strength", self.smoothing_strength),
        ] {
            if !(value >= 0.0) {
                bail!("{name} must be non-negative, got {value}");
            }
        }
        if !(self.decay_factor > 0.0 && self.decay_factor <= 1.0) {
            bail!("decay_factor must be in (0, 1], got {}", self.decay_factor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = TunerConfig::default();
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.silence_frame_threshold, 8);
        assert_eq!(config.reference_pitch, 440.0);
        assert_eq!(config.autocorrelation, AutocorrelationMethod::Direct);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = TunerConfig::from_json(r#"{ "reference_pitch": 442.0, "autocorrelation": "fft" }"#).unwrap();
        assert_eq!(config.reference_pitch, 442.0);
        assert_eq!(config.autocorrelation, AutocorrelationMethod::Fft);
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.decay_factor, 0.985);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(TunerConfig::from_json(r#"{ "frame_size": 0 }"#).is_err());
        assert!(TunerConfig::from_json(r#"{ "decay_factor": 1.5 }"#).is_err());
        assert!(TunerConfig::from_json(r#"{ "reference_pitch": -440.0 }"#).is_err());
        assert!(TunerConfig::from_json(r#"{ "confidence_ratio": -0.1 }"#).is_err());
        assert!(TunerConfig::from_json("not json").is_err());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("tuner-config-{}.json", std::process::id()));
        let config = TunerConfig {
            smoothing_strength: 3.0,
            ..TunerConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = TunerConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
