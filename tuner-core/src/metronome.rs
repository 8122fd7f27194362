//! # Metronome Module
//!
//! Beat bookkeeping for the companion metronome: tempo limits, the bar position,
//! accent volumes and the swinging pendulum. Nothing here produces sound or keeps
//! time; callers fire [`Metronome::next_beat`] once per [`Metronome::interval`].

use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

pub const MIN_BPM: u32 = 30;
pub const MAX_BPM: u32 = 300;
pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_BEATS_PER_BAR: u32 = 4;

/// Click volume on the first beat of a bar.
pub const DOWNBEAT_VOLUME: f32 = 1.0;
/// Click volume on every other beat.
pub const BEAT_VOLUME: f32 = 0.6;

/// Clamps a tempo into `[MIN_BPM, MAX_BPM]`.
pub fn clamp_bpm(bpm: u32) -> u32 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Parses user tempo input. Anything unparsable falls to the slowest tempo.
pub fn parse_bpm(input: &str) -> u32 {
    input
        .trim()
        .parse::<i64>()
        .map(|bpm| bpm.clamp(MIN_BPM as i64, MAX_BPM as i64) as u32)
        .unwrap_or(MIN_BPM)
}

/// Parses a beats-per-bar input, defaulting to four.
pub fn parse_beats_per_bar(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(beats) if beats > 0 => beats,
        _ => DEFAULT_BEATS_PER_BAR,
    }
}

/// One metronome click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    /// Position in the bar, starting at 1.
    pub number: u32,
    pub is_downbeat: bool,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metronome {
    bpm: u32,
    beats_per_bar: u32,
    current_beat: u32,
    running: bool,
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new(DEFAULT_BPM, DEFAULT_BEATS_PER_BAR)
    }
}

impl Metronome {
    pub fn new(bpm: u32, beats_per_bar: u32) -> Self {
        Self {
            bpm: clamp_bpm(bpm),
            beats_per_bar: if beats_per_bar == 0 { DEFAULT_BEATS_PER_BAR } else { beats_per_bar },
            current_beat: 1,
            running: false,
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    /// The beat the next click will land on.
    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time between clicks: `60000 / bpm` milliseconds.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm as f64)
    }

    /// Changes the bar length. Takes effect from the next bar position onward.
    pub fn set_beats_per_bar(&mut self, beats_per_bar: u32) {
        self.beats_per_bar = if beats_per_bar == 0 { DEFAULT_BEATS_PER_BAR } else { beats_per_bar };
        if self.current_beat > self.beats_per_bar {
            self.current_beat = 1;
        }
    }

    /// Starts counting from the top of the bar.
    pub fn start(&mut self) {
        self.current_beat = 1;
        self.running = true;
        tracing::debug!(bpm = self.bpm, beats_per_bar = self.beats_per_bar, "metronome started");
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.current_beat = 1;
    }

    /// Emits the current beat and advances to the next one, wrapping at the end of the bar.
    pub fn next_beat(&mut self) -> Beat {
        let number = self.current_beat;
        let is_downbeat = number == 1;
        self.current_beat = number % self.beats_per_bar + 1;
        Beat {
            number,
            is_downbeat,
            volume: if is_downbeat { DOWNBEAT_VOLUME } else { BEAT_VOLUME },
        }
    }

    /// One marker per beat in the bar, the current beat filled in.
    pub fn indicator(&self, current: u32) -> String {
        (1..=self.beats_per_bar)
            .map(|beat| if beat == current { "●" } else { "○" })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Which way the pendulum is swinging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swing {
    LeftToRight,
    RightToLeft,
}

impl Swing {
    fn reversed(self) -> Self {
        match self {
            Swing::LeftToRight => Swing::RightToLeft,
            Swing::RightToLeft => Swing::LeftToRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumPosition {
    /// Progress through the current half swing, 0.0 to 1.0.
    pub phase: f32,
    pub swing: Swing,
    /// Angle from vertical in radians, within ±π/4.
    pub angle: f32,
}

/// Pendulum that completes one half swing per beat, reversing direction on every beat.
#[derive(Debug, Clone, PartialEq)]
pub struct Pendulum {
    beat_duration: Duration,
    last_beat: Duration,
    swing: Swing,
}

impl Pendulum {
    pub fn new(bpm: u32) -> Self {
        Self {
            beat_duration: Duration::from_secs_f64(60.0 / clamp_bpm(bpm) as f64),
            last_beat: Duration::ZERO,
            swing: Swing::LeftToRight,
        }
    }

    /// Position at `elapsed` time since the pendulum started.
    ///
    /// Expects non-decreasing `elapsed` values, as from an animation clock.
    pub fn position(&mut self, elapsed: Duration) -> PendulumPosition {
        while elapsed.saturating_sub(self.last_beat) >= self.beat_duration {
            self.last_beat += self.beat_duration;
            self.swing = self.swing.reversed();
        }
        let since_beat = elapsed.saturating_sub(self.last_beat);
        let phase = (since_beat.as_secs_f32() / self.beat_duration.as_secs_f32()).min(1.0);
        let sweep = phase * 2.0 * FRAC_PI_4;
        let angle = match self.swing {
            Swing::LeftToRight => -FRAC_PI_4 + sweep,
            Swing::RightToLeft => FRAC_PI_4 - sweep,
        };
        PendulumPosition { phase, swing: self.swing, angle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_is_clamped() {
        assert_eq!(Metronome::new(10, 4).bpm(), MIN_BPM);
        assert_eq!(Metronome::new(1000, 4).bpm(), MAX_BPM);
        assert_eq!(parse_bpm("abc"), MIN_BPM);
        assert_eq!(parse_bpm("-20"), MIN_BPM);
        assert_eq!(parse_bpm(" 96 "), 96);
        assert_eq!(parse_bpm("999"), MAX_BPM);
    }

    #[test]
    fn beats_per_bar_defaults() {
        assert_eq!(parse_beats_per_bar(""), 4);
        assert_eq!(parse_beats_per_bar("0"), 4);
        assert_eq!(parse_beats_per_bar("3"), 3);
        assert_eq!(Metronome::new(120, 0).beats_per_bar(), 4);
    }

    #[test]
    fn interval_from_bpm() {
        assert_eq!(Metronome::new(120, 4).interval(), Duration::from_millis(500));
        assert_eq!(Metronome::new(60, 4).interval(), Duration::from_secs(1));
    }

    #[test]
    fn beats_cycle_with_downbeat_accent() {
        let mut metronome = Metronome::new(100, 3);
        metronome.start();
        let beats: Vec<Beat> = (0..7).map(|_| metronome.next_beat()).collect();
        let numbers: Vec<u32> = beats.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 1, 2, 3, 1]);
        assert!(beats[0].is_downbeat && beats[3].is_downbeat);
        assert_eq!(beats[0].volume, DOWNBEAT_VOLUME);
        assert_eq!(beats[1].volume, BEAT_VOLUME);
        assert!(!beats[2].is_downbeat);
    }

    #[test]
    fn restart_returns_to_top_of_bar() {
        let mut metronome = Metronome::default();
        metronome.start();
        metronome.next_beat();
        metronome.next_beat();
        metronome.stop();
        assert!(!metronome.is_running());
        metronome.start();
        assert_eq!(metronome.next_beat().number, 1);
    }

    #[test]
    fn shrinking_bar_resets_position() {
        let mut metronome = Metronome::new(120, 4);
        metronome.start();
        for _ in 0..3 {
            metronome.next_beat();
        }
        assert_eq!(metronome.current_beat(), 4);
        metronome.set_beats_per_bar(2);
        assert_eq!(metronome.current_beat(), 1);
    }

    #[test]
    fn indicator_highlights_current_beat() {
        let metronome = Metronome::new(120, 4);
        assert_eq!(metronome.indicator(2), "○ ● ○ ○");
    }

    #[test]
    fn pendulum_alternates_each_beat() {
        let mut pendulum = Pendulum::new(60);
        let start = pendulum.position(Duration::ZERO);
        assert_eq!(start.swing, Swing::LeftToRight);
        assert!((start.angle + FRAC_PI_4).abs() < 1e-6);

        let middle = pendulum.position(Duration::from_millis(500));
        assert!((middle.phase - 0.5).abs() < 1e-6);
        assert!(middle.angle.abs() < 1e-6);

        let next = pendulum.position(Duration::from_millis(1250));
        assert_eq!(next.swing, Swing::RightToLeft);
        assert!((next.phase - 0.25).abs() < 1e-5);
        assert!((next.angle - FRAC_PI_4 / 2.0).abs() < 1e-5);
    }
}
