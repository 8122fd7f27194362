//! # Musical Tuning Module
//!
//! Converts frequencies to equal-tempered notes using MIDI-style numbering
//! (A4 = 69) relative to an adjustable reference pitch.
//!
//! ## Features
//! - Note name, octave and cents deviation for any frequency
//! - Neighbouring note labels that wrap across octave boundaries
//! - Note label parsing ("C#3", "Bb2") and the inverse frequency formula
//! - Gauge reading with display clamping and an in-tune zone

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;

/// Chromatic pitch class names, starting at C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI note number of A4.
pub const A4_NOTE_NUMBER: i32 = 69;

/// Half-width of the gauge in cents.
pub const GAUGE_RANGE_CENTS: i32 = 50;

/// Deviation, in cents, still shown as in tune.
pub const IN_TUNE_CENTS: i32 = 10;

/// A note name with its octave, e.g. `A#4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLabel {
    /// Index into [`NOTE_NAMES`].
    pub pitch_class: usize,
    pub octave: i32,
}

impl NoteLabel {
    pub fn from_note_number(note_number: i32) -> Self {
        Self {
            pitch_class: note_number.rem_euclid(12) as usize,
            octave: note_number.div_euclid(12) - 1,
        }
    }

    pub fn note_number(&self) -> i32 {
        (self.octave + 1) * 12 + self.pitch_class as i32
    }

    pub fn name(&self) -> &'static str {
        NOTE_NAMES[self.pitch_class]
    }
}

impl fmt::Display for NoteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

/// Nearest note to a frequency and how far off it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteResult {
    pub note: NoteLabel,
    pub note_number: i32,
    /// Signed deviation from `note` in cents. Not clamped.
    pub cents: i32,
    /// The semitone below.
    pub left: NoteLabel,
    /// The semitone above.
    pub right: NoteLabel,
}

/// Lookup from note labels to MIDI note numbers, covering 0..=127 with sharp and flat spellings.
static NOTE_MAP: Lazy<BTreeMap<String, i32>> = Lazy::new(|| {
    const FLATS: [(usize, &str); 5] = [(1, "Db"), (3, "Eb"), (6, "Gb"), (8, "Ab"), (10, "Bb")];
    let mut map = BTreeMap::new();
    for note_number in 0..=127 {
        let label = NoteLabel::from_note_number(note_number);
        map.insert(label.to_string(), note_number);
        if let Some((_, flat)) = FLATS.iter().find(|(pc, _)| *pc == label.pitch_class) {
            map.insert(format!("{}{}", flat, label.octave), note_number);
        }
    }
    map
});

/// Rounds halves towards positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Fractional MIDI note number of a frequency.
pub fn note_number(frequency: f32, reference_pitch: f32) -> f64 {
    12.0 * (f64::from(frequency) / f64::from(reference_pitch)).log2() + f64::from(A4_NOTE_NUMBER)
}

/// Maps a frequency to its nearest note.
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `reference_pitch` - Frequency of A4 in Hz (usually 440)
///
/// # Returns
/// * `Some(NoteResult)` - Nearest note, cents deviation and neighbours
/// * `None` - Frequency (or reference) is zero, negative or not finite
pub fn map_to_note(frequency: f32, reference_pitch: f32) -> Option<NoteResult> {
    if !(frequency > 0.0 && frequency.is_finite() && reference_pitch > 0.0 && reference_pitch.is_finite()) {
        return None;
    }
    let exact = note_number(frequency, reference_pitch);
    let rounded = round_half_up(exact);
    let cents = round_half_up((exact - rounded) * 100.0) as i32;
    let note_number = rounded as i32;

    Some(NoteResult {
        note: NoteLabel::from_note_number(note_number),
        note_number,
        cents,
        left: NoteLabel::from_note_number(note_number - 1),
        right: NoteLabel::from_note_number(note_number + 1),
    })
}

/// Frequency of a note number shifted by `cents`: `ref · 2^((n + cents/100 - 69) / 12)`.
pub fn note_frequency(note_number: i32, cents: f32, reference_pitch: f32) -> f32 {
    let semitones = f64::from(note_number - A4_NOTE_NUMBER) + f64::from(cents) / 100.0;
    (f64::from(reference_pitch) * 2f64.powf(semitones / 12.0)) as f32
}

/// Parses a label like "A4", "C#3" or "Bb2" into a MIDI note number.
pub fn parse_note_label(label: &str) -> Option<i32> {
    NOTE_MAP.get(label.trim()).copied()
}

/// Cents deviation as the gauge shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeReading {
    /// Deviation clamped to ±[`GAUGE_RANGE_CENTS`].
    pub cents: i32,
    pub in_tune: bool,
}

impl GaugeReading {
    pub fn from_cents(cents: i32) -> Self {
        Self {
            cents: cents.clamp(-GAUGE_RANGE_CENTS, GAUGE_RANGE_CENTS),
            in_tune: cents.abs() <= IN_TUNE_CENTS,
        }
    }

    /// Needle position from 0.0 (fully flat) to 1.0 (fully sharp).
    pub fn needle_position(&self) -> f32 {
        (self.cents + GAUGE_RANGE_CENTS) as f32 / (2 * GAUGE_RANGE_CENTS) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a440_is_a4() {
        let note = map_to_note(440.0, 440.0).unwrap();
        assert_eq!(note.note.name(), "A");
        assert_eq!(note.note.octave, 4);
        assert_eq!(note.cents, 0);
        assert_eq!(note.note_number, 69);
        assert_eq!(note.left.to_string(), "G#4");
        assert_eq!(note.right.to_string(), "A#4");
    }

    #[test]
    fn a_sharp_4() {
        let note = map_to_note(466.16, 440.0).unwrap();
        assert_eq!(note.note.to_string(), "A#4");
        assert_eq!(note.cents, 0);
    }

    #[test]
    fn reference_pitch_shifts_mapping() {
        let note = map_to_note(442.0, 442.0).unwrap();
        assert_eq!(note.note.to_string(), "A4");
        assert_eq!(note.cents, 0);
        let sharp = map_to_note(442.0, 440.0).unwrap();
        assert_eq!(sharp.cents, 8);
    }

    #[test]
    fn invalid_frequencies_are_absent() {
        assert_eq!(map_to_note(0.0, 440.0), None);
        assert_eq!(map_to_note(-12.0, 440.0), None);
        assert_eq!(map_to_note(f32::NAN, 440.0), None);
        assert_eq!(map_to_note(440.0, 0.0), None);
    }

    #[test]
    fn neighbours_wrap_across_octaves() {
        let b3 = map_to_note(note_frequency(59, 0.0, 440.0), 440.0).unwrap();
        assert_eq!(b3.note.to_string(), "B3");
        assert_eq!(b3.right.to_string(), "C4");
        assert_eq!(b3.left.to_string(), "A#3");

        let c4 = map_to_note(261.63, 440.0).unwrap();
        assert_eq!(c4.note.to_string(), "C4");
        assert_eq!(c4.left.to_string(), "B3");
        assert_eq!(c4.right.to_string(), "C#4");
    }

    #[test]
    fn negative_octaves() {
        let label = NoteLabel::from_note_number(-1);
        assert_eq!(label.to_string(), "B-2");
        assert_eq!(label.note_number(), -1);
        assert_eq!(NoteLabel::from_note_number(0).to_string(), "C-1");
    }

    #[test]
    fn rounds_to_nearest_semitone() {
        let note = map_to_note(note_frequency(69, 60.0, 440.0), 440.0).unwrap();
        assert_eq!(note.note.to_string(), "A#4");
        assert_eq!(note.cents, -40);

        let note = map_to_note(note_frequency(69, -45.0, 440.0), 440.0).unwrap();
        assert_eq!(note.note.to_string(), "A4");
        assert_eq!(note.cents, -45);
    }

    #[test]
    fn parses_labels() {
        assert_eq!(parse_note_label("A4"), Some(69));
        assert_eq!(parse_note_label("C#3"), Some(49));
        assert_eq!(parse_note_label("Db3"), Some(49));
        assert_eq!(parse_note_label(" C-1 "), Some(0));
        assert_eq!(parse_note_label("H2"), None);
    }

    #[test]
    fn gauge_clamps_and_flags() {
        let reading = GaugeReading::from_cents(73);
        assert_eq!(reading.cents, 50);
        assert!(!reading.in_tune);
        assert_eq!(reading.needle_position(), 1.0);

        let reading = GaugeReading::from_cents(-10);
        assert!(reading.in_tune);
        assert!((reading.needle_position() - 0.4).abs() < 1e-6);
    }
}
