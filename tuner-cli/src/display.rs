//! Text rendering of tuner readings.

use tuner_core::AnalysisResult;
use tuner_core::tuning::GaugeReading;

/// Gauge cells from -50 to +50 cents in 5-cent steps.
const GAUGE_CELLS: usize = 21;

/// Draws the cents gauge, e.g. `[----------|--^-------]`.
pub fn gauge(cents: Option<i32>) -> String {
    let center = GAUGE_CELLS / 2;
    let needle = cents.map(|c| {
        let reading = GaugeReading::from_cents(c);
        (reading.needle_position() * (GAUGE_CELLS - 1) as f32).round() as usize
    });
    let cells: String = (0..GAUGE_CELLS)
        .map(|i| match needle {
            Some(n) if n == i => '^',
            _ if i == center => '|',
            _ => '-',
        })
        .collect();
    format!("[{cells}]")
}

/// One status line per tick.
pub fn format_reading(result: &AnalysisResult) -> String {
    match (&result.note, result.smoothed_frequency) {
        (Some(note), Some(frequency)) => {
            let reading = GaugeReading::from_cents(note.cents);
            format!(
                "{:<4} {:>8.2} Hz {:+4} cents {} {} ({} | {})",
                note.note.to_string(),
                frequency,
                note.cents,
                gauge(Some(note.cents)),
                if reading.in_tune { "*" } else { " " },
                note.left,
                note.right,
            )
        }
        _ => format!("{:<4} {:>8} Hz {:>4} cents {}   (- | -)", "—", "-", "-", gauge(None)),
    }
}
