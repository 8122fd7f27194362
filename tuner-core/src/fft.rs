//! # Fast Fourier Transform (FFT) Module
//!
//! FFT-based autocorrelation, a drop-in replacement for the direct O(n²) loop in
//! [`crate::pitch`]. By the Wiener–Khinchin theorem the autocorrelation is the
//! inverse transform of the power spectrum; the signal is zero-padded to at least
//! `2n - 1` samples so the circular correlation equals the linear one.

use rustfft::{FftPlanner, num_complex::Complex};

/// Computes `c[i] = Σ_j signal[j] · signal[j + i]` for every lag `i` in `0..signal.len()`.
///
/// # Arguments
/// * `signal` - Trimmed working window
///
/// # Returns
/// * `Vec<f32>` - Autocorrelation with the same length as `signal`
pub fn autocorrelate(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let padded_len = (2 * n - 1).next_power_of_two();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(padded_len);
    let inv_fft = planner.plan_fft_inverse(padded_len);

    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&sample| Complex { re: sample, im: 0.0 })
        .chain(std::iter::repeat(Complex { re: 0.0, im: 0.0 }))
        .take(padded_len)
        .collect();

    fft.process(&mut buffer);
    for bin in buffer.iter_mut() {
        *bin = Complex { re: bin.norm_sqr(), im: 0.0 };
    }
    inv_fft.process(&mut buffer);

    // rustfft leaves both directions unnormalized.
    let scale = 1.0 / padded_len as f32;
    buffer.iter().take(n).map(|c| c.re * scale).collect()
}
