//! # Audio Frame Module
//!
//! A frame is one block of time-domain samples handed to the pitch pipeline
//! per tick, together with the sample rate that produced it.

/// Fixed-size block of mono samples in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Splits a longer recording into consecutive frames of `frame_size` samples.
    ///
    /// Samples that don't fill a whole frame at the end are dropped, the same way
    /// the capture callback only ever emits full frames.
    ///
    /// # Arguments
    /// * `samples` - Mono recording
    /// * `sample_rate` - Sample rate in Hz
    /// * `frame_size` - Samples per frame (must be positive)
    pub fn chunks_from(samples: &[f32], sample_rate: u32, frame_size: usize) -> Vec<AudioFrame> {
        if frame_size == 0 {
            return Vec::new();
        }
        samples
            .chunks_exact(frame_size)
            .map(|chunk| AudioFrame::new(chunk.to_vec(), sample_rate))
            .collect()
    }
}
