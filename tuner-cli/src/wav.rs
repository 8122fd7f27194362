//! WAV input for offline analysis.

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;

/// Decoded mono recording.
#[derive(Debug, Clone)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

pub fn read_file(path: &Path) -> Result<Recording> {
    let reader = WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_mono(reader)
}

/// Reads every sample, scales integers into `[-1, 1]` and averages channels down to mono.
pub fn read_mono<R: Read>(mut reader: WavReader<R>) -> Result<Recording> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV file has no channels");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let samples = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();

    Ok(Recording {
        samples,
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    #[test]
    fn stereo_int16_is_mixed_to_mono() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for (left, right) in [(16384i16, 0i16), (-32768, -32768), (8192, 8192)] {
                writer.write_sample(left).unwrap();
                writer.write_sample(right).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);

        let recording = read_mono(WavReader::new(cursor).unwrap()).unwrap();
        assert_eq!(recording.sample_rate, 22050);
        assert_eq!(recording.samples, vec![0.25, -1.0, 0.25]);
    }

    #[test]
    fn float_samples_pass_through() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for sample in [0.5f32, -0.25, 0.0] {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);

        let recording = read_mono(WavReader::new(cursor).unwrap()).unwrap();
        assert_eq!(recording.samples, vec![0.5, -0.25, 0.0]);
    }
}
