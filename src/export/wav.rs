//! WAV file export functionality

use std::path::Path;

use super::ExportConfig;
use crate::Result;

/// Write rendered samples to a 16-bit PCM WAV file
///
/// The samples are post-processed according to `config` first. Stereo
/// output duplicates the mono signal.
///
/// # Examples
///
/// ```no_run
/// use ym2149_synth::{write_wav, ExportConfig, Ym2149};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut chip = Ym2149::new(44_100)?;
/// chip.write_register(0x08, 0x0F)?;
/// let samples = chip.generate_samples(44_100);
///
/// write_wav("output.wav", &samples, ExportConfig::stereo().center(true))?;
/// # Ok(())
/// # }
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], config: ExportConfig) -> Result<()> {
    let mut processed = samples.to_vec();
    config.apply(&mut processed);

    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    log::info!(
        "Writing {} samples ({:.1}s) to {}",
        processed.len(),
        processed.len() as f32 / config.sample_rate as f32,
        path.as_ref().display()
    );

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    for &sample in &processed {
        let value = to_i16(sample);
        for _ in 0..config.channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Convert a float sample to 16-bit PCM
#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_i16() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-1.0), -i16::MAX);
    }
}
