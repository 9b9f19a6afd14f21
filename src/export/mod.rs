//! Offline audio export
//!
//! Post-processing (centering, normalization, fade-out) and WAV writing for
//! rendered sample buffers.

mod dc_filter;
mod wav;

pub use dc_filter::DcFilter;
pub use wav::write_wav;

use serde::{Deserialize, Serialize};

use crate::ym2149::constants::DEFAULT_SAMPLE_RATE;

/// Export configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output sample rate (should match the render rate)
    pub sample_rate: u32,
    /// 1 = mono, 2 = stereo (duplicated)
    pub channels: u16,
    /// Remove the DC offset of the unipolar chip output
    pub center: bool,
    /// Scale so the loudest sample reaches full scale
    pub normalize: bool,
    /// Linear fade-out length in seconds (0 = none)
    pub fade_out_duration: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::mono()
    }
}

impl ExportConfig {
    /// Mono output at the default sample rate
    pub fn mono() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            center: false,
            normalize: false,
            fade_out_duration: 0.0,
        }
    }

    /// Stereo output at the default sample rate
    pub fn stereo() -> Self {
        Self {
            channels: 2,
            ..Self::mono()
        }
    }

    /// Set the sample rate
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Enable or disable DC centering
    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Enable or disable peak normalization
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the fade-out length in seconds
    pub fn fade_out(mut self, seconds: f32) -> Self {
        self.fade_out_duration = seconds.max(0.0);
        self
    }

    /// Apply centering, normalization and fade-out in that order
    pub fn apply(&self, samples: &mut [f32]) {
        if self.center {
            DcFilter::new().process_buffer(samples);
        }
        if self.normalize {
            normalize_samples(samples);
        }
        if self.fade_out_duration > 0.0 {
            apply_fade_out(samples, self.fade_out_duration, self.sample_rate);
        }
    }
}

/// Scale samples so the peak magnitude is 1.0 (silence is left alone)
pub fn normalize_samples(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        let gain = 1.0 / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Linearly fade the last `seconds` of the buffer to zero
pub fn apply_fade_out(samples: &mut [f32], seconds: f32, sample_rate: u32) {
    let fade_len = ((seconds * sample_rate as f32) as usize).min(samples.len());
    if fade_len == 0 {
        return;
    }
    let start = samples.len() - fade_len;
    for (i, sample) in samples[start..].iter_mut().enumerate() {
        *sample *= 1.0 - (i + 1) as f32 / fade_len as f32;
    }
}
