//! DC offset removal filter
//!
//! The chip output is unipolar (0.0 to 0.3). This filter subtracts a
//! running average to center it around zero.

/// History buffer size (2048 samples = ~46ms at 44.1kHz)
const HISTORY_SIZE_BITS: usize = 11;
const HISTORY_SIZE: usize = 1 << HISTORY_SIZE_BITS;

/// DC offset removal filter using a running average
#[derive(Clone)]
pub struct DcFilter {
    /// Circular buffer of recent samples
    buffer: Box<[f32; HISTORY_SIZE]>,
    /// Current write position in buffer
    position: usize,
    /// Running sum of all samples in buffer
    running_sum: f64,
}

impl DcFilter {
    /// Create a new DC filter
    pub fn new() -> Self {
        Self {
            buffer: Box::new([0.0; HISTORY_SIZE]),
            position: 0,
            running_sum: 0.0,
        }
    }

    /// Process a sample and return the DC-adjusted value
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.running_sum -= self.buffer[self.position] as f64;
        self.running_sum += sample as f64;
        self.buffer[self.position] = sample;
        self.position = (self.position + 1) & (HISTORY_SIZE - 1);

        let dc_offset = self.running_sum / HISTORY_SIZE as f64;
        sample - dc_offset as f32
    }

    /// Filter a whole buffer in place
    pub fn process_buffer(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Reset the filter state
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.position = 0;
        self.running_sum = 0.0;
    }
}

impl Default for DcFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DcFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DcFilter")
            .field("position", &self.position)
            .field("running_sum", &self.running_sum)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input_settles_to_zero() {
        let mut filter = DcFilter::new();
        let mut last = 1.0;
        for _ in 0..HISTORY_SIZE * 2 {
            last = filter.process(0.3);
        }
        assert!(last.abs() < 1e-5, "residual DC {last}");
    }

    #[test]
    fn test_square_wave_is_centered() {
        let mut filter = DcFilter::new();
        let mut out: Vec<f32> = (0..HISTORY_SIZE * 4)
            .map(|i| if (i / 50) % 2 == 0 { 0.2 } else { 0.0 })
            .collect();
        filter.process_buffer(&mut out);
        let tail = &out[HISTORY_SIZE * 2..];
        let mean = tail.iter().sum::<f32>() / tail.len() as f32;
        assert!(mean.abs() < 0.01, "mean {mean}");
        assert!(tail.iter().any(|&s| s < 0.0));
    }

    #[test]
    fn test_reset() {
        let mut filter = DcFilter::new();
        filter.process(0.5);
        filter.reset();
        assert_eq!(filter.process(0.0), 0.0);
    }
}
