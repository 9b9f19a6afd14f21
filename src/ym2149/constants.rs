//! YM2149 Constants
//!
//! Shared constants and lookup tables used across PSG components. Both
//! tables are built once on first use and never mutated afterwards.

use std::sync::LazyLock;

/// Default master clock (2 MHz)
pub const DEFAULT_MASTER_CLOCK: u32 = 2_000_000;

/// Default host sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Master clock divider between the chip clock and the tone period unit
pub const TONE_CLOCK_DIVIDER: u32 = 16;

/// Largest 12-bit tone period
pub const MAX_TONE_PERIOD: u32 = 0x0FFF;

/// Largest 16-bit envelope period
pub const MAX_ENVELOPE_PERIOD: u32 = 0xFFFF;

/// Final gain applied to the mixed sample to keep headroom
pub const OUTPUT_HEADROOM: f32 = 0.3;

/// Number of voices
pub const NUM_CHANNELS: usize = 3;

/// Logarithmic volume table (16 levels)
///
/// Level 0 is silence; level `i > 0` is `2^((i - 15) / 2) * 0.5`, i.e. each
/// step is 3 dB and level 15 is 0.5.
pub static VOLUME_TABLE: LazyLock<[f32; 16]> = LazyLock::new(|| {
    std::array::from_fn(|i| {
        if i == 0 {
            0.0
        } else {
            (2f64.powf((i as f64 - 15.0) / 2.0) * 0.5) as f32
        }
    })
});

/// Envelope shaping curve (256 steps, `(i / 255)^1.75`)
pub static ENVELOPE_TABLE: LazyLock<[f32; 256]> =
    LazyLock::new(|| std::array::from_fn(|i| (i as f64 / 255.0).powf(1.75) as f32));

/// Get the output level for a 4-bit amplitude (masked to 0-15)
#[inline]
pub fn get_volume(amplitude: u8) -> f32 {
    VOLUME_TABLE[(amplitude & 0x0F) as usize]
}

/// Look up the 256-step envelope shaping curve
#[inline]
pub fn envelope_curve(step: u8) -> f32 {
    ENVELOPE_TABLE[step as usize]
}
