//! YM2149 Output Mixer
//!
//! Decodes the mixer control register (R7), decides per voice whether it
//! sounds on a given tick, and folds the three voice levels into one
//! unipolar sample.
//!
//! Output chain: `sum / 3`, soft clip above 1.0, then `* OUTPUT_HEADROOM`.

use bitflags::bitflags;

use super::constants::{NUM_CHANNELS, OUTPUT_HEADROOM};

bitflags! {
    /// Mixer Control Register (R7) bitflags
    ///
    /// A set bit disables the corresponding source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MixerFlags: u8 {
        /// Channel A tone disable
        const CH_A_TONE = 0x01;
        /// Channel B tone disable
        const CH_B_TONE = 0x02;
        /// Channel C tone disable
        const CH_C_TONE = 0x04;
        /// Channel A noise disable
        const CH_A_NOISE = 0x08;
        /// Channel B noise disable
        const CH_B_NOISE = 0x10;
        /// Channel C noise disable
        const CH_C_NOISE = 0x20;
    }
}

impl MixerFlags {
    /// Create mixer flags from raw register value (I/O direction bits ignored)
    pub fn from_register(value: u8) -> Self {
        MixerFlags::from_bits_truncate(value)
    }

    /// Tone disable flag for a channel (0-2)
    fn tone_flag(channel: usize) -> Self {
        MixerFlags::from_bits_truncate(1 << channel)
    }

    /// Noise disable flag for a channel (0-2)
    fn noise_flag(channel: usize) -> Self {
        MixerFlags::from_bits_truncate(1 << (channel + 3))
    }

    /// Check if tone is enabled for a channel (0-2)
    pub fn is_tone_enabled(&self, channel: usize) -> bool {
        channel < NUM_CHANNELS && !self.contains(Self::tone_flag(channel))
    }

    /// Check if noise is enabled for a channel (0-2)
    pub fn is_noise_enabled(&self, channel: usize) -> bool {
        channel < NUM_CHANNELS && !self.contains(Self::noise_flag(channel))
    }

    /// Build a register value from per-channel enables
    pub fn from_enables(tone: [bool; NUM_CHANNELS], noise: [bool; NUM_CHANNELS]) -> Self {
        let mut flags = MixerFlags::empty();
        for channel in 0..NUM_CHANNELS {
            flags.set(Self::tone_flag(channel), !tone[channel]);
            flags.set(Self::noise_flag(channel), !noise[channel]);
        }
        flags
    }

    /// Return a copy with one channel's enables replaced
    pub fn with_channel(mut self, channel: usize, tone: bool, noise: bool) -> Self {
        if channel < NUM_CHANNELS {
            self.set(Self::tone_flag(channel), !tone);
            self.set(Self::noise_flag(channel), !noise);
        }
        self
    }
}

/// Decide whether a voice contributes to the current tick
///
/// The voice sounds when its tone is enabled and high, or its noise is
/// enabled and high. A voice with both sources disabled is silent; that
/// rule is evaluated last and overrides the other two.
#[inline]
pub fn voice_gate(tone_enabled: bool, tone_output: u8, noise_enabled: bool, noise_output: u8) -> bool {
    let mut open = false;
    if tone_enabled && tone_output != 0 {
        open = true;
    }
    if noise_enabled && noise_output != 0 {
        open = true;
    }
    if !tone_enabled && !noise_enabled {
        open = false;
    }
    open
}

/// Exponential soft clip for normalized levels above 1.0
#[inline]
pub fn soft_clip(mixed: f32) -> f32 {
    if mixed > 1.0 {
        1.0 - (-(mixed - 1.0)).exp()
    } else {
        mixed
    }
}

/// Turn the summed voice levels into the final sample
#[inline]
pub fn finish_sample(level_sum: f32) -> f32 {
    soft_clip(level_sum / NUM_CHANNELS as f32) * OUTPUT_HEADROOM
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mixer_flags() {
        let flags = MixerFlags::from_register(0x00);
        for ch in 0..3 {
            assert!(flags.is_tone_enabled(ch));
            assert!(flags.is_noise_enabled(ch));
        }
    }

    #[test]
    fn test_mixer_flags_disabled() {
        let flags = MixerFlags::from_register(0xFF);
        for ch in 0..3 {
            assert!(!flags.is_tone_enabled(ch));
            assert!(!flags.is_noise_enabled(ch));
        }
        assert!(!flags.is_tone_enabled(3));
    }

    #[test]
    fn test_mixer_flags_tone_a_only() {
        let flags = MixerFlags::from_register(0x3E);
        assert!(flags.is_tone_enabled(0));
        assert!(!flags.is_tone_enabled(1));
        assert!(!flags.is_noise_enabled(0));
    }

    #[test]
    fn test_mixer_flags_from_enables() {
        let flags = MixerFlags::from_enables([true, true, true], [false, false, false]);
        assert_eq!(flags.bits(), 0x38);
        let flags = flags.with_channel(1, false, true);
        assert_eq!(flags.bits(), 0x2A);
    }

    #[test]
    fn test_voice_gate_truth_table() {
        assert!(voice_gate(true, 1, false, 0));
        assert!(!voice_gate(true, 0, false, 1));
        assert!(voice_gate(false, 0, true, 1));
        assert!(voice_gate(true, 0, true, 1));
        assert!(!voice_gate(true, 0, true, 0));
        assert!(!voice_gate(false, 1, false, 1));
    }

    #[test]
    fn test_soft_clip_identity_below_one() {
        assert_eq!(soft_clip(0.0), 0.0);
        assert_eq!(soft_clip(0.5), 0.5);
        assert_eq!(soft_clip(1.0), 1.0);
    }

    #[test]
    fn test_soft_clip_compresses_above_one() {
        assert_relative_eq!(soft_clip(2.0), 1.0 - (-1.0f32).exp());
        assert!(soft_clip(1.5) < 1.0);
    }

    #[test]
    fn test_finish_sample_scaling() {
        assert_relative_eq!(finish_sample(0.5), 0.5 / 3.0 * OUTPUT_HEADROOM);
        assert_eq!(finish_sample(0.0), 0.0);
    }
}
