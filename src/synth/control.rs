//! Register-level convenience controls
//!
//! Frequency, volume, mixer and envelope helpers available on every
//! [`PsgBackend`].

use crate::backend::PsgBackend;
use crate::ym2149::constants::{
    DEFAULT_MASTER_CLOCK, MAX_ENVELOPE_PERIOD, MAX_TONE_PERIOD, NUM_CHANNELS, TONE_CLOCK_DIVIDER,
};
use crate::ym2149::mixer::MixerFlags;
use crate::ym2149::registers::Register;
use crate::{Result, SynthError};

/// Period unit frequency at the default 2 MHz clock (125 kHz)
pub const PERIOD_CLOCK_HZ: f32 = (DEFAULT_MASTER_CLOCK / TONE_CLOCK_DIVIDER) as f32;

/// Frequency of a MIDI note, A4 (69) = 440 Hz
pub fn note_to_frequency(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

/// Period for a frequency, rounded and clamped to `1..=max`
fn frequency_to_period(frequency: f32, max: u32) -> Result<u32> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(SynthError::InvalidValue {
            value: frequency as i64,
        });
    }
    let period = (PERIOD_CLOCK_HZ / frequency).round();
    Ok((period as u32).clamp(1, max))
}

/// 12-bit tone period for a frequency
pub fn tone_period(frequency: f32) -> Result<u32> {
    frequency_to_period(frequency, MAX_TONE_PERIOD)
}

/// 16-bit envelope period for a frequency
pub fn envelope_period(frequency: f32) -> Result<u32> {
    frequency_to_period(frequency, MAX_ENVELOPE_PERIOD)
}

fn check_channel(channel: usize) -> Result<()> {
    if channel < NUM_CHANNELS {
        Ok(())
    } else {
        Err(SynthError::InvalidChannel(channel))
    }
}

/// High-level register helpers for any register sink
pub trait ChipControl: PsgBackend {
    /// Set a voice's fixed volume (0-15), clearing its envelope bit
    fn set_volume(&mut self, channel: usize, volume: u8) -> Result<()> {
        check_channel(channel)?;
        if volume > 15 {
            return Err(SynthError::InvalidValue {
                value: volume as i64,
            });
        }
        let register = Register::amplitude(channel).ok_or(SynthError::InvalidChannel(channel))?;
        self.write_register(register.addr(), volume)
    }

    /// Tune a voice to a frequency in Hz
    fn set_frequency(&mut self, channel: usize, frequency: f32) -> Result<()> {
        check_channel(channel)?;
        let period = tone_period(frequency)?;
        let base = (channel * 2) as u8;
        self.write_register(base, (period & 0xFF) as u8)?;
        self.write_register(base + 1, ((period >> 8) & 0x0F) as u8)
    }

    /// Write the mixer register from per-voice enables
    fn set_mixer(&mut self, tone: [bool; NUM_CHANNELS], noise: [bool; NUM_CHANNELS]) -> Result<()> {
        let flags = MixerFlags::from_enables(tone, noise);
        self.write_register(Register::MixerCtrl.addr(), flags.bits())
    }

    /// Change one voice's tone/noise enables, keeping the others
    fn update_mixer_for_channel(&mut self, channel: usize, tone: bool, noise: bool) -> Result<()> {
        check_channel(channel)?;
        let current = MixerFlags::from_register(self.read_register(Register::MixerCtrl.addr())?);
        let updated = current.with_channel(channel, tone, noise);
        self.write_register(Register::MixerCtrl.addr(), updated.bits())
    }

    /// Set the envelope repeat frequency in Hz
    fn set_envelope_frequency(&mut self, frequency: f32) -> Result<()> {
        let period = envelope_period(frequency)?;
        self.write_register(Register::EnvelopeFreqLo.addr(), (period & 0xFF) as u8)?;
        self.write_register(Register::EnvelopeFreqHi.addr(), ((period >> 8) & 0xFF) as u8)
    }

    /// Select (and restart) the envelope shape
    fn set_envelope_shape(&mut self, shape: u8) -> Result<()> {
        self.write_register(Register::EnvelopeShape.addr(), shape & 0x0F)
    }
}

impl<T: PsgBackend + ?Sized> ChipControl for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ym2149::Ym2149;
    use approx::assert_relative_eq;

    #[test]
    fn test_note_to_frequency() {
        assert_relative_eq!(note_to_frequency(69), 440.0);
        assert_relative_eq!(note_to_frequency(81), 880.0, max_relative = 1e-5);
        assert_relative_eq!(note_to_frequency(60), 261.6256, max_relative = 1e-5);
    }

    #[test]
    fn test_tone_period_rounding_and_clamp() {
        assert_eq!(tone_period(440.0).unwrap(), 284);
        assert_eq!(tone_period(1_000_000.0).unwrap(), 1);
        assert_eq!(tone_period(1.0).unwrap(), 4095);
        assert!(tone_period(0.0).is_err());
        assert!(tone_period(f32::NAN).is_err());
        assert_eq!(envelope_period(1.0).unwrap(), 65535);
    }

    #[test]
    fn test_set_frequency_writes_period_pair() {
        let mut chip = Ym2149::new(44_100).unwrap();
        chip.set_frequency(1, 440.0).unwrap();
        assert_eq!(chip.read_register(2).unwrap(), 0x1C);
        assert_eq!(chip.read_register(3).unwrap(), 0x01);
        assert_eq!(chip.voice(1).unwrap().tone().period(), 284);
    }

    #[test]
    fn test_set_volume_validation() {
        let mut chip = Ym2149::new(44_100).unwrap();
        chip.set_volume(2, 9).unwrap();
        assert_eq!(chip.voice(2).unwrap().volume(), 9);
        assert!(matches!(
            chip.set_volume(3, 1),
            Err(SynthError::InvalidChannel(3))
        ));
        assert!(matches!(
            chip.set_volume(0, 16),
            Err(SynthError::InvalidValue { value: 16 })
        ));
    }

    #[test]
    fn test_mixer_helpers() {
        let mut chip = Ym2149::new(44_100).unwrap();
        chip.set_mixer([true, true, true], [false, false, false]).unwrap();
        assert_eq!(chip.read_register(7).unwrap(), 0x38);

        chip.update_mixer_for_channel(2, false, true).unwrap();
        assert_eq!(chip.read_register(7).unwrap(), 0x1C);
        assert!(chip.voice(2).unwrap().noise_enabled());
        assert!(!chip.voice(2).unwrap().tone_enabled());
    }

    #[test]
    fn test_envelope_helpers() {
        let mut chip = Ym2149::new(44_100).unwrap();
        chip.set_envelope_frequency(2.0).unwrap();
        assert_eq!(chip.read_register(11).unwrap(), 0x24);
        assert_eq!(chip.read_register(12).unwrap(), 0xF4);

        chip.set_envelope_shape(0xFE).unwrap();
        assert_eq!(chip.read_register(13).unwrap(), 0x0E);
    }
}
