//! YM2149 Register Definitions
//!
//! Defines the 16 registers (R0-R13, R14-R15 for I/O ports) that control
//! the PSG chip, the raw register bank, and the validated write type used
//! at the boundary with untyped host input.

use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{Result, SynthError};

/// Number of registers in the bank
pub const NUM_REGISTERS: usize = 16;

/// YM2149 Register Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Register {
    /// Channel A Frequency (low byte) - R0
    ChAFreqLo = 0x00,
    /// Channel A Frequency (high byte) - R1
    ChAFreqHi = 0x01,
    /// Channel B Frequency (low byte) - R2
    ChBFreqLo = 0x02,
    /// Channel B Frequency (high byte) - R3
    ChBFreqHi = 0x03,
    /// Channel C Frequency (low byte) - R4
    ChCFreqLo = 0x04,
    /// Channel C Frequency (high byte) - R5
    ChCFreqHi = 0x05,
    /// Noise Frequency Control - R6
    NoiseFreq = 0x06,
    /// Mixer Control (enable/disable tone and noise per voice) - R7
    MixerCtrl = 0x07,
    /// Channel A Amplitude - R8
    ChAAmplitude = 0x08,
    /// Channel B Amplitude - R9
    ChBAmplitude = 0x09,
    /// Channel C Amplitude - R10
    ChCAmplitude = 0x0A,
    /// Envelope Frequency (low byte) - R11
    EnvelopeFreqLo = 0x0B,
    /// Envelope Frequency (high byte) - R12
    EnvelopeFreqHi = 0x0C,
    /// Envelope Shape - R13
    EnvelopeShape = 0x0D,
    /// I/O Port A - R14
    PortA = 0x0E,
    /// I/O Port B - R15
    PortB = 0x0F,
}

impl Register {
    /// Convert a raw register number to a Register
    ///
    /// Unlike the hardware address decoder this does not wrap: anything
    /// outside 0-15 is rejected.
    pub fn from_addr(addr: u8) -> Option<Self> {
        Register::from_u8(addr)
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }

    /// Tone channel (0-2) whose period this register feeds, if any
    pub fn tone_channel(&self) -> Option<usize> {
        match self {
            Register::ChAFreqLo | Register::ChAFreqHi => Some(0),
            Register::ChBFreqLo | Register::ChBFreqHi => Some(1),
            Register::ChCFreqLo | Register::ChCFreqHi => Some(2),
            _ => None,
        }
    }

    /// Amplitude register for a voice (0-2)
    pub fn amplitude(channel: usize) -> Option<Self> {
        if channel < 3 {
            Register::from_usize(Register::ChAAmplitude as usize + channel)
        } else {
            None
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::ChAFreqLo => write!(f, "R0 (Channel A Frequency Low)"),
            Register::ChAFreqHi => write!(f, "R1 (Channel A Frequency High)"),
            Register::ChBFreqLo => write!(f, "R2 (Channel B Frequency Low)"),
            Register::ChBFreqHi => write!(f, "R3 (Channel B Frequency High)"),
            Register::ChCFreqLo => write!(f, "R4 (Channel C Frequency Low)"),
            Register::ChCFreqHi => write!(f, "R5 (Channel C Frequency High)"),
            Register::NoiseFreq => write!(f, "R6 (Noise Frequency)"),
            Register::MixerCtrl => write!(f, "R7 (Mixer Control)"),
            Register::ChAAmplitude => write!(f, "R8 (Channel A Amplitude)"),
            Register::ChBAmplitude => write!(f, "R9 (Channel B Amplitude)"),
            Register::ChCAmplitude => write!(f, "R10 (Channel C Amplitude)"),
            Register::EnvelopeFreqLo => write!(f, "R11 (Envelope Frequency Low)"),
            Register::EnvelopeFreqHi => write!(f, "R12 (Envelope Frequency High)"),
            Register::EnvelopeShape => write!(f, "R13 (Envelope Shape)"),
            Register::PortA => write!(f, "R14 (I/O Port A)"),
            Register::PortB => write!(f, "R15 (I/O Port B)"),
        }
    }
}

/// Raw register bank (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterBank {
    registers: [u8; NUM_REGISTERS],
}

impl RegisterBank {
    /// Create a new register bank with all values set to 0
    pub fn new() -> Self {
        RegisterBank {
            registers: [0; NUM_REGISTERS],
        }
    }

    /// Read a register value
    #[inline]
    pub fn read(&self, reg: Register) -> u8 {
        self.registers[reg as usize]
    }

    /// Write a register value
    #[inline]
    pub fn write(&mut self, reg: Register, value: u8) {
        self.registers[reg as usize] = value;
    }

    /// Zero every register
    pub fn clear(&mut self) {
        self.registers = [0; NUM_REGISTERS];
    }

    /// Get all registers
    pub fn as_array(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }
}

/// A register write whose index and value have both been validated
///
/// This is the strict entry point for numbers that do not arrive as bytes
/// (score files, untyped host messages). Values are never masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Target register
    pub register: Register,
    /// Byte to store
    pub value: u8,
}

impl RegisterWrite {
    /// Validate a raw (index, value) pair
    ///
    /// Fails with [`SynthError::OutOfRange`] when `index` is outside 0-15 and
    /// with [`SynthError::InvalidValue`] when `value` is outside 0-255.
    pub fn try_new(index: i64, value: i64) -> Result<Self> {
        let register = u8::try_from(index)
            .ok()
            .and_then(Register::from_addr)
            .ok_or(SynthError::OutOfRange { index })?;
        let value = u8::try_from(value).map_err(|_| SynthError::InvalidValue { value })?;
        Ok(Self { register, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conversion() {
        assert_eq!(Register::from_addr(0x00), Some(Register::ChAFreqLo));
        assert_eq!(Register::from_addr(0x0D), Some(Register::EnvelopeShape));
        assert_eq!(Register::from_addr(0x0F), Some(Register::PortB));
        assert_eq!(Register::from_addr(0x10), None);
        assert_eq!(Register::from_addr(0xFF), None);
    }

    #[test]
    fn test_tone_channel_mapping() {
        assert_eq!(Register::ChAFreqHi.tone_channel(), Some(0));
        assert_eq!(Register::ChBFreqLo.tone_channel(), Some(1));
        assert_eq!(Register::ChCFreqHi.tone_channel(), Some(2));
        assert_eq!(Register::MixerCtrl.tone_channel(), None);
        assert_eq!(Register::amplitude(2), Some(Register::ChCAmplitude));
        assert_eq!(Register::amplitude(3), None);
    }

    #[test]
    fn test_register_bank() {
        let mut bank = RegisterBank::new();
        assert_eq!(bank.read(Register::ChAFreqLo), 0);

        bank.write(Register::ChAFreqLo, 0x42);
        assert_eq!(bank.read(Register::ChAFreqLo), 0x42);

        bank.clear();
        assert_eq!(bank, RegisterBank::default());
    }

    #[test]
    fn test_register_write_validation() {
        let write = RegisterWrite::try_new(13, 0x0E).unwrap();
        assert_eq!(write.register, Register::EnvelopeShape);
        assert_eq!(write.value, 0x0E);

        assert!(matches!(
            RegisterWrite::try_new(16, 0),
            Err(SynthError::OutOfRange { index: 16 })
        ));
        assert!(matches!(
            RegisterWrite::try_new(-1, 0),
            Err(SynthError::OutOfRange { index: -1 })
        ));
        assert!(matches!(
            RegisterWrite::try_new(0, 256),
            Err(SynthError::InvalidValue { value: 256 })
        ));
        assert!(matches!(
            RegisterWrite::try_new(0, -5),
            Err(SynthError::InvalidValue { value: -5 })
        ));
    }
}
