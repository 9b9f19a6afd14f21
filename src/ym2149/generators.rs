//! Sound generators for the YM2149 PSG
//!
//! This module contains the per-voice tone generator and the shared noise
//! generator. The envelope generator lives in [`super::envelope`].

/// Tone generator for a single channel
///
/// Counts ticks up to its period and toggles a square-wave output on each
/// wrap, so one full cycle takes `2 * period` ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToneGenerator {
    /// Ticks since the last toggle
    counter: u32,
    /// Period from registers (12-bit, R0/R1, R2/R3, R4/R5), never below 1
    period: u32,
    /// Current square-wave phase (0 or 1)
    output: u8,
}

impl ToneGenerator {
    /// Create a new tone generator
    pub fn new() -> Self {
        Self {
            counter: 0,
            period: 1,
            output: 0,
        }
    }

    /// Decode the period from a low/high register pair
    ///
    /// Only the low nibble of the high byte is used; 0 is treated as 1.
    #[inline]
    pub fn period_from_registers(lo: u8, hi: u8) -> u32 {
        ((((hi & 0x0F) as u32) << 8) | lo as u32).max(1)
    }

    /// Set the period (clamped to at least 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ticks elapsed since the last toggle
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Current output phase (0 or 1)
    #[inline]
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Advance by one tick, returns the output after the tick
    #[inline]
    pub fn tick(&mut self) -> u8 {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            self.output ^= 1;
        }
        self.output
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed loaded into the LFSR on construction and reset
pub const LFSR_SEED: u32 = 1;

const LFSR_MASK: u32 = 0x1_FFFF;

/// Noise generator using a 17-bit LFSR
///
/// Feedback is bit 0 XOR bit 3, inserted at bit 16 after a right shift. The
/// register is never all-zero: it starts at [`LFSR_SEED`] and that tap rule
/// cannot reach zero from a non-zero state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseGenerator {
    /// Ticks since the last shift
    counter: u32,
    /// Doubled 5-bit period from register R6, never below 1
    period: u32,
    /// 17-bit LFSR state
    lfsr: u32,
    /// Current output bit (bit 0 of the LFSR after the last shift)
    output: u8,
}

impl NoiseGenerator {
    /// Create a new noise generator
    pub fn new() -> Self {
        Self {
            counter: 0,
            period: 1,
            lfsr: LFSR_SEED,
            output: 0,
        }
    }

    /// Decode the period from register R6: `max(1, (r6 & 0x1F) * 2)`
    #[inline]
    pub fn period_from_register(value: u8) -> u32 {
        ((value & 0x1F) as u32 * 2).max(1)
    }

    /// Set the period (clamped to at least 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ticks elapsed since the last shift
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Current LFSR contents
    #[inline]
    pub fn lfsr(&self) -> u32 {
        self.lfsr
    }

    /// Current output bit
    #[inline]
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Advance by one tick, returns the output bit
    #[inline]
    pub fn tick(&mut self) -> u8 {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            let feedback = (self.lfsr ^ (self.lfsr >> 3)) & 1;
            self.lfsr = ((self.lfsr >> 1) | (feedback << 16)) & LFSR_MASK;
            self.output = (self.lfsr & 1) as u8;
        }
        debug_assert!(self.lfsr != 0, "noise LFSR reached the absorbing zero state");
        self.output
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
