//! YM2149 Envelope Generator
//!
//! One envelope generator is shared by all three voices. It walks a 5-bit
//! phase (0-31) up or down once per envelope period, and the shape register
//! (R13) decides what happens when the phase runs off either end:
//!
//! - `continue` clear: freeze (hold) at the saturated phase
//! - `continue` and `alternate` set: reverse direction (triangle)
//! - `continue` set, `alternate` clear: wrap around (sawtooth)
//!
//! Writing R13 always restarts the envelope, even with an unchanged value.

use std::fmt;

use bitflags::bitflags;

/// Highest envelope phase
pub const MAX_PHASE: i32 = 31;

/// Initial output after a shape write with `attack` clear
pub const DECAY_START_OUTPUT: u8 = 15;

bitflags! {
    /// Envelope Shape Register (R13) bitflags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShapeFlags: u8 {
        /// Keep cycling after the first ramp
        const CONTINUE = 0x08;
        /// Ramp upwards
        const ATTACK = 0x04;
        /// Reverse direction at each end
        const ALTERNATE = 0x02;
        /// Hold flag (decoded, not used by the trajectory)
        const HOLD = 0x01;
    }
}

impl ShapeFlags {
    /// Create shape flags from a raw register value (upper nibble ignored)
    pub fn from_register(value: u8) -> Self {
        ShapeFlags::from_bits_truncate(value)
    }
}

/// Envelope Shape names for the 16 values of R13
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// 00xx: single decay, then hold
    Decay = 0x00,
    /// 01xx: single attack, then hold
    Attack = 0x04,
    /// 1000: repeating decay (sawtooth down)
    SawtoothDown = 0x08,
    /// 1001: decay, then hold
    DecayHold = 0x09,
    /// 1010: decay/attack triangle
    TriangleDown = 0x0A,
    /// 1011: decay with alternate and hold flags
    DecayAlternateHold = 0x0B,
    /// 1100: repeating attack (sawtooth up)
    SawtoothUp = 0x0C,
    /// 1101: attack, then hold
    AttackHold = 0x0D,
    /// 1110: attack/decay triangle
    TriangleUp = 0x0E,
    /// 1111: attack with alternate and hold flags
    AttackAlternateHold = 0x0F,
}

impl EnvelopeShape {
    /// Create from raw register value
    pub fn from_value(val: u8) -> Self {
        match val & 0x0F {
            0x00..=0x03 => EnvelopeShape::Decay,
            0x04..=0x07 => EnvelopeShape::Attack,
            0x08 => EnvelopeShape::SawtoothDown,
            0x09 => EnvelopeShape::DecayHold,
            0x0A => EnvelopeShape::TriangleDown,
            0x0B => EnvelopeShape::DecayAlternateHold,
            0x0C => EnvelopeShape::SawtoothUp,
            0x0D => EnvelopeShape::AttackHold,
            0x0E => EnvelopeShape::TriangleUp,
            _ => EnvelopeShape::AttackAlternateHold,
        }
    }
}

impl fmt::Display for EnvelopeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeShape::Decay => write!(f, "Decay"),
            EnvelopeShape::Attack => write!(f, "Attack"),
            EnvelopeShape::SawtoothDown => write!(f, "Sawtooth-Down (Buzzer)"),
            EnvelopeShape::DecayHold => write!(f, "Decay-Hold"),
            EnvelopeShape::TriangleDown => write!(f, "Triangle (decay first)"),
            EnvelopeShape::DecayAlternateHold => write!(f, "Decay-Alternate-Hold"),
            EnvelopeShape::SawtoothUp => write!(f, "Sawtooth-Up (Buzzer)"),
            EnvelopeShape::AttackHold => write!(f, "Attack-Hold"),
            EnvelopeShape::TriangleUp => write!(f, "Triangle (attack first)"),
            EnvelopeShape::AttackAlternateHold => write!(f, "Attack-Alternate-Hold"),
        }
    }
}

/// Shared envelope generator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeGenerator {
    /// Ticks since the last phase step
    counter: u32,
    /// Doubled 16-bit period from R11/R12, never below 1
    period: u32,
    /// Shape flags from R13 (`ATTACK` flips while alternating)
    shape: ShapeFlags,
    /// Current phase (0-31)
    phase: i32,
    /// Current 5-bit output level
    output: u8,
    /// Frozen at the end of a non-continuing shape
    holding: bool,
}

impl EnvelopeGenerator {
    /// Create a new envelope generator
    pub fn new() -> Self {
        Self {
            counter: 0,
            period: 1,
            shape: ShapeFlags::empty(),
            phase: 0,
            output: DECAY_START_OUTPUT,
            holding: false,
        }
    }

    /// Decode the period from R11/R12: `max(1, ((r12 << 8) | r11) * 2)`
    #[inline]
    pub fn period_from_registers(lo: u8, hi: u8) -> u32 {
        ((((hi as u32) << 8) | lo as u32) * 2).max(1)
    }

    /// Set the period (clamped to at least 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
    }

    /// Set the envelope shape from register R13
    ///
    /// This always restarts the envelope: counter and phase go to 0, holding
    /// is cleared, and the output starts at 0 for attack shapes or at 15
    /// otherwise, independent of where the phase will go next.
    pub fn set_shape(&mut self, value: u8) {
        self.shape = ShapeFlags::from_register(value);
        self.phase = 0;
        self.counter = 0;
        self.holding = false;
        self.output = if self.shape.contains(ShapeFlags::ATTACK) {
            0
        } else {
            DECAY_START_OUTPUT
        };
        log::trace!(
            "Envelope restart: {} ({:?})",
            EnvelopeShape::from_value(value),
            self.shape
        );
    }

    /// Advance by one tick
    pub fn tick(&mut self) {
        let continuing = self.shape.contains(ShapeFlags::CONTINUE);
        if !continuing && self.holding {
            return;
        }

        self.counter += 1;
        if self.counter < self.period {
            return;
        }
        self.counter = 0;

        if self.holding {
            return;
        }

        if self.shape.contains(ShapeFlags::ATTACK) {
            self.phase += 1;
            if self.phase > MAX_PHASE {
                self.phase = MAX_PHASE;
                self.saturate(0);
            }
        } else {
            self.phase -= 1;
            if self.phase < 0 {
                self.phase = 0;
                self.saturate(MAX_PHASE);
            }
        }

        self.output = self.phase as u8;
    }

    /// Apply the shape policy when the phase runs off an end
    fn saturate(&mut self, wrap_to: i32) {
        if !self.shape.contains(ShapeFlags::CONTINUE) {
            self.holding = true;
        } else if self.shape.contains(ShapeFlags::ALTERNATE) {
            self.shape.toggle(ShapeFlags::ATTACK);
        } else {
            self.phase = wrap_to;
        }
    }

    /// Current 5-bit output (0-31)
    #[inline]
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Output reduced to a 4-bit volume level (0-15)
    ///
    /// The 5-bit output is halved so it can index the 16-entry volume table.
    #[inline]
    pub fn volume_level(&self) -> u8 {
        self.output >> 1
    }

    /// Current phase (0-31)
    #[inline]
    pub fn phase(&self) -> i32 {
        self.phase
    }

    /// Current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ticks since the last phase step
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether the envelope is frozen
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Current shape flags (the attack bit reflects the live direction)
    #[inline]
    pub fn shape(&self) -> ShapeFlags {
        self.shape
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
