//! YM2149 PSG chip
//!
//! Owns the register bank and the derived generator state. Register writes
//! re-derive only the state tied to the written register; every call to
//! [`Ym2149::generate_sample`] advances noise, envelope and the three tone
//! counters by exactly one tick and mixes one sample.

use super::constants::{
    get_volume, DEFAULT_MASTER_CLOCK, DEFAULT_SAMPLE_RATE, NUM_CHANNELS, TONE_CLOCK_DIVIDER,
};
use super::envelope::EnvelopeGenerator;
use super::generators::{NoiseGenerator, ToneGenerator};
use super::mixer::{finish_sample, voice_gate, MixerFlags};
use super::registers::{Register, RegisterBank, RegisterWrite, NUM_REGISTERS};
use crate::backend::PsgBackend;
use crate::{Result, SynthError};

/// Derived state of one voice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    tone: ToneGenerator,
    volume: u8,
    envelope_enabled: bool,
    tone_enabled: bool,
    noise_enabled: bool,
}

impl Voice {
    fn new() -> Self {
        Self {
            tone: ToneGenerator::new(),
            volume: 0,
            envelope_enabled: false,
            tone_enabled: true,
            noise_enabled: false,
        }
    }

    /// Tone generator of this voice
    pub fn tone(&self) -> &ToneGenerator {
        &self.tone
    }

    /// Fixed volume level (0-15)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Whether the envelope drives this voice's level
    pub fn envelope_enabled(&self) -> bool {
        self.envelope_enabled
    }

    /// Whether the tone source is enabled in the mixer
    pub fn tone_enabled(&self) -> bool {
        self.tone_enabled
    }

    /// Whether the noise source is enabled in the mixer
    pub fn noise_enabled(&self) -> bool {
        self.noise_enabled
    }
}

/// YM2149 PSG emulator
#[derive(Clone, Debug)]
pub struct Ym2149 {
    master_clock: u32,
    sample_rate: u32,
    registers: RegisterBank,
    voices: [Voice; NUM_CHANNELS],
    noise: NoiseGenerator,
    envelope: EnvelopeGenerator,
}

impl Ym2149 {
    /// Create a new chip with the default 2 MHz master clock
    pub fn new(sample_rate: u32) -> Result<Self> {
        Self::with_clocks(DEFAULT_MASTER_CLOCK, sample_rate)
    }

    /// Create a new chip with custom clock frequencies
    ///
    /// The clocks only feed the period/frequency helpers; the caller drives
    /// one tick per output sample.
    pub fn with_clocks(master_clock: u32, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SynthError::ConfigError(
                "sample rate must be positive".into(),
            ));
        }
        if master_clock == 0 {
            return Err(SynthError::ConfigError(
                "master clock must be positive".into(),
            ));
        }

        let mut chip = Self {
            master_clock,
            sample_rate,
            registers: RegisterBank::new(),
            voices: std::array::from_fn(|_| Voice::new()),
            noise: NoiseGenerator::new(),
            envelope: EnvelopeGenerator::new(),
        };
        chip.reset();
        Ok(chip)
    }

    /// Reset the chip to its power-on state
    ///
    /// Zeroes all registers and reinitializes every generator. Calling it
    /// twice is the same as calling it once.
    pub fn reset(&mut self) {
        self.registers.clear();
        for voice in &mut self.voices {
            *voice = Voice::new();
        }
        self.noise.reset();
        self.envelope.reset();
        log::debug!("YM2149 reset");
    }

    /// Write a register (0-15)
    ///
    /// Fails with [`SynthError::OutOfRange`] for any other index, leaving all
    /// state untouched.
    pub fn write_register(&mut self, index: u8, value: u8) -> Result<()> {
        let register = Register::from_addr(index).ok_or(SynthError::OutOfRange {
            index: index as i64,
        })?;
        self.write(RegisterWrite { register, value });
        Ok(())
    }

    /// Apply an already-validated register write
    pub fn write(&mut self, write: RegisterWrite) {
        let RegisterWrite { register, value } = write;
        log::trace!("Write {register}: {value:02X}");
        self.registers.write(register, value);
        self.update_internal_state(register);
    }

    /// Re-derive the generator state fed by `register`
    fn update_internal_state(&mut self, register: Register) {
        let regs = &self.registers;
        match register {
            Register::ChAFreqLo
            | Register::ChAFreqHi
            | Register::ChBFreqLo
            | Register::ChBFreqHi
            | Register::ChCFreqLo
            | Register::ChCFreqHi => {
                if let Some(channel) = register.tone_channel() {
                    let pair = &regs.as_array()[channel * 2..channel * 2 + 2];
                    self.voices[channel]
                        .tone
                        .set_period(ToneGenerator::period_from_registers(pair[0], pair[1]));
                }
            }
            Register::NoiseFreq => {
                self.noise
                    .set_period(NoiseGenerator::period_from_register(regs.read(register)));
            }
            Register::MixerCtrl => {
                let flags = MixerFlags::from_register(regs.read(register));
                for (channel, voice) in self.voices.iter_mut().enumerate() {
                    voice.tone_enabled = flags.is_tone_enabled(channel);
                    voice.noise_enabled = flags.is_noise_enabled(channel);
                }
            }
            Register::ChAAmplitude | Register::ChBAmplitude | Register::ChCAmplitude => {
                let channel = (register.addr() - Register::ChAAmplitude.addr()) as usize;
                let value = regs.read(register);
                let voice = &mut self.voices[channel];
                voice.volume = value & 0x0F;
                voice.envelope_enabled = value & 0x10 != 0;
            }
            Register::EnvelopeFreqLo | Register::EnvelopeFreqHi => {
                self.envelope.set_period(EnvelopeGenerator::period_from_registers(
                    regs.read(Register::EnvelopeFreqLo),
                    regs.read(Register::EnvelopeFreqHi),
                ));
            }
            Register::EnvelopeShape => {
                self.envelope.set_shape(regs.read(register));
            }
            Register::PortA | Register::PortB => {}
        }
    }

    /// Read a register (0-15)
    pub fn read_register(&self, index: u8) -> Result<u8> {
        Register::from_addr(index)
            .map(|register| self.registers.read(register))
            .ok_or(SynthError::OutOfRange {
                index: index as i64,
            })
    }

    /// Snapshot of all 16 registers
    pub fn registers(&self) -> [u8; NUM_REGISTERS] {
        *self.registers.as_array()
    }

    /// Advance every generator by one tick and return the mixed sample
    ///
    /// The result is unipolar, in `[0.0, 0.3]`.
    pub fn generate_sample(&mut self) -> f32 {
        let noise_output = self.noise.tick();
        self.envelope.tick();
        let envelope_level = self.envelope.volume_level();

        let mut level_sum = 0.0f32;
        for voice in &mut self.voices {
            let tone_output = voice.tone.tick();
            if voice_gate(
                voice.tone_enabled,
                tone_output,
                voice.noise_enabled,
                noise_output,
            ) {
                level_sum += if voice.envelope_enabled {
                    get_volume(envelope_level)
                } else {
                    get_volume(voice.volume)
                };
            }
        }

        finish_sample(level_sum)
    }

    /// Fill the first `count` slots of `buffer`, one tick per slot
    ///
    /// Identical to calling [`Self::generate_sample`] `count` times. Fails
    /// with [`SynthError::BufferTooSmall`] before generating anything if the
    /// buffer cannot hold `count` samples.
    pub fn process_samples(&mut self, buffer: &mut [f32], count: usize) -> Result<()> {
        let available = buffer.len();
        let target = buffer.get_mut(..count).ok_or(SynthError::BufferTooSmall {
            requested: count,
            available,
        })?;
        for sample in target.iter_mut() {
            *sample = self.generate_sample();
        }
        Ok(())
    }

    /// Generate `count` samples into a new vector
    pub fn generate_samples(&mut self, count: usize) -> Vec<f32> {
        let mut samples = vec![0.0; count];
        for sample in samples.iter_mut() {
            *sample = self.generate_sample();
        }
        samples
    }

    /// Derived state of a voice (0-2)
    pub fn voice(&self, channel: usize) -> Option<&Voice> {
        self.voices.get(channel)
    }

    /// Shared noise generator
    pub fn noise(&self) -> &NoiseGenerator {
        &self.noise
    }

    /// Shared envelope generator
    pub fn envelope(&self) -> &EnvelopeGenerator {
        &self.envelope
    }

    /// Host sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Master clock
    pub fn master_clock(&self) -> u32 {
        self.master_clock
    }

    /// Nominal frequency of a tone period on the real chip (clock / (16 * period))
    pub fn period_to_frequency(&self, period: u32) -> f32 {
        self.master_clock as f32 / (TONE_CLOCK_DIVIDER * period.max(1)) as f32
    }

    /// Nearest tone period for a frequency (clock / (16 * f)), unclamped
    pub fn frequency_to_period(&self, frequency: f32) -> f32 {
        self.master_clock as f32 / (TONE_CLOCK_DIVIDER as f32 * frequency)
    }
}

impl Default for Ym2149 {
    fn default() -> Self {
        Self {
            master_clock: DEFAULT_MASTER_CLOCK,
            sample_rate: DEFAULT_SAMPLE_RATE,
            registers: RegisterBank::new(),
            voices: std::array::from_fn(|_| Voice::new()),
            noise: NoiseGenerator::new(),
            envelope: EnvelopeGenerator::new(),
        }
    }
}

impl PsgBackend for Ym2149 {
    fn write_register(&mut self, index: u8, value: u8) -> Result<()> {
        Ym2149::write_register(self, index, value)
    }

    fn read_register(&self, index: u8) -> Result<u8> {
        Ym2149::read_register(self, index)
    }

    fn reset(&mut self) {
        Ym2149::reset(self)
    }

    fn dump_registers(&self) -> [u8; NUM_REGISTERS] {
        self.registers()
    }
}
