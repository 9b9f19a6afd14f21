//! MIDI-style synthesizer interface
//!
//! Translates note on/off and controller messages into register writes on
//! any [`PsgBackend`]. One MIDI channel maps to one PSG voice (0-2).

pub mod control;

pub use control::{note_to_frequency, ChipControl};

use crate::backend::PsgBackend;
use crate::ym2149::constants::NUM_CHANNELS;
use crate::{Result, SynthError};

/// Highest MIDI note / controller value
const MIDI_MAX: u8 = 127;

/// Neutral value for centered controllers (transpose, detune)
const CENTER: u8 = 64;

/// Synth type that switches a voice to noise
const SYNTH_TYPE_NOISE: u8 = 7;

/// Supported control change numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// CC 1
    PwmFrequency,
    /// CC 2
    SoftDetune,
    /// CC 3
    SynthType,
    /// CC 4
    VolumeEnvelopeShape,
    /// CC 5
    Glide,
    /// CC 6
    VibratoRate,
    /// CC 7
    VibratoDepth,
    /// CC 8
    NoiseDelay,
    /// CC 9
    PitchEnvelopeAmount,
    /// CC 10
    PitchEnvelopeShape,
    /// CC 11
    Transpose,
}

impl Controller {
    /// Map a controller number
    pub fn from_cc(cc: u8) -> Option<Self> {
        Some(match cc {
            1 => Controller::PwmFrequency,
            2 => Controller::SoftDetune,
            3 => Controller::SynthType,
            4 => Controller::VolumeEnvelopeShape,
            5 => Controller::Glide,
            6 => Controller::VibratoRate,
            7 => Controller::VibratoDepth,
            8 => Controller::NoiseDelay,
            9 => Controller::PitchEnvelopeAmount,
            10 => Controller::PitchEnvelopeShape,
            11 => Controller::Transpose,
            _ => return None,
        })
    }
}

/// Per-voice note state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceState {
    /// Last note played
    pub note: u8,
    /// Velocity of the last note
    pub velocity: u8,
    /// Whether the note is still held
    pub playing: bool,
}

/// Per-channel synth parameters, raw controller values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthParams {
    /// CC 1
    pub pwm_freq: [u8; NUM_CHANNELS],
    /// CC 2, centered at 64
    pub soft_detune: [u8; NUM_CHANNELS],
    /// CC 3
    pub synth_type: [u8; NUM_CHANNELS],
    /// CC 4
    pub volume_env_shape: [u8; NUM_CHANNELS],
    /// CC 5
    pub glide: [u8; NUM_CHANNELS],
    /// CC 6
    pub vibrato_freq: [u8; NUM_CHANNELS],
    /// CC 7
    pub vibrato_amount: [u8; NUM_CHANNELS],
    /// CC 8
    pub noise_delay: [u8; NUM_CHANNELS],
    /// CC 9
    pub pitch_env_amount: [u8; NUM_CHANNELS],
    /// CC 10
    pub pitch_env_shape: [u8; NUM_CHANNELS],
    /// CC 11, centered at 64 (semitones)
    pub transpose: [u8; NUM_CHANNELS],
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            pwm_freq: [0; NUM_CHANNELS],
            soft_detune: [0; NUM_CHANNELS],
            synth_type: [0; NUM_CHANNELS],
            volume_env_shape: [0; NUM_CHANNELS],
            glide: [0; NUM_CHANNELS],
            vibrato_freq: [0; NUM_CHANNELS],
            vibrato_amount: [0; NUM_CHANNELS],
            noise_delay: [0; NUM_CHANNELS],
            pitch_env_amount: [0; NUM_CHANNELS],
            pitch_env_shape: [0; NUM_CHANNELS],
            transpose: [CENTER; NUM_CHANNELS],
        }
    }
}

/// Note/controller front end for a register sink
#[derive(Debug)]
pub struct Synth<B: PsgBackend> {
    backend: B,
    voices: [VoiceState; NUM_CHANNELS],
    params: SynthParams,
}

impl<B: PsgBackend> Synth<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            voices: [VoiceState::default(); NUM_CHANNELS],
            params: SynthParams::default(),
        }
    }

    /// All tones on, all noise off, all voices silent
    pub fn initialize_defaults(&mut self) -> Result<()> {
        self.backend.set_mixer([true; NUM_CHANNELS], [false; NUM_CHANNELS])?;
        for channel in 0..NUM_CHANNELS {
            self.backend.set_volume(channel, 0)?;
        }
        Ok(())
    }

    fn check_channel(channel: usize) -> Result<()> {
        if channel < NUM_CHANNELS {
            Ok(())
        } else {
            Err(SynthError::InvalidChannel(channel))
        }
    }

    /// Note with the channel's transpose applied, clamped to 0-127
    fn transposed(&self, channel: usize, note: u8) -> u8 {
        let offset = self.params.transpose[channel] as i32 - CENTER as i32;
        (note as i32 + offset).clamp(0, MIDI_MAX as i32) as u8
    }

    /// Start a note: tune the voice and set volume from velocity (0-127 -> 0-15)
    pub fn note_on(&mut self, channel: usize, note: u8, velocity: u8) -> Result<()> {
        Self::check_channel(channel)?;
        let note = note.min(MIDI_MAX);
        let velocity = velocity.min(MIDI_MAX);

        self.voices[channel] = VoiceState {
            note,
            velocity,
            playing: true,
        };

        let frequency = note_to_frequency(self.transposed(channel, note));
        self.backend.set_frequency(channel, frequency)?;
        self.backend.set_volume(channel, velocity / 8)?;

        log::debug!(
            "Note ON: channel {channel}, note {note}, velocity {velocity}, freq {frequency:.2}Hz"
        );
        Ok(())
    }

    /// Release a note; ignored unless `note` is the one playing on `channel`
    pub fn note_off(&mut self, channel: usize, note: u8) -> Result<()> {
        Self::check_channel(channel)?;
        let voice = &mut self.voices[channel];
        if voice.playing && voice.note == note {
            voice.playing = false;
            self.backend.set_volume(channel, 0)?;
            log::debug!("Note OFF: channel {channel}, note {note}");
        }
        Ok(())
    }

    /// Handle a control change; unknown controllers are logged and ignored
    pub fn control_change(&mut self, channel: usize, cc: u8, value: u8) -> Result<()> {
        Self::check_channel(channel)?;
        let Some(controller) = Controller::from_cc(cc) else {
            log::warn!("Unknown CC: {cc}");
            return Ok(());
        };

        let p = &mut self.params;
        match controller {
            Controller::PwmFrequency => p.pwm_freq[channel] = value,
            Controller::SoftDetune => return self.set_soft_detune(channel, value),
            Controller::SynthType => return self.set_synth_type(channel, value),
            Controller::VolumeEnvelopeShape => p.volume_env_shape[channel] = value,
            Controller::Glide => p.glide[channel] = value,
            Controller::VibratoRate => p.vibrato_freq[channel] = value,
            Controller::VibratoDepth => p.vibrato_amount[channel] = value,
            Controller::NoiseDelay => p.noise_delay[channel] = value,
            Controller::PitchEnvelopeAmount => p.pitch_env_amount[channel] = value,
            Controller::PitchEnvelopeShape => p.pitch_env_shape[channel] = value,
            Controller::Transpose => return self.set_transpose(channel, value),
        }
        Ok(())
    }

    /// Fine-tune a playing voice by `(value - 64) * 0.1` cents
    fn set_soft_detune(&mut self, channel: usize, value: u8) -> Result<()> {
        self.params.soft_detune[channel] = value;
        let voice = self.voices[channel];
        if voice.playing {
            let base = note_to_frequency(self.transposed(channel, voice.note));
            let cents = (value as f32 - CENTER as f32) * 0.1;
            self.backend
                .set_frequency(channel, base * 2f32.powf(cents / 1200.0))?;
        }
        Ok(())
    }

    /// Type 7 routes the voice to noise, every other type to tone
    fn set_synth_type(&mut self, channel: usize, value: u8) -> Result<()> {
        self.params.synth_type[channel] = value;
        let noise = value == SYNTH_TYPE_NOISE;
        self.backend.update_mixer_for_channel(channel, !noise, noise)
    }

    /// Change transpose and re-trigger a playing note
    fn set_transpose(&mut self, channel: usize, value: u8) -> Result<()> {
        self.params.transpose[channel] = value;
        let voice = self.voices[channel];
        if voice.playing {
            self.note_on(channel, voice.note, voice.velocity)?;
        }
        Ok(())
    }

    /// Reset the backend and forget all notes
    pub fn reset(&mut self) {
        self.backend.reset();
        self.voices = [VoiceState::default(); NUM_CHANNELS];
    }

    /// Note state of a voice
    pub fn voice(&self, channel: usize) -> Option<&VoiceState> {
        self.voices.get(channel)
    }

    /// Current controller values
    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The wrapped backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Unwrap the backend
    pub fn into_inner(self) -> B {
        self.backend
    }
}
