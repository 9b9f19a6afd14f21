//! YM2149 PSG Synthesizer Core
//!
//! A tick-accurate software model of the three-voice YM2149 Programmable
//! Sound Generator: tone, noise and envelope generators driven by a
//! 16-register bank, mixed down to one mono sample per tick.
//!
//! # Features
//! - Three square-wave tone generators with 12-bit periods
//! - Shared 17-bit LFSR noise source
//! - Shared multi-shape envelope generator (attack/decay/triangle/hold)
//! - Logarithmic volume mapping and soft clipping
//! - Control/render bridge for driving the chip from another thread
//! - MIDI-style note and controller interface
//! - JSON score rendering and WAV export
//!
//! # Quick start
//! ```no_run
//! use ym2149_synth::Ym2149;
//! # fn main() -> ym2149_synth::Result<()> {
//! let mut chip = Ym2149::new(44_100)?;
//! chip.write_register(0x00, 0x1C)?; // Tone A Lo
//! chip.write_register(0x01, 0x01)?; // Tone A Hi
//! chip.write_register(0x07, 0x3E)?; // Mixer: tone A only
//! chip.write_register(0x08, 0x0F)?; // Volume A
//! let sample = chip.generate_sample();
//! # let _ = sample;
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//! The emulator itself is single-threaded. Use [`bridge::channel`] when
//! register writes originate on a different thread than rendering.

#![warn(missing_docs)]

pub mod backend; // Register-sink trait shared by chip and bridge
pub mod bridge; // Control/render message passing
pub mod export; // WAV output
pub mod score; // JSON render scripts
pub mod synth; // Note / controller layer
pub mod ym2149; // YM2149 PSG emulation (core)

/// Error types for the synthesizer core and its collaborators
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// Register index outside 0-15
    #[error("Invalid register: {index}. Must be 0-15")]
    OutOfRange {
        /// Offending register index
        index: i64,
    },

    /// Register value (or other parameter) outside its allowed range
    #[error("Invalid value: {value}")]
    InvalidValue {
        /// Offending value
        value: i64,
    },

    /// Output buffer shorter than the requested sample count
    #[error("Buffer too small: requested {requested} samples, buffer holds {available}")]
    BufferTooSmall {
        /// Samples requested
        requested: usize,
        /// Buffer capacity
        available: usize,
    },

    /// Voice channel outside 0-2
    #[error("Channel must be 0, 1, or 2 (got {0})")]
    InvalidChannel(usize),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing a WAV file
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Malformed score document
    #[error("Score parse error: {0}")]
    Score(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for SynthError {
    /// Converts a String into `SynthError::Other`.
    ///
    /// Prefer the specific variants where one applies; this conversion loses
    /// the error category.
    fn from(msg: String) -> Self {
        SynthError::Other(msg)
    }
}

impl From<&str> for SynthError {
    fn from(msg: &str) -> Self {
        SynthError::Other(msg.to_string())
    }
}

/// Result type for synthesizer operations
pub type Result<T> = std::result::Result<T, SynthError>;

// Public API exports
pub use backend::PsgBackend;
pub use bridge::{ChipHandle, RenderProcessor};
pub use export::{write_wav, DcFilter, ExportConfig};
pub use score::Score;
pub use synth::{ChipControl, Synth};
pub use ym2149::{RegisterWrite, Ym2149};
