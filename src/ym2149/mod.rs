//! YM2149 PSG Emulation Domain
//!
//! Tone generation, noise synthesis, envelope control and mixing for the
//! three-voice chip.

// Internal modules
pub mod chip;
pub mod constants;
pub mod envelope;
pub mod generators;
pub mod mixer;
pub mod registers;

// Re-export public API
pub use chip::{Voice, Ym2149};
pub use constants::{envelope_curve, get_volume};
pub use envelope::{EnvelopeGenerator, EnvelopeShape, ShapeFlags};
pub use generators::{NoiseGenerator, ToneGenerator};
pub use mixer::MixerFlags;
pub use registers::{Register, RegisterBank, RegisterWrite};
