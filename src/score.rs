//! JSON render scripts
//!
//! A score is a list of timed register writes rendered offline:
//!
//! ```json
//! {
//!   "sample_rate": 44100,
//!   "length": 44100,
//!   "events": [
//!     { "at": 0, "register": 7, "value": 62 },
//!     { "at": 0, "register": 8, "value": 15 },
//!     { "at": 22050, "register": 8, "value": 0 }
//!   ]
//! }
//! ```
//!
//! Each event is applied before the sample at index `at` is generated.

use serde::{Deserialize, Serialize};

use crate::ym2149::constants::DEFAULT_SAMPLE_RATE;
use crate::ym2149::{RegisterWrite, Ym2149};
use crate::{Result, SynthError};

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

/// One timed register write
///
/// Index and value are kept as wide integers so that out-of-range input is
/// reported instead of silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Sample offset
    pub at: u64,
    /// Register index (0-15)
    pub register: i64,
    /// Register value (0-255)
    pub value: i64,
}

/// Offline render description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Render sample rate
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Number of samples to render
    pub length: u64,
    /// Register writes
    #[serde(default)]
    pub events: Vec<ScoreEvent>,
}

impl Score {
    /// Parse a score from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the score on a fresh chip
    ///
    /// Every event is validated before any audio is generated, so a bad
    /// event fails the whole render. A length that cannot be allocated is
    /// reported as [`SynthError::ConfigError`].
    pub fn render(&self) -> Result<Vec<f32>> {
        let mut writes = Vec::with_capacity(self.events.len());
        for event in &self.events {
            writes.push((event.at, RegisterWrite::try_new(event.register, event.value)?));
        }
        // Stable: equal offsets keep file order
        writes.sort_by_key(|&(at, _)| at);

        let mut chip = Ym2149::new(self.sample_rate)?;
        let len = usize::try_from(self.length).map_err(|_| {
            SynthError::ConfigError(format!("score length {} is too large", self.length))
        })?;
        let mut samples = Vec::new();
        samples.try_reserve_exact(len).map_err(|e| {
            SynthError::ConfigError(format!("cannot allocate {len} samples: {e}"))
        })?;
        let mut pending = writes.into_iter().peekable();

        for position in 0..self.length {
            while let Some((_, write)) = pending.next_if(|&(at, _)| at <= position) {
                chip.write(write);
            }
            samples.push(chip.generate_sample());
        }

        let skipped = pending.count();
        if skipped > 0 {
            log::debug!("Ignored {skipped} score events past the end ({} samples)", self.length);
        }
        Ok(samples)
    }
}
