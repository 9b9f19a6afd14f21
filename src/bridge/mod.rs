//! Control/render bridge
//!
//! Splits the chip into a control side ([`ChipHandle`]) and a render side
//! ([`RenderProcessor`]) that can live on different threads. The control
//! side queues commands; the render side drains the whole queue at the
//! start of each block, so register writes land on block boundaries and
//! never in the middle of rendering.
//!
//! ```
//! use ym2149_synth::bridge;
//!
//! let (mut handle, mut processor) = bridge::channel(48_000).unwrap();
//! handle.write_register(0x07, 0x3E).unwrap();
//! handle.write_register(0x08, 0x0F).unwrap();
//!
//! let mut left = [0.0f32; 128];
//! let mut right = [0.0f32; 128];
//! processor.process(&mut [&mut left[..], &mut right[..]]);
//! assert_eq!(left, right);
//! ```

mod handle;
mod processor;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

pub use handle::ChipHandle;
pub use processor::RenderProcessor;

use crate::ym2149::registers::NUM_REGISTERS;
use crate::Result;

/// Control-to-render message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Store a byte in a register
    WriteRegister {
        /// Register index
        register: u8,
        /// Value to store
        value: u8,
    },
    /// Reset the chip
    Reset,
    /// Ask for a status report
    GetStatus,
    /// Pause or resume rendering
    SetActive(bool),
}

/// Render-to-control message
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Render side is ready
    Initialized {
        /// Rate the processor renders at
        sample_rate: u32,
    },
    /// A reset command was applied
    ResetComplete,
    /// Confirmation of an envelope shape write
    RegisterWritten {
        /// Register index
        register: u8,
        /// Value stored
        value: u8,
    },
    /// Status report
    Status(ProcessorStatus),
    /// A command failed on the render side
    Error(String),
}

/// Render-side statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorStatus {
    /// Whether blocks are being rendered
    pub active: bool,
    /// Render sample rate
    pub sample_rate: u32,
    /// Total samples rendered
    pub samples_processed: u64,
    /// Blocks requested with no output channel
    pub buffer_underruns: u64,
    /// Mean wall time per rendered block since the last report
    pub avg_processing_time: Duration,
    /// Register bank as seen by the render side
    pub registers: [u8; NUM_REGISTERS],
}

/// Most events kept for the control side; older ones are dropped first
pub const MAX_PENDING_EVENTS: usize = 256;

/// Queues shared by both halves
#[derive(Debug, Default)]
struct Shared {
    commands: Mutex<VecDeque<Command>>,
    events: Mutex<VecDeque<Event>>,
}

impl Shared {
    fn post_command(&self, command: Command) {
        self.commands.lock().push_back(command);
    }

    fn take_commands(&self) -> VecDeque<Command> {
        std::mem::take(&mut *self.commands.lock())
    }

    /// Queue an event; a new status replaces any unread one
    fn post_event(&self, event: Event) {
        let mut events = self.events.lock();
        if matches!(event, Event::Status(_)) {
            events.retain(|pending| !matches!(pending, Event::Status(_)));
        }
        if events.len() >= MAX_PENDING_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    fn take_events(&self) -> VecDeque<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

/// Create a connected control handle and render processor
pub fn channel(sample_rate: u32) -> Result<(ChipHandle, RenderProcessor)> {
    let shared = Arc::new(Shared::default());
    let processor = RenderProcessor::new(sample_rate, Arc::clone(&shared))?;
    let handle = ChipHandle::new(shared);
    Ok((handle, processor))
}
