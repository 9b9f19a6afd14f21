//! Control side of the bridge

use std::sync::Arc;

use super::{Command, Event, ProcessorStatus, Shared};
use crate::backend::PsgBackend;
use crate::ym2149::registers::{Register, RegisterBank, RegisterWrite, NUM_REGISTERS};
use crate::{Result, SynthError};

/// Queues register writes for a [`super::RenderProcessor`]
///
/// Writes are validated here, before they are queued, so a rejected write
/// never reaches the render side. A shadow register bank answers reads
/// without a round trip.
#[derive(Debug)]
pub struct ChipHandle {
    shared: Arc<Shared>,
    shadow: RegisterBank,
    initialized: bool,
    playing: bool,
    last_status: Option<ProcessorStatus>,
}

impl ChipHandle {
    pub(super) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            shadow: RegisterBank::new(),
            initialized: false,
            playing: true,
            last_status: None,
        }
    }

    /// Queue a register write
    pub fn write_register(&mut self, index: u8, value: u8) -> Result<()> {
        let register = Register::from_addr(index).ok_or(SynthError::OutOfRange {
            index: index as i64,
        })?;
        self.queue(RegisterWrite { register, value });
        Ok(())
    }

    /// Queue a write from untyped input, rejecting anything outside 0-15 / 0-255
    pub fn write_raw(&mut self, index: i64, value: i64) -> Result<()> {
        let write = RegisterWrite::try_new(index, value)?;
        self.queue(write);
        Ok(())
    }

    fn queue(&mut self, write: RegisterWrite) {
        self.shadow.write(write.register, write.value);
        self.shared.post_command(Command::WriteRegister {
            register: write.register.addr(),
            value: write.value,
        });
    }

    /// Queue a chip reset
    pub fn reset(&mut self) {
        self.shadow.clear();
        self.shared.post_command(Command::Reset);
    }

    /// Resume rendering
    pub fn start(&mut self) {
        self.shared.post_command(Command::SetActive(true));
        self.playing = true;
        log::debug!("YM2149 audio started");
    }

    /// Pause rendering (the processor outputs silence)
    pub fn stop(&mut self) {
        self.shared.post_command(Command::SetActive(false));
        self.playing = false;
        log::debug!("YM2149 audio stopped");
    }

    /// Ask for a fresh status report and return the latest one received
    pub fn request_status(&mut self) -> Option<&ProcessorStatus> {
        self.shared.post_command(Command::GetStatus);
        self.last_status.as_ref()
    }

    /// Drain events posted by the render side
    pub fn poll_events(&mut self) -> Vec<Event> {
        let events: Vec<Event> = self.shared.take_events().into();
        for event in &events {
            match event {
                Event::Initialized { sample_rate } => {
                    self.initialized = true;
                    log::debug!("YM2149 render side ready at {sample_rate}Hz");
                }
                Event::Status(status) => {
                    self.last_status = Some(status.clone());
                }
                Event::Error(message) => {
                    log::error!("YM2149 render error: {message}");
                }
                Event::ResetComplete => {
                    log::debug!("YM2149 reset completed");
                }
                Event::RegisterWritten { register, value } => {
                    log::trace!("Register {register} confirmed: {value:02X}");
                }
            }
        }
        events
    }

    /// Whether the render side has reported ready
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether rendering was last requested to run
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Latest status received through [`Self::poll_events`]
    pub fn last_status(&self) -> Option<&ProcessorStatus> {
        self.last_status.as_ref()
    }
}

impl PsgBackend for ChipHandle {
    fn write_register(&mut self, index: u8, value: u8) -> Result<()> {
        ChipHandle::write_register(self, index, value)
    }

    fn read_register(&self, index: u8) -> Result<u8> {
        Register::from_addr(index)
            .map(|register| self.shadow.read(register))
            .ok_or(SynthError::OutOfRange {
                index: index as i64,
            })
    }

    fn reset(&mut self) {
        ChipHandle::reset(self)
    }

    fn dump_registers(&self) -> [u8; NUM_REGISTERS] {
        *self.shadow.as_array()
    }
}
