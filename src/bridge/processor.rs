//! Render side of the bridge

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Command, Event, ProcessorStatus, Shared};
use crate::ym2149::registers::Register;
use crate::ym2149::Ym2149;
use crate::Result;

/// Owns the chip and renders audio blocks
#[derive(Debug)]
pub struct RenderProcessor {
    chip: Ym2149,
    shared: Arc<Shared>,
    active: bool,
    samples_processed: u64,
    buffer_underruns: u64,
    samples_since_report: u64,
    processing_time_sum: Duration,
    processing_time_count: u32,
}

impl RenderProcessor {
    pub(super) fn new(sample_rate: u32, shared: Arc<Shared>) -> Result<Self> {
        let chip = Ym2149::new(sample_rate)?;
        shared.post_event(Event::Initialized { sample_rate });
        log::debug!("Render processor initialized at {sample_rate}Hz");
        Ok(Self {
            chip,
            shared,
            active: true,
            samples_processed: 0,
            buffer_underruns: 0,
            samples_since_report: 0,
            processing_time_sum: Duration::ZERO,
            processing_time_count: 0,
        })
    }

    /// Render one block
    ///
    /// Pending commands are applied first, as one batch. The block is
    /// rendered mono into the first output and copied to the others. Any
    /// part of another output past the first output's length is zeroed. An
    /// inactive processor writes silence and an empty output list counts as
    /// an underrun.
    pub fn process(&mut self, outputs: &mut [&mut [f32]]) {
        let start = Instant::now();
        self.drain_commands();

        if !self.active {
            for channel in outputs.iter_mut() {
                channel.fill(0.0);
            }
            return;
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            self.buffer_underruns += 1;
            return;
        };

        for sample in first.iter_mut() {
            *sample = self.chip.generate_sample();
        }
        for channel in rest.iter_mut() {
            let len = channel.len().min(first.len());
            channel[..len].copy_from_slice(&first[..len]);
            channel[len..].fill(0.0);
        }

        let rendered = first.len() as u64;
        self.samples_processed += rendered;
        self.samples_since_report += rendered;
        self.processing_time_sum += start.elapsed();
        self.processing_time_count += 1;

        if self.samples_since_report >= self.chip.sample_rate() as u64 {
            self.shared.post_event(Event::Status(self.status()));
            self.samples_since_report = 0;
            self.processing_time_sum = Duration::ZERO;
            self.processing_time_count = 0;
        }
    }

    fn drain_commands(&mut self) {
        for command in self.shared.take_commands() {
            match command {
                Command::WriteRegister { register, value } => {
                    match self.chip.write_register(register, value) {
                        Ok(()) if register == Register::EnvelopeShape.addr() => {
                            self.shared
                                .post_event(Event::RegisterWritten { register, value });
                        }
                        Ok(()) => {}
                        Err(e) => self.shared.post_event(Event::Error(e.to_string())),
                    }
                }
                Command::Reset => {
                    self.chip.reset();
                    self.shared.post_event(Event::ResetComplete);
                }
                Command::GetStatus => {
                    self.shared.post_event(Event::Status(self.status()));
                }
                Command::SetActive(active) => {
                    self.active = active;
                }
            }
        }
    }

    /// Current statistics
    pub fn status(&self) -> ProcessorStatus {
        let avg_processing_time = if self.processing_time_count > 0 {
            self.processing_time_sum / self.processing_time_count
        } else {
            Duration::ZERO
        };
        ProcessorStatus {
            active: self.active,
            sample_rate: self.chip.sample_rate(),
            samples_processed: self.samples_processed,
            buffer_underruns: self.buffer_underruns,
            avg_processing_time,
            registers: self.chip.registers(),
        }
    }

    /// The chip being rendered
    pub fn chip(&self) -> &Ym2149 {
        &self.chip
    }
}
