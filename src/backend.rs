//! Backend trait abstraction for YM2149 register sinks
//!
//! Anything that accepts register writes implements [`PsgBackend`]: the
//! emulator itself, and the control-side handle of the render bridge. The
//! musical layer in [`crate::synth`] is written against this trait so it
//! can drive either.

use crate::Result;

/// Common interface for YM2149 register sinks
///
/// # Example
///
/// ```
/// use ym2149_synth::{PsgBackend, Ym2149};
///
/// fn play_note<B: PsgBackend>(chip: &mut B) -> ym2149_synth::Result<()> {
///     chip.write_register(0x00, 0xF0)?; // Channel A period low
///     chip.write_register(0x01, 0x01)?; // Channel A period high
///     chip.write_register(0x08, 0x0F)?; // Channel A volume
///     chip.write_register(0x07, 0x3E)?; // Mixer: enable tone A
///     Ok(())
/// }
///
/// let mut chip = Ym2149::new(44_100).unwrap();
/// play_note(&mut chip).unwrap();
/// ```
pub trait PsgBackend {
    /// Write to a YM2149 register
    ///
    /// # Arguments
    ///
    /// * `index` - Register address (0x00-0x0F)
    /// * `value` - Register value
    ///
    /// Fails with `OutOfRange` for addresses above 0x0F.
    fn write_register(&mut self, index: u8, value: u8) -> Result<()>;

    /// Read back a YM2149 register
    ///
    /// Fails with `OutOfRange` for addresses above 0x0F.
    fn read_register(&self, index: u8) -> Result<u8>;

    /// Reset to the power-on state
    fn reset(&mut self);

    /// Dump all 16 registers
    fn dump_registers(&self) -> [u8; 16];

    /// Load all 16 registers in index order
    fn load_registers(&mut self, regs: &[u8; 16]) -> Result<()> {
        for (index, &value) in (0u8..).zip(regs.iter()) {
            self.write_register(index, value)?;
        }
        Ok(())
    }
}
