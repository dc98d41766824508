//! The serial-port-like surface handed to flashing tools.

use crate::error::Result;
use std::time::Duration;

/// Narrow serial interface with two control lines.
///
/// This is what a flashing tool needs from a port: toggle DTR/RTS to reset
/// the target into its bootloader, move bytes, and adjust timing. Reads are
/// all-or-nothing: `read(count)` returns either exactly `count` bytes or an
/// empty vector once the timeout has passed.
pub trait ControlSerial {
    /// Set the logical DTR (boot mode select) signal.
    fn set_dtr(&mut self, active: bool) -> Result<()>;

    /// Set the logical RTS (reset) signal.
    fn set_rts(&mut self, active: bool) -> Result<()>;

    /// Write bytes, returning how many the driver accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read exactly `count` bytes, or nothing if the timeout elapses first.
    fn read(&mut self, count: usize) -> Result<Vec<u8>>;

    /// Discard anything waiting in the receive buffer.
    fn flush_input(&mut self) -> Result<()>;

    /// Discard anything waiting in the transmit buffer.
    fn flush_output(&mut self) -> Result<()>;

    /// Number of bytes that can be read without blocking.
    fn bytes_available(&self) -> usize;

    /// Current baud rate.
    fn baud_rate(&self) -> u32;

    /// Change the baud rate; the previous rate is kept if the driver rejects it.
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()>;

    /// Current read/write timeout.
    fn timeout(&self) -> Duration;

    /// Change the read/write timeout used by subsequent transfers.
    fn set_timeout(&mut self, timeout: Duration);
}
