//! The FTDI bitbang serial transport.

use crate::consts;
use crate::control::ControlLines;
use crate::driver::{FtdiDriver, UsbTimeouts};
use crate::error::{Error, Result};
use crate::libftdi::LibFtdi;
use crate::locator::{self, UsbLocation};
use crate::serial::ControlSerial;
use crate::session::ChipSession;
use log::{debug, trace};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Settings applied right after the device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    /// Read/write timeout, used both by the driver per transfer and as the
    /// overall deadline of [`FtdiSerial::read`].
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baud_rate: consts::DEFAULT_BAUD_RATE,
            timeout: consts::DEFAULT_TIMEOUT,
        }
    }
}

impl SerialConfig {
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A serial port on an FTDI chip whose DTR is emulated on CTS.
///
/// Opening resolves the tty to its USB interface, loads libftdi1, detaches
/// the kernel `ftdi_sio` driver and drives the chip directly. Dropping the
/// port (or calling [`close`](Self::close)) hands the interface back to the
/// kernel.
///
/// **Note:** This handle is not thread-safe (`!Send`, `!Sync`) with the
/// libftdi driver.
pub struct FtdiSerial<D: FtdiDriver = LibFtdi> {
    port: Option<PathBuf>,
    location: UsbLocation,
    session: ChipSession<D>,
    lines: ControlLines,
    baud_rate: u32,
    timeout: Duration,
}

impl FtdiSerial<LibFtdi> {
    /// Opens the FTDI interface behind `port` (e.g. `/dev/ttyUSB0`) with
    /// 9600 baud and a 5 second timeout.
    pub fn open(port: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(port, SerialConfig::default())
    }

    pub fn open_with_config(port: impl AsRef<Path>, config: SerialConfig) -> Result<Self> {
        let port = port.as_ref();
        let location = locator::locate(port)?;
        let driver = LibFtdi::load()?;
        let mut serial = Self::with_driver(driver, location, config)?;
        serial.port = Some(port.to_path_buf());
        Ok(serial)
    }
}

impl<D: FtdiDriver> FtdiSerial<D> {
    /// Opens a session on an already loaded driver. This is the core
    /// constructor the others use.
    pub fn with_driver(driver: D, location: UsbLocation, config: SerialConfig) -> Result<Self> {
        let session = ChipSession::open(driver, location)?;
        let mut serial = FtdiSerial {
            port: None,
            location,
            session,
            lines: ControlLines::new(),
            baud_rate: consts::DEFAULT_BAUD_RATE,
            timeout: consts::DEFAULT_TIMEOUT,
        };
        serial.set_timeout(config.timeout);
        serial.set_baud_rate(config.baud_rate)?;
        Ok(serial)
    }

    /// The device path this port was opened from, if any.
    pub fn name(&self) -> Option<&Path> {
        self.port.as_deref()
    }

    pub fn location(&self) -> UsbLocation {
        self.location
    }

    pub fn control_lines(&self) -> ControlLines {
        self.lines
    }

    pub fn driver(&self) -> &D {
        self.session.driver()
    }

    /// Tears the session down now instead of at drop.
    pub fn close(mut self) {
        self.session.close();
    }

    // --- Control lines ---

    pub fn set_dtr(&mut self, active: bool) -> Result<()> {
        self.lines.set_dtr(self.session.driver_mut(), active)
    }

    pub fn set_rts(&mut self, active: bool) -> Result<()> {
        self.lines.set_rts(self.session.driver_mut(), active)
    }

    // --- Data transfer ---

    /// Writes `data` and returns the number of bytes the chip accepted.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let written = self.session.driver_mut().write_data(data)?;
        trace!("Wrote {}/{} bytes: {:02X?}", written, data.len(), data);
        Ok(written)
    }

    /// Reads exactly `count` bytes, polling the driver until they arrive.
    ///
    /// If the timeout passes first the result is empty, even when some
    /// bytes had already been received.
    pub fn read(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(count);
        if count == 0 {
            return Ok(data);
        }

        let mut chunk = vec![0u8; count];
        let start = Instant::now();
        loop {
            let remaining = count - data.len();
            let n = self.session.driver_mut().read_data(&mut chunk[..remaining])?;
            data.extend_from_slice(&chunk[..n]);

            if data.len() >= count {
                trace!("Read {} bytes: {:02X?}", data.len(), data);
                return Ok(data);
            }
            if start.elapsed() > self.timeout {
                if !data.is_empty() {
                    debug!(
                        "Read timed out after {:?}; discarding {} of {} bytes",
                        self.timeout,
                        data.len(),
                        count
                    );
                }
                return Ok(Vec::new());
            }
        }
    }

    pub fn flush_input(&mut self) -> Result<()> {
        self.session.driver_mut().purge_rx()
    }

    pub fn flush_output(&mut self) -> Result<()> {
        self.session.driver_mut().purge_tx()
    }

    /// Always 0: callers built for generic serial ports then fall back to
    /// reading one byte at a time, which [`read`](Self::read) serves well.
    pub fn bytes_available(&self) -> usize {
        0
    }

    // --- Configuration ---

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Programs the chip's baud rate generator. Whether the rate is
    /// achievable is decided by the driver.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        let raw = i32::try_from(baud_rate).map_err(|_| {
            Error::ArgumentOutOfRange(format!("baud rate {} exceeds {}", baud_rate, i32::MAX))
        })?;
        self.session.driver_mut().set_baudrate(raw)?;
        self.baud_rate = baud_rate;
        debug!("Baud rate set to {}", baud_rate);
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.session
            .driver_mut()
            .set_timeouts(UsbTimeouts::from_duration(timeout));
        self.timeout = timeout;
        debug!("Timeout set to {:?}", timeout);
    }
}

impl<D: FtdiDriver> ControlSerial for FtdiSerial<D> {
    fn set_dtr(&mut self, active: bool) -> Result<()> {
        FtdiSerial::set_dtr(self, active)
    }

    fn set_rts(&mut self, active: bool) -> Result<()> {
        FtdiSerial::set_rts(self, active)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        FtdiSerial::write(self, data)
    }

    fn read(&mut self, count: usize) -> Result<Vec<u8>> {
        FtdiSerial::read(self, count)
    }

    fn flush_input(&mut self) -> Result<()> {
        FtdiSerial::flush_input(self)
    }

    fn flush_output(&mut self) -> Result<()> {
        FtdiSerial::flush_output(self)
    }

    fn bytes_available(&self) -> usize {
        FtdiSerial::bytes_available(self)
    }

    fn baud_rate(&self) -> u32 {
        FtdiSerial::baud_rate(self)
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        FtdiSerial::set_baud_rate(self, baud_rate)
    }

    fn timeout(&self) -> Duration {
        FtdiSerial::timeout(self)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        FtdiSerial::set_timeout(self, timeout)
    }
}

impl<D: FtdiDriver> io::Write for FtdiSerial<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        FtdiSerial::write(self, buf).map_err(io::Error::other)
    }

    // ftdi_write_data returns once the chip has the data.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<D: FtdiDriver> io::Read for FtdiSerial<D> {
    /// Returns as soon as at least one byte arrived, or `TimedOut` once the
    /// timeout passes with nothing received.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let start = Instant::now();
        loop {
            let n = self
                .session
                .driver_mut()
                .read_data(buf)
                .map_err(io::Error::other)?;
            if n > 0 {
                return Ok(n);
            }
            if start.elapsed() > self.timeout {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no data within {:?}", self.timeout),
                ));
            }
        }
    }
}
