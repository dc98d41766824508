//! # ftdi-bitbang-serial
//!
//! A serial transport for FTDI USB-to-serial bridges that provides both DTR
//! and RTS to a target even on cables that only bring out RTS and CTS.
//!
//! Boards such as ESP8266/ESP32 modules are put into their ROM bootloader by
//! pulling a boot strap pin low while releasing reset. Flashing tools do this
//! with DTR and RTS. This crate drives the chip through libftdi1 and, while
//! either signal is active, switches it into asynchronous bitbang mode so
//! the CTS pin can carry DTR.
//!
//! ## Features
//!
//! *   Resolving `/dev/ttyUSBn` to its USB bus, device and interface via sysfs
//!     (`locate`).
//! *   Opening that interface through libftdi1, loaded at runtime
//!     (`FtdiSerial::open`, `FtdiSerial::open_with_config`).
//! *   DTR/RTS emulation (`set_dtr`, `set_rts`), see [`control`].
//! *   All-or-nothing timed reads (`read`), writes, buffer purges.
//! *   Baud rate and timeout configuration.
//! *   Canned reset sequences in [`reset`].
//! *   `std::io::Read`/`Write` and the [`ControlSerial`] trait for use by
//!     flashing tools.
//!
//! ## Requirements
//!
//! Linux, with `libftdi1` and `libusb-1.0` installed, and permission to open
//! the USB device (e.g. a udev rule granting access to `idVendor=0403`).
//!
//! ## Basic Usage
//!
//! ```no_run
//! use ftdi_bitbang_serial::{reset, FtdiSerial, Result, SerialConfig};
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let config = SerialConfig::default()
//!         .baud_rate(115_200)
//!         .timeout(Duration::from_millis(100));
//!     let mut port = FtdiSerial::open_with_config("/dev/ttyUSB0", config)?;
//!
//!     reset::enter_bootloader(&mut port, reset::DEFAULT_BOOT_HOLD)?;
//!     port.flush_input()?;
//!
//!     port.write(&[0xC0, 0x00, 0x08, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00])?;
//!     let reply = port.read(1)?;
//!     println!("reply: {:02X?}", reply);
//!     Ok(())
//! }
//! ```

mod consts;
pub mod control;
mod device;
pub mod driver;
mod error;
mod libftdi;
pub mod locator;
pub mod reset;
mod serial;
pub mod session;

pub use consts::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
pub use control::ControlLines;
pub use device::{FtdiSerial, SerialConfig};
pub use driver::{BitMode, FlowControl, FtdiDriver, FtdiInterface, UsbTimeouts};
pub use error::{Error, Result};
pub use libftdi::LibFtdi;
pub use locator::{locate, UsbLocation};
pub use serial::ControlSerial;
pub use session::ChipSession;

/// Publicly accessible pin masks used by the control-line emulation.
pub mod pins {
    pub use crate::consts::lines::{BITBANG_DIRECTION_MASK, CTS_HIGH, RTS_HIGH};
}
