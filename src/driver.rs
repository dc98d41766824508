//! The typed surface between this crate and the native FTDI driver.
//!
//! Every native call the transport needs has exactly one method on
//! [`FtdiDriver`]. Implementations translate failing return codes into
//! [`Error::Driver`](crate::Error::Driver) carrying the call name and the
//! driver's own error string. [`LibFtdi`](crate::LibFtdi) is the real
//! implementation; tests substitute a recording mock.

use crate::consts;
use crate::error::{Error, Result};
use std::time::Duration;

/// Interface (channel) of a multi-port FTDI chip, as `enum ftdi_interface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtdiInterface {
    A,
    B,
    C,
    D,
}

impl FtdiInterface {
    /// Maps a USB `bInterfaceNumber` (0-based) to the channel it exposes.
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(FtdiInterface::A),
            1 => Ok(FtdiInterface::B),
            2 => Ok(FtdiInterface::C),
            3 => Ok(FtdiInterface::D),
            _ => Err(Error::ArgumentOutOfRange(format!(
                "USB interface {} has no FTDI channel (0-3)",
                index
            ))),
        }
    }

    /// The `enum ftdi_interface` value (`INTERFACE_A` is 1; 0 means "any").
    pub fn raw(self) -> i32 {
        match self {
            FtdiInterface::A => 1,
            FtdiInterface::B => 2,
            FtdiInterface::C => 3,
            FtdiInterface::D => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitMode {
    /// Normal UART operation.
    Reset,
    /// Asynchronous bitbang: each written byte is latched onto the pins.
    BitBang,
}

impl BitMode {
    pub fn raw(self) -> u8 {
        match self {
            BitMode::Reset => consts::ftdi::BITMODE_RESET,
            BitMode::BitBang => consts::ftdi::BITMODE_BITBANG,
        }
    }
}

/// Flow-control setting passed to `ftdi_setflowctrl`. Only disabling is
/// needed when leaving bitbang mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    Disabled,
}

impl FlowControl {
    pub fn raw(self) -> i32 {
        match self {
            FlowControl::Disabled => consts::ftdi::SIO_DISABLE_FLOW_CTRL,
        }
    }
}

/// Per-transfer USB timeouts held inside the driver context.
///
/// This is the only form in which timeouts cross into the binding; where the
/// fields live inside `struct ftdi_context` is the binding's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbTimeouts {
    pub read_ms: i32,
    pub write_ms: i32,
}

impl UsbTimeouts {
    /// Same timeout for both directions, saturating at `i32::MAX` milliseconds.
    pub fn from_duration(timeout: Duration) -> Self {
        let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        UsbTimeouts {
            read_ms: ms,
            write_ms: ms,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_ms.max(0) as u64)
    }
}

/// One method per native libftdi/libusb call used by the transport.
///
/// Methods that tear resources down (`deinit`, `close`, `release_interface`,
/// `attach_kernel_driver`) are only called from session teardown, which logs
/// their errors and carries on.
pub trait FtdiDriver {
    /// `ftdi_init`
    fn init(&mut self) -> Result<()>;
    /// `ftdi_deinit`
    fn deinit(&mut self);
    /// `ftdi_set_interface`
    fn set_interface(&mut self, interface: FtdiInterface) -> Result<()>;
    /// `ftdi_usb_open_bus_addr`; failures are tagged `usb_open_bus_addr`.
    fn open_bus_addr(&mut self, bus: u8, address: u8) -> Result<()>;
    /// `ftdi_usb_close`
    fn close(&mut self) -> Result<()>;
    /// Whether the driver currently holds a libusb device handle.
    fn has_usb_handle(&self) -> bool;
    /// `libusb_release_interface` on the driver's device handle.
    fn release_interface(&mut self, interface: u8) -> Result<()>;
    /// `libusb_attach_kernel_driver` on the driver's device handle.
    fn attach_kernel_driver(&mut self, interface: u8) -> Result<()>;
    /// `ftdi_set_bitmode`
    fn set_bitmode(&mut self, mask: u8, mode: BitMode) -> Result<()>;
    /// `ftdi_setflowctrl`
    fn set_flow_control(&mut self, flow: FlowControl) -> Result<()>;
    /// `ftdi_set_baudrate`
    fn set_baudrate(&mut self, baud_rate: i32) -> Result<()>;
    /// `ftdi_setrts`
    fn set_rts(&mut self, high: bool) -> Result<()>;
    /// `ftdi_usb_purge_rx_buffer`
    fn purge_rx(&mut self) -> Result<()>;
    /// `ftdi_usb_purge_tx_buffer`
    fn purge_tx(&mut self) -> Result<()>;
    /// `ftdi_write_data`; returns the number of bytes accepted.
    fn write_data(&mut self, data: &[u8]) -> Result<usize>;
    /// `ftdi_read_data`; returns the number of bytes placed in `buf`.
    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Stores the USB read/write timeouts into the driver context.
    fn set_timeouts(&mut self, timeouts: UsbTimeouts);
    /// Current USB read/write timeouts from the driver context.
    fn timeouts(&self) -> UsbTimeouts;
}
