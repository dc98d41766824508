//! Internal constants: defaults, bit masks, and native library names.

use std::time::Duration;

/// Baud rate assumed right after the chip is opened.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Read/write timeout assumed right after the chip is opened.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// --- Control-line emulation ---
pub mod lines {
    /// Output bit driving CTS (stands in for DTR while in bitbang mode).
    pub const CTS_HIGH: u8 = 0x08;
    /// Output bit driving RTS.
    pub const RTS_HIGH: u8 = 0x04;
    /// Pin direction mask used when entering bitbang mode: TXD, RTS and CTS
    /// are outputs (bits 0, 2, 3).
    pub const BITBANG_DIRECTION_MASK: u8 = 0x0D;
}

// --- libftdi ---
pub mod ftdi {
    /// `enum ftdi_mpsse_mode` values.
    pub const BITMODE_RESET: u8 = 0x00;
    pub const BITMODE_BITBANG: u8 = 0x01;

    /// `SIO_DISABLE_FLOW_CTRL`.
    pub const SIO_DISABLE_FLOW_CTRL: i32 = 0x0;

    /// Bytes reserved for `struct ftdi_context`. The real structure is a few
    /// hundred bytes in libftdi 1.x.
    pub const CONTEXT_SIZE: usize = 1024;
}

// --- Native library names ---
pub mod libs {
    pub const FTDI_NAME: &str = "ftdi1";
    pub const FTDI_CANDIDATES: &[&str] = &[
        "libftdi1.so.2",
        "libftdi1.so",
        "libftdi1.2.dylib",
        "libftdi1.dylib",
    ];
    pub const USB_NAME: &str = "usb-1.0";
    pub const USB_CANDIDATES: &[&str] = &[
        "libusb-1.0.so.0",
        "libusb-1.0.so",
        "libusb-1.0.0.dylib",
        "libusb-1.0.dylib",
    ];
}

// --- sysfs ---
pub mod sysfs {
    pub const CHAR_DEV_ROOT: &str = "/sys/dev/char";
    pub const BUSNUM: &str = "busnum";
    pub const DEVNUM: &str = "devnum";
    pub const INTERFACE_NUMBER: &str = "bInterfaceNumber";
}
