//! Chip session: ordered acquisition of the driver and guaranteed teardown.

use crate::driver::{BitMode, FtdiDriver, FtdiInterface};
use crate::error::Result;
use crate::locator::UsbLocation;
use log::{debug, info, warn};

/// An initialized driver with the FTDI interface opened.
///
/// Teardown runs once, from [`close`](Self::close) or from `Drop`, and only
/// undoes the steps that actually succeeded.
pub struct ChipSession<D: FtdiDriver> {
    driver: D,
    interface: u8,
    needs_close: bool,
    needs_deinit: bool,
}

impl<D: FtdiDriver> ChipSession<D> {
    /// Initializes `driver`, selects the interface and opens the device at
    /// `location`, leaving the chip in normal UART mode with RTS deasserted.
    ///
    /// On error the partially acquired session is dropped here, which
    /// releases whatever was already acquired.
    pub fn open(driver: D, location: UsbLocation) -> Result<Self> {
        let mut session = ChipSession {
            driver,
            interface: location.interface,
            needs_close: false,
            needs_deinit: false,
        };

        session.driver.init()?;
        session.needs_deinit = true;

        let interface = FtdiInterface::from_index(location.interface)?;
        session.driver.set_interface(interface)?;

        session.driver.open_bus_addr(location.bus, location.device)?;
        session.needs_close = true;

        session.driver.set_bitmode(0, BitMode::Reset)?;
        session.driver.set_rts(false)?;

        info!(
            "Opened FTDI interface {:?} at bus {} dev {}",
            interface, location.bus, location.device
        );
        Ok(session)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// USB interface number this session claimed.
    pub fn interface(&self) -> u8 {
        self.interface
    }

    /// Whether the device handle is still open.
    pub fn is_open(&self) -> bool {
        self.needs_close
    }

    /// Releases the interface, hands it back to the kernel driver, closes the
    /// handle and deinitializes the driver. Safe to call more than once.
    pub fn close(&mut self) {
        if self.needs_close {
            self.needs_close = false;
            if self.driver.has_usb_handle() {
                if let Err(e) = self.driver.release_interface(self.interface) {
                    warn!("Releasing interface {} failed: {}", self.interface, e);
                }
                if let Err(e) = self.driver.attach_kernel_driver(self.interface) {
                    warn!(
                        "Reattaching kernel driver to interface {} failed: {}",
                        self.interface, e
                    );
                }
            }
            if let Err(e) = self.driver.close() {
                warn!("Closing device failed: {}", e);
            }
            debug!("Closed FTDI interface {}", self.interface);
        }

        if self.needs_deinit {
            self.needs_deinit = false;
            self.driver.deinit();
        }
    }
}

impl<D: FtdiDriver> Drop for ChipSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}
