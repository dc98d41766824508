//! Maps a tty device node to the USB bus, device and interface behind it.
//!
//! libftdi opens devices by USB address, not by tty path, so the kernel's
//! sysfs tree is used to get from `/dev/ttyUSBn` to the interface the
//! `ftdi_sio` driver is bound to.

use crate::consts::sysfs;
use crate::error::{Error, Result};
use log::{info, trace};
use nix::sys::stat::{major, minor};
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// USB address of one FTDI interface, resolved once per device path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbLocation {
    /// USB bus number (`busnum`).
    pub bus: u8,
    /// Device address on that bus (`devnum`).
    pub device: u8,
    /// USB interface number (`bInterfaceNumber`), 0-based.
    pub interface: u8,
}

/// Resolves the USB location of a character device such as `/dev/ttyUSB0`.
pub fn locate(port: impl AsRef<Path>) -> Result<UsbLocation> {
    let port = port.as_ref();
    let metadata = fs::metadata(port)
        .map_err(|e| Error::device_not_found(port, format!("stat failed: {}", e)))?;
    let rdev = metadata.rdev() as nix::libc::dev_t;
    let class_path =
        Path::new(sysfs::CHAR_DEV_ROOT).join(format!("{}:{}", major(rdev), minor(rdev)));
    trace!("{} maps to {}", port.display(), class_path.display());

    let start = fs::canonicalize(&class_path).map_err(|e| {
        Error::device_not_found(port, format!("{}: {}", class_path.display(), e))
    })?;
    let location = walk_sysfs(&start).map_err(|_| {
        Error::device_not_found(port, "can't find bus/device/interface for that port")
    })?;

    info!(
        "{} is at bus {} dev {} interface {}",
        port.display(),
        location.bus,
        location.device,
        location.interface
    );
    Ok(location)
}

/// Walks from `start` towards the filesystem root collecting `busnum`,
/// `devnum` and `bInterfaceNumber`.
///
/// The first directory providing an attribute wins, so the interface number
/// comes from the interface directory even though the device directory above
/// it has bus and device numbers. The root directory itself is never read.
pub fn walk_sysfs(start: &Path) -> Result<UsbLocation> {
    let mut bus = None;
    let mut device = None;
    let mut interface = None;

    for dir in start.ancestors().take_while(|dir| dir.parent().is_some()) {
        bus = bus.or_else(|| read_attribute(dir, sysfs::BUSNUM, 10));
        device = device.or_else(|| read_attribute(dir, sysfs::DEVNUM, 10));
        interface = interface.or_else(|| read_attribute(dir, sysfs::INTERFACE_NUMBER, 16));

        if let (Some(bus), Some(device), Some(interface)) = (bus, device, interface) {
            return Ok(UsbLocation {
                bus,
                device,
                interface,
            });
        }
    }

    Err(Error::device_not_found(
        start,
        format!(
            "reached / with busnum={:?} devnum={:?} bInterfaceNumber={:?}",
            bus, device, interface
        ),
    ))
}

/// Missing, unreadable and malformed attributes are all treated as absent.
fn read_attribute(dir: &Path, name: &str, radix: u32) -> Option<u8> {
    let text = fs::read_to_string(dir.join(name)).ok()?;
    let value = parse_attribute(&text, radix);
    if let Some(value) = value {
        trace!("{}/{} = {}", dir.display(), name, value);
    }
    value
}

fn parse_attribute(text: &str, radix: u32) -> Option<u8> {
    u8::from_str_radix(text.trim(), radix).ok()
}
