use thiserror::Error;

/// Errors that can occur when using an FTDI bitbang serial transport.
///
/// Every variant is fatal to the operation that produced it; nothing in this
/// crate retries on its own.
#[derive(Error, Debug)]
pub enum Error {
    /// A required native library (libftdi1 or libusb-1.0) could not be loaded.
    #[error("Can't find library {name}: {source}")]
    LibraryNotFound {
        /// The library name that was searched for.
        name: String,
        /// Loader error for the last candidate file name tried.
        #[source]
        source: libloading::Error,
    },
    /// A native library was loaded but lacks a function this crate calls.
    #[error("Library is missing symbol '{symbol}': {source}")]
    SymbolNotFound {
        /// The exported function name.
        symbol: &'static str,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },
    /// The device path could not be mapped to a USB bus/device/interface.
    #[error("Device not found at path '{path}': {message}")]
    DeviceNotFound {
        /// The device path that was looked up.
        path: String,
        /// Additional error details.
        message: String,
    },
    /// A native driver call reported failure.
    #[error("{call}: {message}")]
    Driver {
        /// Name of the failing native call, e.g. `ftdi_set_interface`.
        call: &'static str,
        /// Error string reported by the driver.
        message: String,
    },
    /// Function argument is outside the range the driver can represent.
    #[error("Argument out of range: {0}")]
    ArgumentOutOfRange(String),
}

/// Result type alias for FTDI serial operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn driver(call: &'static str, message: impl Into<String>) -> Self {
        Error::Driver {
            call,
            message: message.into(),
        }
    }

    pub(crate) fn device_not_found(
        path: impl AsRef<std::path::Path>,
        message: impl Into<String>,
    ) -> Self {
        Error::DeviceNotFound {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }
}
