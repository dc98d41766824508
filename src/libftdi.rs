//! Runtime binding to libftdi1 and libusb-1.0.
//!
//! Both libraries are loaded with `libloading` when a transport is opened so
//! that a missing installation surfaces as [`Error::LibraryNotFound`] instead
//! of a link failure.

use crate::consts;
use crate::driver::{BitMode, FlowControl, FtdiDriver, FtdiInterface, UsbTimeouts};
use crate::error::{Error, Result};
use libloading::Library;
use log::{debug, trace};
use std::ffi::{c_char, c_int, c_uchar, c_void, CStr};
use std::ptr;

type ContextFn = unsafe extern "C" fn(*mut c_void) -> c_int;
type ContextVoidFn = unsafe extern "C" fn(*mut c_void);
type ContextIntFn = unsafe extern "C" fn(*mut c_void, c_int) -> c_int;
type OpenBusAddrFn = unsafe extern "C" fn(*mut c_void, u8, u8) -> c_int;
type SetBitmodeFn = unsafe extern "C" fn(*mut c_void, c_uchar, c_uchar) -> c_int;
type WriteDataFn = unsafe extern "C" fn(*mut c_void, *const c_uchar, c_int) -> c_int;
type ReadDataFn = unsafe extern "C" fn(*mut c_void, *mut c_uchar, c_int) -> c_int;
type ErrorStringFn = unsafe extern "C" fn(*mut c_void) -> *const c_char;
type UsbInterfaceFn = unsafe extern "C" fn(*mut c_void, c_int) -> c_int;

/// Leading members of `struct ftdi_context` (libftdi 1.x). Only these are
/// touched from Rust; the rest is opaque storage.
#[repr(C)]
struct ContextHead {
    _usb_ctx: *mut c_void,
    usb_dev: *mut c_void,
    usb_read_timeout: c_int,
    usb_write_timeout: c_int,
}

const CONTEXT_TAIL: usize = consts::ftdi::CONTEXT_SIZE - std::mem::size_of::<ContextHead>();

#[repr(C, align(16))]
struct RawContext {
    head: ContextHead,
    _tail: [u8; CONTEXT_TAIL],
}

impl RawContext {
    fn zeroed() -> Box<Self> {
        Box::new(RawContext {
            head: ContextHead {
                _usb_ctx: ptr::null_mut(),
                usb_dev: ptr::null_mut(),
                usb_read_timeout: 0,
                usb_write_timeout: 0,
            },
            _tail: [0; CONTEXT_TAIL],
        })
    }
}

struct Functions {
    init: ContextFn,
    deinit: ContextVoidFn,
    set_interface: ContextIntFn,
    usb_open_bus_addr: OpenBusAddrFn,
    usb_close: ContextFn,
    set_bitmode: SetBitmodeFn,
    setflowctrl: ContextIntFn,
    set_baudrate: ContextIntFn,
    setrts: ContextIntFn,
    usb_purge_rx_buffer: ContextFn,
    usb_purge_tx_buffer: ContextFn,
    write_data: WriteDataFn,
    read_data: ReadDataFn,
    get_error_string: ErrorStringFn,
    release_interface: UsbInterfaceFn,
    attach_kernel_driver: UsbInterfaceFn,
}

impl Functions {
    fn resolve(ftdi: &Library, usb: &Library) -> Result<Self> {
        Ok(Functions {
            init: symbol(ftdi, "ftdi_init")?,
            deinit: symbol(ftdi, "ftdi_deinit")?,
            set_interface: symbol(ftdi, "ftdi_set_interface")?,
            usb_open_bus_addr: symbol(ftdi, "ftdi_usb_open_bus_addr")?,
            usb_close: symbol(ftdi, "ftdi_usb_close")?,
            set_bitmode: symbol(ftdi, "ftdi_set_bitmode")?,
            setflowctrl: symbol(ftdi, "ftdi_setflowctrl")?,
            set_baudrate: symbol(ftdi, "ftdi_set_baudrate")?,
            setrts: symbol(ftdi, "ftdi_setrts")?,
            usb_purge_rx_buffer: symbol(ftdi, "ftdi_usb_purge_rx_buffer")?,
            usb_purge_tx_buffer: symbol(ftdi, "ftdi_usb_purge_tx_buffer")?,
            write_data: symbol(ftdi, "ftdi_write_data")?,
            read_data: symbol(ftdi, "ftdi_read_data")?,
            get_error_string: symbol(ftdi, "ftdi_get_error_string")?,
            release_interface: symbol(usb, "libusb_release_interface")?,
            attach_kernel_driver: symbol(usb, "libusb_attach_kernel_driver")?,
        })
    }
}

fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T> {
    // SAFETY: every `T` above matches the C prototype of `name` in
    // libftdi 1.x / libusb 1.0, and the copied pointer is only called while
    // `LibFtdi` keeps `lib` loaded.
    unsafe { lib.get::<T>(name.as_bytes()) }
        .map(|sym| *sym)
        .map_err(|source| Error::SymbolNotFound {
            symbol: name,
            source,
        })
}

fn load_library(name: &str, candidates: &[&str]) -> Result<Library> {
    // SAFETY: libftdi1 and libusb-1.0 have no load-time initializers with
    // preconditions on the caller.
    let mut last_error = match unsafe { Library::new(libloading::library_filename(name)) } {
        Ok(lib) => {
            debug!("Loaded {}", name);
            return Ok(lib);
        }
        Err(e) => e,
    };
    for candidate in candidates {
        // SAFETY: as above.
        match unsafe { Library::new(candidate) } {
            Ok(lib) => {
                debug!("Loaded {} as {}", name, candidate);
                return Ok(lib);
            }
            Err(e) => {
                trace!("Could not load {}: {}", candidate, e);
                last_error = e;
            }
        }
    }
    Err(Error::LibraryNotFound {
        name: name.to_string(),
        source: last_error,
    })
}

/// libftdi1 driver context plus the libraries it was resolved from.
///
/// The context is boxed so its address stays fixed for libftdi. Fields drop
/// in order, so the libraries are unloaded last.
pub struct LibFtdi {
    context: Box<RawContext>,
    fns: Functions,
    _ftdi: Library,
    _usb: Library,
}

impl LibFtdi {
    /// Loads libusb-1.0 and libftdi1 and allocates an uninitialized context.
    pub fn load() -> Result<Self> {
        let usb = load_library(consts::libs::USB_NAME, consts::libs::USB_CANDIDATES)?;
        let ftdi = load_library(consts::libs::FTDI_NAME, consts::libs::FTDI_CANDIDATES)?;
        let fns = Functions::resolve(&ftdi, &usb)?;
        Ok(LibFtdi {
            context: RawContext::zeroed(),
            fns,
            _ftdi: ftdi,
            _usb: usb,
        })
    }

    fn ctx(&mut self) -> *mut c_void {
        (&mut *self.context as *mut RawContext).cast()
    }

    fn error_string(&mut self) -> String {
        let ctx = self.ctx();
        // SAFETY: ctx points at our context; libftdi returns a pointer to a
        // static string or NULL.
        let raw = unsafe { (self.fns.get_error_string)(ctx) };
        if raw.is_null() {
            return "unknown error".to_string();
        }
        // SAFETY: non-null, NUL-terminated static string owned by libftdi.
        unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
    }

    fn check(&mut self, call: &'static str, rc: c_int) -> Result<()> {
        if rc != 0 {
            let message = self.error_string();
            trace!("{} returned {}: {}", call, rc, message);
            return Err(Error::driver(call, message));
        }
        Ok(())
    }

    fn check_len(&mut self, call: &'static str, rc: c_int) -> Result<usize> {
        usize::try_from(rc).map_err(|_| Error::driver(call, self.error_string()))
    }

    fn call(&mut self, call: &'static str, f: ContextFn) -> Result<()> {
        let ctx = self.ctx();
        // SAFETY: ctx is a live context; `f` takes only the context.
        let rc = unsafe { f(ctx) };
        self.check(call, rc)
    }

    fn call_int(&mut self, call: &'static str, f: ContextIntFn, arg: c_int) -> Result<()> {
        let ctx = self.ctx();
        // SAFETY: ctx is a live context; `f` takes the context and an int.
        let rc = unsafe { f(ctx, arg) };
        self.check(call, rc)
    }

    fn usb_call(&mut self, call: &'static str, f: UsbInterfaceFn, interface: u8) -> Result<()> {
        let handle = self.context.head.usb_dev;
        if handle.is_null() {
            return Err(Error::driver(call, "no USB device handle"));
        }
        // SAFETY: handle is the libusb handle libftdi opened and still owns.
        let rc = unsafe { f(handle, c_int::from(interface)) };
        if rc != 0 {
            return Err(Error::driver(call, format!("libusb error {}", rc)));
        }
        Ok(())
    }
}

impl FtdiDriver for LibFtdi {
    fn init(&mut self) -> Result<()> {
        self.call("ftdi_init", self.fns.init)
    }

    fn deinit(&mut self) {
        let ctx = self.ctx();
        // SAFETY: only called after a successful ftdi_init.
        unsafe { (self.fns.deinit)(ctx) };
    }

    fn set_interface(&mut self, interface: FtdiInterface) -> Result<()> {
        self.call_int("ftdi_set_interface", self.fns.set_interface, interface.raw())
    }

    fn open_bus_addr(&mut self, bus: u8, address: u8) -> Result<()> {
        let ctx = self.ctx();
        // SAFETY: ctx is an initialized context.
        let rc = unsafe { (self.fns.usb_open_bus_addr)(ctx, bus, address) };
        self.check("usb_open_bus_addr", rc)
    }

    fn close(&mut self) -> Result<()> {
        self.call("ftdi_usb_close", self.fns.usb_close)
    }

    fn has_usb_handle(&self) -> bool {
        !self.context.head.usb_dev.is_null()
    }

    fn release_interface(&mut self, interface: u8) -> Result<()> {
        self.usb_call("libusb_release_interface", self.fns.release_interface, interface)
    }

    fn attach_kernel_driver(&mut self, interface: u8) -> Result<()> {
        self.usb_call("libusb_attach_kernel_driver", self.fns.attach_kernel_driver, interface)
    }

    fn set_bitmode(&mut self, mask: u8, mode: BitMode) -> Result<()> {
        let ctx = self.ctx();
        // SAFETY: ctx is an open context.
        let rc = unsafe { (self.fns.set_bitmode)(ctx, mask, mode.raw()) };
        self.check("ftdi_set_bitmode", rc)
    }

    fn set_flow_control(&mut self, flow: FlowControl) -> Result<()> {
        self.call_int("ftdi_setflowctrl", self.fns.setflowctrl, flow.raw())
    }

    fn set_baudrate(&mut self, baud_rate: i32) -> Result<()> {
        self.call_int("ftdi_set_baudrate", self.fns.set_baudrate, baud_rate)
    }

    fn set_rts(&mut self, high: bool) -> Result<()> {
        self.call_int("ftdi_setrts", self.fns.setrts, c_int::from(high))
    }

    fn purge_rx(&mut self) -> Result<()> {
        self.call("ftdi_usb_purge_rx_buffer", self.fns.usb_purge_rx_buffer)
    }

    fn purge_tx(&mut self) -> Result<()> {
        self.call("ftdi_usb_purge_tx_buffer", self.fns.usb_purge_tx_buffer)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<usize> {
        let len = c_int::try_from(data.len())
            .map_err(|_| Error::ArgumentOutOfRange(format!("write of {} bytes", data.len())))?;
        let ctx = self.ctx();
        // SAFETY: data is valid for len bytes; libftdi does not retain it.
        let rc = unsafe { (self.fns.write_data)(ctx, data.as_ptr(), len) };
        self.check_len("ftdi_write_data", rc)
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = c_int::try_from(buf.len()).unwrap_or(c_int::MAX);
        let ctx = self.ctx();
        // SAFETY: buf is writable for at least len bytes.
        let rc = unsafe { (self.fns.read_data)(ctx, buf.as_mut_ptr(), len) };
        self.check_len("ftdi_read_data", rc)
    }

    fn set_timeouts(&mut self, timeouts: UsbTimeouts) {
        self.context.head.usb_read_timeout = timeouts.read_ms;
        self.context.head.usb_write_timeout = timeouts.write_ms;
    }

    fn timeouts(&self) -> UsbTimeouts {
        UsbTimeouts {
            read_ms: self.context.head.usb_read_timeout,
            write_ms: self.context.head.usb_write_timeout,
        }
    }
}
