//! Recording mock of the native FTDI driver shared by the integration tests.
#![allow(dead_code)]

use ftdi_bitbang_serial::{
    BitMode, Error, FlowControl, FtdiDriver, FtdiInterface, FtdiSerial, Result, SerialConfig,
    UsbLocation, UsbTimeouts,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const LOCATION: UsbLocation = UsbLocation {
    bus: 3,
    device: 7,
    interface: 0,
};

/// Native calls as seen by the mock. Reads are not recorded since the timed
/// read loop polls thousands of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    Deinit,
    SetInterface(FtdiInterface),
    OpenBusAddr(u8, u8),
    Close,
    ReleaseInterface(u8),
    AttachKernelDriver(u8),
    SetBitmode(u8, BitMode),
    SetFlowControl(FlowControl),
    SetBaudrate(i32),
    SetRts(bool),
    PurgeRx,
    PurgeTx,
    Write(Vec<u8>),
    SetTimeouts(UsbTimeouts),
}

#[derive(Default)]
struct Shared {
    calls: Vec<Call>,
    rx: VecDeque<u8>,
    fail: Vec<&'static str>,
}

/// Test-side view of a [`MockDriver`] that stays valid after the driver has
/// been moved into (and dropped with) a session.
#[derive(Clone)]
pub struct MockHandle(Rc<RefCell<Shared>>);

impl MockHandle {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Queues bytes for `ftdi_read_data` to return.
    pub fn feed(&self, data: &[u8]) {
        self.0.borrow_mut().rx.extend(data.iter().copied());
    }

    pub fn pending_rx(&self) -> usize {
        self.0.borrow().rx.len()
    }

    /// Makes the named native call fail from now on.
    pub fn fail_on(&self, call: &'static str) {
        self.0.borrow_mut().fail.push(call);
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().calls.iter().filter(|c| pred(c)).count()
    }
}

pub struct MockDriver {
    shared: Rc<RefCell<Shared>>,
    timeouts: UsbTimeouts,
    usb_handle: bool,
    max_chunk: usize,
}

impl MockDriver {
    pub fn new() -> (Self, MockHandle) {
        let shared = Rc::new(RefCell::new(Shared::default()));
        let driver = MockDriver {
            shared: shared.clone(),
            timeouts: UsbTimeouts {
                read_ms: 5000,
                write_ms: 5000,
            },
            usb_handle: false,
            max_chunk: usize::MAX,
        };
        (driver, MockHandle(shared))
    }

    /// Limits how many bytes a single `ftdi_read_data` call returns.
    pub fn max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk;
        self
    }

    fn record(&mut self, call: Call) {
        self.shared.borrow_mut().calls.push(call);
    }

    fn check(&self, name: &'static str) -> Result<()> {
        if self.shared.borrow().fail.contains(&name) {
            return Err(Error::Driver {
                call: name,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

impl FtdiDriver for MockDriver {
    fn init(&mut self) -> Result<()> {
        self.record(Call::Init);
        self.check("ftdi_init")
    }

    fn deinit(&mut self) {
        self.record(Call::Deinit);
    }

    fn set_interface(&mut self, interface: FtdiInterface) -> Result<()> {
        self.record(Call::SetInterface(interface));
        self.check("ftdi_set_interface")
    }

    fn open_bus_addr(&mut self, bus: u8, address: u8) -> Result<()> {
        self.record(Call::OpenBusAddr(bus, address));
        self.check("usb_open_bus_addr")?;
        self.usb_handle = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.record(Call::Close);
        self.usb_handle = false;
        self.check("ftdi_usb_close")
    }

    fn has_usb_handle(&self) -> bool {
        self.usb_handle
    }

    fn release_interface(&mut self, interface: u8) -> Result<()> {
        self.record(Call::ReleaseInterface(interface));
        self.check("libusb_release_interface")
    }

    fn attach_kernel_driver(&mut self, interface: u8) -> Result<()> {
        self.record(Call::AttachKernelDriver(interface));
        self.check("libusb_attach_kernel_driver")
    }

    fn set_bitmode(&mut self, mask: u8, mode: BitMode) -> Result<()> {
        self.record(Call::SetBitmode(mask, mode));
        self.check("ftdi_set_bitmode")
    }

    fn set_flow_control(&mut self, flow: FlowControl) -> Result<()> {
        self.record(Call::SetFlowControl(flow));
        self.check("ftdi_setflowctrl")
    }

    fn set_baudrate(&mut self, baud_rate: i32) -> Result<()> {
        self.record(Call::SetBaudrate(baud_rate));
        self.check("ftdi_set_baudrate")
    }

    fn set_rts(&mut self, high: bool) -> Result<()> {
        self.record(Call::SetRts(high));
        self.check("ftdi_setrts")
    }

    fn purge_rx(&mut self) -> Result<()> {
        self.record(Call::PurgeRx);
        self.check("ftdi_usb_purge_rx_buffer")
    }

    fn purge_tx(&mut self) -> Result<()> {
        self.record(Call::PurgeTx);
        self.check("ftdi_usb_purge_tx_buffer")
    }

    fn write_data(&mut self, data: &[u8]) -> Result<usize> {
        self.record(Call::Write(data.to_vec()));
        self.check("ftdi_write_data")?;
        Ok(data.len())
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check("ftdi_read_data")?;
        let mut shared = self.shared.borrow_mut();
        let n = buf.len().min(shared.rx.len()).min(self.max_chunk);
        for (slot, byte) in buf.iter_mut().zip(shared.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn set_timeouts(&mut self, timeouts: UsbTimeouts) {
        self.record(Call::SetTimeouts(timeouts));
        self.timeouts = timeouts;
    }

    fn timeouts(&self) -> UsbTimeouts {
        self.timeouts
    }
}

/// Opens a transport on a fresh mock with the given config and clears the
/// calls made while opening.
pub fn open_mock_with(config: SerialConfig) -> (FtdiSerial<MockDriver>, MockHandle) {
    let (driver, handle) = MockDriver::new();
    let serial = FtdiSerial::with_driver(driver, LOCATION, config).expect("mock open failed");
    handle.clear();
    (serial, handle)
}

pub fn open_mock() -> (FtdiSerial<MockDriver>, MockHandle) {
    open_mock_with(SerialConfig::default())
}
