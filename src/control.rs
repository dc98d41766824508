//! DTR emulation on CTS through asynchronous bitbang mode.
//!
//! Many FTDI cables only bring out RTS and CTS. To give a target both a reset
//! line and a boot-mode line, the chip is switched into bitbang mode whenever
//! either logical signal is active, and one output byte drives both pins:
//!
//! | DTR   | RTS   | mode    | CTS pin  | RTS pin |
//! |-------|-------|---------|----------|---------|
//! | false | false | normal  | floating | high    |
//! | false | true  | bitbang | high     | high    |
//! | true  | false | bitbang | low      | high    |
//! | true  | true  | bitbang | low      | low     |
//!
//! Bitbang mode is entered lazily and left as soon as both signals go
//! inactive.

use crate::consts::lines;
use crate::driver::{BitMode, FlowControl, FtdiDriver};
use crate::error::Result;
use log::{debug, trace};

/// Logical DTR/RTS state plus the physical mode it currently maps to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlLines {
    dtr: bool,
    rts: bool,
    bitbang: bool,
}

impl ControlLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical DTR ("boot mode select").
    pub fn dtr(&self) -> bool {
        self.dtr
    }

    /// Logical RTS ("reset").
    pub fn rts(&self) -> bool {
        self.rts
    }

    /// Whether the chip is currently in bitbang mode.
    pub fn bitbang_active(&self) -> bool {
        self.bitbang
    }

    /// Output byte for the current logical state. Inactive signals drive
    /// their pin high.
    pub fn output_byte(&self) -> u8 {
        output_byte(self.dtr, self.rts)
    }

    pub fn set_dtr<D: FtdiDriver>(&mut self, driver: &mut D, active: bool) -> Result<()> {
        self.dtr = active;
        self.update(driver)
    }

    pub fn set_rts<D: FtdiDriver>(&mut self, driver: &mut D, active: bool) -> Result<()> {
        self.rts = active;
        self.update(driver)
    }

    fn update<D: FtdiDriver>(&mut self, driver: &mut D) -> Result<()> {
        let value = self.output_byte();
        trace!(
            "Control lines dtr={} rts={} bitbang={} -> {:#04x}",
            self.dtr,
            self.rts,
            self.bitbang,
            value
        );

        if !self.dtr && !self.rts {
            if self.bitbang {
                driver.write_data(&[value])?;
                driver.purge_tx()?;
                driver.set_bitmode(0, BitMode::Reset)?;
                driver.set_flow_control(FlowControl::Disabled)?;
                driver.set_rts(false)?;
                debug!("Left bitbang mode");
            }
            self.bitbang = false;
            return Ok(());
        }

        if !self.bitbang {
            driver.set_bitmode(lines::BITBANG_DIRECTION_MASK, BitMode::BitBang)?;
            debug!("Entered bitbang mode");
        }
        self.bitbang = true;
        driver.write_data(&[value])?;
        Ok(())
    }
}

fn output_byte(dtr: bool, rts: bool) -> u8 {
    let mut value = 0;
    if !dtr {
        value |= lines::CTS_HIGH;
    }
    if !rts {
        value |= lines::RTS_HIGH;
    }
    value
}
