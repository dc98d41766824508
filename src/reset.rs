//! Reset sequences for targets wired the usual auto-reset way: RTS pulls the
//! reset (EN) pin low, DTR pulls the boot strap pin low.

use crate::error::Result;
use crate::serial::ControlSerial;
use log::debug;
use std::thread;
use std::time::Duration;

/// How long reset is held asserted.
pub const RESET_PULSE: Duration = Duration::from_millis(100);
/// How long the boot strap is held after reset is released.
pub const DEFAULT_BOOT_HOLD: Duration = Duration::from_millis(50);

/// Resets the target with the boot strap asserted so it starts its ROM
/// bootloader, then releases both lines.
pub fn enter_bootloader<S: ControlSerial + ?Sized>(
    serial: &mut S,
    boot_hold: Duration,
) -> Result<()> {
    debug!("Resetting target into bootloader");
    serial.set_dtr(false)?;
    serial.set_rts(true)?;
    thread::sleep(RESET_PULSE);
    serial.set_dtr(true)?;
    serial.set_rts(false)?;
    thread::sleep(boot_hold);
    serial.set_dtr(false)?;
    Ok(())
}

/// Pulses reset with the boot strap released so the target runs its
/// application.
pub fn hard_reset<S: ControlSerial + ?Sized>(serial: &mut S) -> Result<()> {
    debug!("Hard resetting target");
    serial.set_dtr(false)?;
    serial.set_rts(true)?;
    thread::sleep(RESET_PULSE);
    serial.set_rts(false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Line {
        Dtr(bool),
        Rts(bool),
    }

    #[derive(Default)]
    struct LineRecorder {
        calls: Vec<Line>,
    }

    impl ControlSerial for LineRecorder {
        fn set_dtr(&mut self, active: bool) -> Result<()> {
            self.calls.push(Line::Dtr(active));
            Ok(())
        }
        fn set_rts(&mut self, active: bool) -> Result<()> {
            self.calls.push(Line::Rts(active));
            Ok(())
        }
        fn write(&mut self, data: &[u8]) -> Result<usize> {
            Ok(data.len())
        }
        fn read(&mut self, _count: usize) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn flush_input(&mut self) -> Result<()> {
            Ok(())
        }
        fn flush_output(&mut self) -> Result<()> {
            Ok(())
        }
        fn bytes_available(&self) -> usize {
            0
        }
        fn baud_rate(&self) -> u32 {
            115_200
        }
        fn set_baud_rate(&mut self, _baud_rate: u32) -> Result<()> {
            Ok(())
        }
        fn timeout(&self) -> Duration {
            Duration::ZERO
        }
        fn set_timeout(&mut self, _timeout: Duration) {}
    }

    #[test]
    fn bootloader_sequence_holds_strap_across_reset_release() {
        let mut recorder = LineRecorder::default();
        enter_bootloader(&mut recorder, Duration::ZERO).unwrap();
        assert_eq!(
            recorder.calls,
            vec![
                Line::Dtr(false),
                Line::Rts(true),
                Line::Dtr(true),
                Line::Rts(false),
                Line::Dtr(false),
            ]
        );
    }

    #[test]
    fn hard_reset_leaves_strap_released() {
        let mut recorder = LineRecorder::default();
        hard_reset(&mut recorder).unwrap();
        assert_eq!(
            recorder.calls,
            vec![Line::Dtr(false), Line::Rts(true), Line::Rts(false)]
        );
    }
}
