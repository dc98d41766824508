//! DTR/RTS emulation: mode switches and the byte written for each state.

mod common;

use common::{open_mock, Call};
use ftdi_bitbang_serial::{BitMode, Error, FlowControl};

const ENTER_BITBANG: Call = Call::SetBitmode(0x0D, BitMode::BitBang);

#[test]
fn idle_to_idle_touches_nothing() {
    let (mut serial, handle) = open_mock();
    serial.set_dtr(false).unwrap();
    serial.set_rts(false).unwrap();

    assert!(handle.calls().is_empty());
    assert!(!serial.control_lines().bitbang_active());
}

#[test]
fn rts_only_enters_bitbang_with_cts_high() {
    let (mut serial, handle) = open_mock();
    serial.set_rts(true).unwrap();

    assert_eq!(handle.calls(), vec![ENTER_BITBANG, Call::Write(vec![0x08])]);
    assert!(serial.control_lines().bitbang_active());
}

#[test]
fn dtr_only_enters_bitbang_with_cts_low() {
    let (mut serial, handle) = open_mock();
    serial.set_dtr(true).unwrap();

    assert_eq!(handle.calls(), vec![ENTER_BITBANG, Call::Write(vec![0x04])]);
    assert!(serial.control_lines().bitbang_active());
}

#[test]
fn both_active_drive_both_pins_low() {
    let (mut serial, handle) = open_mock();
    serial.set_dtr(true).unwrap();
    serial.set_rts(true).unwrap();

    assert_eq!(
        handle.calls(),
        vec![
            ENTER_BITBANG,
            Call::Write(vec![0x04]),
            Call::Write(vec![0x00])
        ]
    );
    let lines = serial.control_lines();
    assert!(lines.dtr() && lines.rts());
    assert_eq!(lines.output_byte(), 0x00);
}

#[test]
fn repeating_a_state_rewrites_byte_without_mode_switch() {
    let (mut serial, handle) = open_mock();
    serial.set_rts(true).unwrap();
    serial.set_rts(true).unwrap();

    assert_eq!(handle.count(|c| *c == ENTER_BITBANG), 1);
    assert_eq!(handle.count(|c| *c == Call::Write(vec![0x08])), 2);
}

#[test]
fn releasing_both_leaves_bitbang_once() {
    let (mut serial, handle) = open_mock();
    serial.set_dtr(true).unwrap();
    serial.set_rts(true).unwrap();
    serial.set_dtr(false).unwrap();
    handle.clear();

    serial.set_rts(false).unwrap();
    assert_eq!(
        handle.calls(),
        vec![
            Call::Write(vec![0x0C]),
            Call::PurgeTx,
            Call::SetBitmode(0, BitMode::Reset),
            Call::SetFlowControl(FlowControl::Disabled),
            Call::SetRts(false),
        ]
    );
    assert!(!serial.control_lines().bitbang_active());

    handle.clear();
    serial.set_rts(false).unwrap();
    serial.set_dtr(false).unwrap();
    assert!(handle.calls().is_empty());
}

#[test]
fn every_active_state_returns_to_normal_mode() {
    for (dtr, rts) in [(false, true), (true, false), (true, true)] {
        let (mut serial, _handle) = open_mock();
        serial.set_dtr(dtr).unwrap();
        serial.set_rts(rts).unwrap();
        assert!(serial.control_lines().bitbang_active());

        serial.set_dtr(false).unwrap();
        serial.set_rts(false).unwrap();
        assert!(
            !serial.control_lines().bitbang_active(),
            "still in bitbang after leaving dtr={} rts={}",
            dtr,
            rts
        );
    }
}

#[test]
fn reentering_bitbang_switches_mode_again() {
    let (mut serial, handle) = open_mock();
    serial.set_rts(true).unwrap();
    serial.set_rts(false).unwrap();
    serial.set_dtr(true).unwrap();

    assert_eq!(handle.count(|c| *c == ENTER_BITBANG), 2);
    assert!(serial.control_lines().bitbang_active());
}

#[test]
fn mode_switch_failure_propagates() {
    let (mut serial, handle) = open_mock();
    handle.fail_on("ftdi_set_bitmode");

    let err = serial.set_dtr(true).unwrap_err();
    assert!(matches!(
        err,
        Error::Driver {
            call: "ftdi_set_bitmode",
            ..
        }
    ));
    assert!(!serial.control_lines().bitbang_active());
}
