//! FPCR tests: rounding field, sticky flags, trap enables.

use axp_core::arch::fpcr::{Fpcr, RoundingMode};
use axp_core::common::error::FpException;

#[test]
fn new_fpcr_rounds_to_nearest() {
    assert_eq!(Fpcr::new().dynamic_rounding(), RoundingMode::Normal);
}

#[test]
fn dynamic_rounding_round_trips() {
    let mut fpcr = Fpcr::new();
    for mode in [
        RoundingMode::Chopped,
        RoundingMode::MinusInfinity,
        RoundingMode::Normal,
        RoundingMode::PlusInfinity,
    ] {
        fpcr.set_dynamic_rounding(mode);
        assert_eq!(fpcr.dynamic_rounding(), mode);
    }
}

#[test]
fn status_flags_are_sticky() {
    let mut fpcr = Fpcr::new();
    assert!(!fpcr.status(FpException::Inexact));

    fpcr.set_status(FpException::Inexact);
    fpcr.set_status(FpException::Overflow);
    assert!(fpcr.status(FpException::Inexact));
    assert!(fpcr.status(FpException::Overflow));
    assert!(!fpcr.status(FpException::Invalid));

    fpcr.clear_status();
    assert!(!fpcr.status(FpException::Inexact));
    assert!(!fpcr.status(FpException::Overflow));
}

#[test]
fn traps_default_disabled() {
    let fpcr = Fpcr::new();
    for exc in [
        FpException::Invalid,
        FpException::DivByZero,
        FpException::Overflow,
        FpException::Underflow,
        FpException::Inexact,
    ] {
        assert!(!fpcr.trap_enabled(exc));
    }
    assert!(!fpcr.integer_overflow_trap_enabled());
}

#[test]
fn trap_enable_round_trips() {
    let mut fpcr = Fpcr::new();
    fpcr.set_trap_enabled(FpException::DivByZero, true);
    assert!(fpcr.trap_enabled(FpException::DivByZero));
    assert!(!fpcr.trap_enabled(FpException::Overflow));

    fpcr.set_trap_enabled(FpException::DivByZero, false);
    assert!(!fpcr.trap_enabled(FpException::DivByZero));
}

#[test]
fn integer_overflow_flag_and_enable() {
    let mut fpcr = Fpcr::new();
    fpcr.set_integer_overflow();
    assert!(fpcr.integer_overflow());

    fpcr.set_integer_overflow_trap_enabled(true);
    assert!(fpcr.integer_overflow_trap_enabled());
}

#[test]
fn raw_round_trip() {
    let mut fpcr = Fpcr::new();
    fpcr.set_dynamic_rounding(RoundingMode::PlusInfinity);
    fpcr.set_status(FpException::Underflow);
    let restored = Fpcr::from_raw(fpcr.raw());
    assert_eq!(restored, fpcr);
}
