//! IPR bank tests.

use axp_core::arch::ipr::{Ipr, IprFile};

#[test]
fn whami_holds_cpu_ordinal_and_is_immutable() {
    let mut file = IprFile::new(3);
    assert_eq!(file.read(Ipr::Whami), 3);

    file.write(Ipr::Whami, 99);
    assert_eq!(file.read(Ipr::Whami), 3);
}

#[test]
fn write_then_read() {
    let mut file = IprFile::new(0);
    file.write(Ipr::Ptbr, 0x4_0000);
    file.write(Ipr::Scbb, 0x8_0000);
    assert_eq!(file.read(Ipr::Ptbr), 0x4_0000);
    assert_eq!(file.read(Ipr::Scbb), 0x8_0000);
}

#[test]
fn reset_preserves_whami() {
    let mut file = IprFile::new(2);
    file.write(Ipr::Ksp, 0x1234);
    file.reset();
    assert_eq!(file.read(Ipr::Ksp), 0);
    assert_eq!(file.read(Ipr::Whami), 2);
}

#[test]
fn from_number_round_trips_known_registers() {
    assert_eq!(Ipr::from_number(0), Some(Ipr::Asn));
    assert_eq!(Ipr::from_number(12), Some(Ipr::Ptbr));
    assert_eq!(Ipr::from_number(13), Some(Ipr::Scbb));
    assert_eq!(Ipr::from_number(17), Some(Ipr::Whami));
    assert_eq!(Ipr::from_number(1000), None);
}
