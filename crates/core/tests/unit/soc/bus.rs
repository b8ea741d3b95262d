//! Bus tests: mapping, overlap refusal, and routed access.

use axp_core::common::error::ConfigError;
use axp_core::soc::bus::Bus;
use axp_core::soc::devices::{Console, Device};

fn console() -> Box<dyn Device> {
    Box::new(Console::new())
}

#[test]
fn resolve_finds_the_claiming_device() {
    let mut bus = Bus::new();
    bus.map(console(), 0x1000, 0x100).unwrap();

    let (mapping, offset) = bus.resolve(0x1040).unwrap();
    assert_eq!(mapping.base, 0x1000);
    assert_eq!(offset, 0x40);

    assert!(bus.resolve(0x0FFF).is_none());
    assert!(bus.resolve(0x1100).is_none());
}

#[test]
fn overlap_is_refused() {
    let mut bus = Bus::new();
    bus.map(console(), 0x1000, 0x100).unwrap();

    let err = bus.map(console(), 0x1080, 0x100).unwrap_err();
    assert!(matches!(err, ConfigError::MappingOverlap { .. }));

    // Exact duplicate is also refused.
    assert!(bus.map(console(), 0x1000, 0x100).is_err());

    // Adjacent ranges are fine.
    bus.map(console(), 0x1100, 0x100).unwrap();
}

#[test]
fn zero_size_mapping_is_refused() {
    let mut bus = Bus::new();
    assert!(matches!(
        bus.map(console(), 0x1000, 0),
        Err(ConfigError::EmptyMapping { .. })
    ));
}

#[test]
fn read_write_route_to_device_registers() {
    let mut bus = Bus::new();
    bus.map(console(), 0x2000, 0x100).unwrap();

    // Status register reads ready.
    assert_eq!(bus.read(0x2008, 8), Some(1));

    // Transmit accepts single bytes only.
    assert_eq!(bus.write(0x2000, b'A' as u64, 1), Some(true));
    assert_eq!(bus.write(0x2000, 0x41, 4), Some(false));

    // Unclaimed addresses return None.
    assert_eq!(bus.read(0x3000, 8), None);
    assert_eq!(bus.write(0x3000, 0, 8), None);
}

#[test]
fn is_mmio_tracks_mappings() {
    let mut bus = Bus::new();
    assert!(!bus.is_mmio(0x2000));
    bus.map(console(), 0x2000, 0x100).unwrap();
    assert!(bus.is_mmio(0x2000));
    assert!(bus.is_mmio(0x20FF));
    assert!(!bus.is_mmio(0x2100));
}

#[test]
fn with_device_reaches_the_console() {
    let mut bus = Bus::new();
    bus.map(console(), 0x2000, 0x100).unwrap();
    let _ = bus.write(0x2000, b'h' as u64, 1);
    let _ = bus.write(0x2000, b'i' as u64, 1);

    let output = bus
        .with_device("CONSOLE", |dev| {
            dev.as_console_mut().map(Console::take_output)
        })
        .flatten()
        .unwrap();
    assert_eq!(output, b"hi");
}
