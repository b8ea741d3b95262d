//! Physical memory tests: bounds checking and little-endian access.

use axp_core::common::error::MemoryFaultKind;
use axp_core::soc::phys::PhysicalMemory;

#[test]
fn fresh_memory_reads_zero() {
    let mem = PhysicalMemory::new(4096);
    assert_eq!(mem.read(0, 8).unwrap(), 0);
    assert_eq!(mem.read(4088, 8).unwrap(), 0);
}

#[test]
fn write_read_round_trip_all_sizes() {
    let mem = PhysicalMemory::new(4096);
    for &size in &[1usize, 2, 4, 8] {
        let value = 0xDEAD_BEEF_CAFE_BABEu64 & (u64::MAX >> (64 - size * 8));
        mem.write(64, value, size).unwrap();
        assert_eq!(mem.read(64, size).unwrap(), value, "size {size}");
    }
}

#[test]
fn little_endian_layout() {
    let mem = PhysicalMemory::new(64);
    mem.write(0, 0x0102_0304, 4).unwrap();
    assert_eq!(mem.read(0, 1).unwrap(), 0x04);
    assert_eq!(mem.read(1, 1).unwrap(), 0x03);
    assert_eq!(mem.read(2, 1).unwrap(), 0x02);
    assert_eq!(mem.read(3, 1).unwrap(), 0x01);
}

// ══════════════════════════════════════════════════════════
// Boundary behavior
// ══════════════════════════════════════════════════════════

#[test]
fn last_byte_succeeds_one_past_fails() {
    let mem = PhysicalMemory::new(4096);

    assert!(mem.read(4095, 1).is_ok());
    assert!(mem.write(4095, 0xFF, 1).is_ok());

    let err = mem.read(4096, 1).unwrap_err();
    assert_eq!(err.kind, MemoryFaultKind::BusError);
    assert_eq!(err.address, 4096);
}

#[test]
fn straddling_the_end_fails() {
    let mem = PhysicalMemory::new(4096);
    let err = mem.read(4089, 8).unwrap_err();
    assert_eq!(err.kind, MemoryFaultKind::BusError);
    assert!(mem.write(4089, 0, 8).is_err());
}

#[test]
fn huge_address_does_not_wrap() {
    let mem = PhysicalMemory::new(4096);
    assert!(mem.read(u64::MAX - 3, 8).is_err());
    assert!(!mem.contains(u64::MAX, 8));
}

#[test]
fn byte_slice_round_trip() {
    let mem = PhysicalMemory::new(256);
    let data = [1u8, 2, 3, 4, 5];
    mem.write_bytes(10, &data).unwrap();
    let mut buf = [0u8; 5];
    mem.read_bytes(10, &mut buf).unwrap();
    assert_eq!(buf, data);
}
