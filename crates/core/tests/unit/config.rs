//! Configuration tests: defaults, JSON overrides, and PAL offset tables.

use axp_core::common::error::ExceptionClass;
use axp_core::config::{Config, PalFlavor, PalOffsets};

#[test]
fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.general.num_cpus, 1);
    assert_eq!(config.memory.ram_size, 128 * 1024 * 1024);
    assert!(config.cache.l1_d.enabled);
    assert_eq!(config.cache.l1_d.line_bytes, 64);
    assert_eq!(config.smp.barrier_timeout_ms, 5_000);
    assert_eq!(config.pal.flavor, PalFlavor::Tru64);
}

#[test]
fn json_overrides_selected_fields() {
    let config = Config::from_json(
        r#"{
            "general": { "num_cpus": 4, "hot_threshold": 64 },
            "memory": { "ram_size": 1048576 },
            "pal": { "flavor": "Vms" }
        }"#,
    )
    .unwrap();

    assert_eq!(config.general.num_cpus, 4);
    assert_eq!(config.general.hot_threshold, 64);
    assert_eq!(config.memory.ram_size, 1048576);
    assert_eq!(config.pal.flavor, PalFlavor::Vms);
    // Untouched sections keep their defaults.
    assert_eq!(config.smp.ipi_level, 6);
}

#[test]
fn osf_alias_maps_to_tru64() {
    let config = Config::from_json(r#"{ "pal": { "flavor": "Osf" } }"#).unwrap();
    assert_eq!(config.pal.flavor, PalFlavor::Tru64);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(Config::from_json("{ not json").is_err());
}

#[test]
fn pal_offset_tables_differ_by_flavor() {
    let tru64 = PalOffsets::for_flavor(PalFlavor::Tru64);
    let vms = PalOffsets::for_flavor(PalFlavor::Vms);

    assert_eq!(tru64.offset(ExceptionClass::MachineCheck), 0);
    assert_ne!(
        tru64.offset(ExceptionClass::PageFault),
        vms.offset(ExceptionClass::PageFault)
    );
}

#[test]
fn every_class_has_an_offset() {
    let offsets = PalOffsets::default();
    let classes = [
        ExceptionClass::MachineCheck,
        ExceptionClass::ArithmeticTrap,
        ExceptionClass::AlignmentFault,
        ExceptionClass::IllegalInstruction,
        ExceptionClass::Interrupt,
        ExceptionClass::Ast,
        ExceptionClass::FpException,
        ExceptionClass::PageFault,
        ExceptionClass::AccessViolation,
        ExceptionClass::Unknown,
    ];
    let mut seen = std::collections::HashSet::new();
    for class in classes {
        assert!(seen.insert(offsets.offset(class)), "offsets are distinct");
    }
}
