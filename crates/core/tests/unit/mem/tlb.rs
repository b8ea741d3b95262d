//! TLB unit tests.
//!
//! Verifies lookup and refill tagging, permission checks, and all the
//! invalidation operations including the ASM (global) survival rule.

use axp_core::common::data::AccessType;
use axp_core::common::error::MemoryFaultKind;
use axp_core::mem::pte::Pte;
use axp_core::mem::tlb::{Tlb, TlbEntry, TranslateMode};

fn entry(vpn: u64, ppn: u64, asn: u8, flags: u64) -> TlbEntry {
    TlbEntry::from_pte(vpn, Pte::new(ppn, flags | Pte::V), asn)
}

const RWX: u64 = Pte::KRE | Pte::URE | Pte::KWE | Pte::UWE;

// ══════════════════════════════════════════════════════════
// 1. Basic operations
// ══════════════════════════════════════════════════════════

#[test]
fn lookup_miss_on_empty() {
    let tlb = Tlb::new(16);
    assert!(tlb.lookup(0x100, 0).is_none());
}

#[test]
fn fill_and_lookup_hit() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(0xABC, 0x123, 5, RWX));

    let hit = tlb.lookup(0xABC, 5).expect("hit after fill");
    assert_eq!(hit.ppn, 0x123);
    assert!(hit.readable && hit.writable && hit.executable);
    assert!(!hit.kernel_only);
}

#[test]
fn asn_mismatch_misses() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(0x10, 0x20, 5, RWX));
    assert!(tlb.lookup(0x10, 6).is_none());
    assert!(tlb.lookup(0x10, 5).is_some());
}

#[test]
fn global_entry_matches_any_asn() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(0x10, 0x20, 5, RWX | Pte::ASM));
    assert!(tlb.lookup(0x10, 0).is_some());
    assert!(tlb.lookup(0x10, 200).is_some());
}

#[test]
fn aliasing_vpn_evicts_previous_entry() {
    let size = 16u64;
    let mut tlb = Tlb::new(size as usize);
    tlb.fill(entry(0, 0x100, 0, RWX));
    tlb.fill(entry(size, 0x200, 0, RWX));

    assert!(tlb.lookup(size, 0).is_some());
    assert!(tlb.lookup(0, 0).is_none(), "evicted by alias");
}

// ══════════════════════════════════════════════════════════
// 2. Permission checks
// ══════════════════════════════════════════════════════════

#[test]
fn write_to_readonly_page_faults() {
    let e = entry(1, 1, 0, Pte::KRE | Pte::URE);
    assert_eq!(
        Tlb::check_permissions(&e, AccessType::Write, TranslateMode::Kernel),
        Some(MemoryFaultKind::WriteProtectionFault)
    );
    assert_eq!(
        Tlb::check_permissions(&e, AccessType::Read, TranslateMode::Kernel),
        None
    );
}

#[test]
fn fetch_from_no_execute_page_faults() {
    let e = entry(1, 1, 0, RWX | Pte::FOE);
    assert_eq!(
        Tlb::check_permissions(&e, AccessType::Fetch, TranslateMode::Kernel),
        Some(MemoryFaultKind::ExecuteProtectionFault)
    );
}

#[test]
fn user_access_to_kernel_page_is_access_violation() {
    let e = entry(1, 1, 0, Pte::KRE | Pte::KWE);
    assert_eq!(
        Tlb::check_permissions(&e, AccessType::Read, TranslateMode::User),
        Some(MemoryFaultKind::AccessViolation)
    );
    assert_eq!(
        Tlb::check_permissions(&e, AccessType::Read, TranslateMode::Kernel),
        None
    );
}

#[test]
fn fault_on_read_page_denies_reads() {
    let e = entry(1, 1, 0, RWX | Pte::FOR);
    assert_eq!(
        Tlb::check_permissions(&e, AccessType::Read, TranslateMode::Kernel),
        Some(MemoryFaultKind::ProtectionViolation)
    );
}

// ══════════════════════════════════════════════════════════
// 3. Invalidation
// ══════════════════════════════════════════════════════════

#[test]
fn invalidate_all_clears_everything() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(1, 1, 0, RWX));
    tlb.fill(entry(2, 2, 0, RWX | Pte::ASM));

    tlb.invalidate_all();

    assert!(tlb.lookup(1, 0).is_none());
    assert!(tlb.lookup(2, 0).is_none(), "TBIA removes global entries too");
}

#[test]
fn invalidate_by_asn_spares_globals_and_other_asns() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(1, 1, 5, RWX));
    tlb.fill(entry(2, 2, 5, RWX | Pte::ASM));
    tlb.fill(entry(3, 3, 6, RWX));

    tlb.invalidate_by_asn(5);

    assert!(tlb.lookup(1, 5).is_none(), "ASN 5 entry dropped");
    assert!(tlb.lookup(2, 5).is_some(), "global survives ASN invalidation");
    assert!(tlb.lookup(3, 6).is_some(), "other ASN untouched");
}

#[test]
fn invalidate_single_names_one_page() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(1, 1, 0, RWX));
    tlb.fill(entry(2, 2, 0, RWX));

    tlb.invalidate_single(1, 0);

    assert!(tlb.lookup(1, 0).is_none());
    assert!(tlb.lookup(2, 0).is_some());
}

#[test]
fn invalidate_single_removes_global_entries() {
    let mut tlb = Tlb::new(16);
    tlb.fill(entry(1, 1, 0, RWX | Pte::ASM));
    tlb.invalidate_single(1, 99);
    assert!(tlb.lookup(1, 0).is_none());
}
