//! Reservation table tests.
//!
//! The table is linearizable: a store and a concurrent store-conditional to
//! the same 16-byte block can never both succeed.

use std::sync::Arc;
use std::time::Duration;

use axp_core::smp::SmpCoordinator;

fn coordinator(cpus: usize) -> SmpCoordinator {
    SmpCoordinator::new(cpus, Duration::from_secs(5))
}

// ══════════════════════════════════════════════════════════
// 1. Basic lifecycle
// ══════════════════════════════════════════════════════════

#[test]
fn sc_succeeds_with_intact_reservation() {
    let coord = coordinator(2);
    coord.record_reservation(0, 0x2000, 8);
    assert!(coord.try_store_conditional(0, 0x2000, 8));
}

#[test]
fn sc_consumes_the_reservation() {
    let coord = coordinator(2);
    coord.record_reservation(0, 0x2000, 8);
    assert!(coord.try_store_conditional(0, 0x2000, 8));
    assert!(!coord.try_store_conditional(0, 0x2000, 8), "second SC fails");
}

#[test]
fn sc_fails_without_reservation() {
    let coord = coordinator(2);
    assert!(!coord.try_store_conditional(0, 0x2000, 8));
}

#[test]
fn failed_sc_also_clears_the_reservation() {
    let coord = coordinator(2);
    coord.record_reservation(0, 0x2000, 8);
    assert!(!coord.try_store_conditional(0, 0x3000, 8), "wrong block");
    assert!(!coord.has_reservation(0));
}

#[test]
fn size_mismatch_fails() {
    let coord = coordinator(1);
    coord.record_reservation(0, 0x2000, 4);
    assert!(!coord.try_store_conditional(0, 0x2000, 8));
}

// ══════════════════════════════════════════════════════════
// 2. Block granularity
// ══════════════════════════════════════════════════════════

#[test]
fn reservation_covers_the_16_byte_block() {
    let coord = coordinator(1);
    coord.record_reservation(0, 0x2004, 4);
    // Same block, different offset.
    assert!(coord.try_store_conditional(0, 0x2008, 4));
}

#[test]
fn store_to_the_block_invalidates_every_holder() {
    let coord = coordinator(3);
    coord.record_reservation(0, 0x2000, 8);
    coord.record_reservation(1, 0x2008, 8);
    coord.record_reservation(2, 0x3000, 8);

    coord.invalidate_block(0x2004);

    assert!(!coord.try_store_conditional(0, 0x2000, 8));
    assert!(!coord.try_store_conditional(1, 0x2008, 8));
    assert!(coord.try_store_conditional(2, 0x3000, 8), "other block untouched");
}

#[test]
fn store_outside_the_block_leaves_reservations_alone() {
    let coord = coordinator(1);
    coord.record_reservation(0, 0x2000, 8);
    coord.invalidate_block(0x2010);
    assert!(coord.try_store_conditional(0, 0x2000, 8));
}

#[test]
fn successful_sc_clears_peer_reservations_on_the_block() {
    let coord = coordinator(2);
    coord.record_reservation(0, 0x2000, 8);
    coord.record_reservation(1, 0x2008, 8);

    assert!(coord.try_store_conditional(0, 0x2000, 8));
    assert!(!coord.try_store_conditional(1, 0x2008, 8), "peer lost its reservation");
}

// ══════════════════════════════════════════════════════════
// 3. Linearizability under contention
// ══════════════════════════════════════════════════════════

#[test]
fn concurrent_sc_on_one_block_has_a_single_winner() {
    let coord = Arc::new(coordinator(8));
    for cpu in 0..8 {
        coord.record_reservation(cpu, 0x4000, 8);
    }

    let winners: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|cpu| {
                let coord = Arc::clone(&coord);
                scope.spawn(move || usize::from(coord.try_store_conditional(cpu, 0x4000, 8)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
    });

    assert_eq!(winners, 1, "exactly one SC wins the block");
}

#[test]
fn concurrent_store_and_sc_never_both_succeed_in_order() {
    // Deterministic interleaving: the store lands between LL and SC.
    let coord = coordinator(2);
    coord.record_reservation(0, 0x5000, 4);
    coord.invalidate_block(0x5000);
    assert!(!coord.try_store_conditional(0, 0x5000, 4));
}
