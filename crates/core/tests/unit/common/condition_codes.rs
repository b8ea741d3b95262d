//! Condition-code helper tests.
//!
//! The Z/N/V/C computation uses signed-overflow detection on the operand
//! and result sign bits, plus unsigned carry (add) or borrow (subtract).

use axp_core::common::reg::condition_codes;

// ══════════════════════════════════════════════════════════
// 1. Zero and negative
// ══════════════════════════════════════════════════════════

#[test]
fn zero_result_sets_z() {
    let flags = condition_codes(0, 5, 5, true);
    assert!(flags.z);
    assert!(!flags.n);
}

#[test]
fn negative_result_sets_n() {
    let result = 3u64.wrapping_sub(5);
    let flags = condition_codes(result, 3, 5, true);
    assert!(flags.n);
    assert!(!flags.z);
}

// ══════════════════════════════════════════════════════════
// 2. Signed overflow
// ══════════════════════════════════════════════════════════

#[test]
fn add_overflow_positive_operands() {
    let a = i64::MAX as u64;
    let b = 1u64;
    let result = a.wrapping_add(b);
    let flags = condition_codes(result, a, b, false);
    assert!(flags.v, "MAX + 1 overflows");
}

#[test]
fn add_no_overflow_mixed_signs() {
    let a = i64::MAX as u64;
    let b = (-1i64) as u64;
    let result = a.wrapping_add(b);
    let flags = condition_codes(result, a, b, false);
    assert!(!flags.v);
}

#[test]
fn sub_overflow_min_minus_one() {
    let a = i64::MIN as u64;
    let b = 1u64;
    let result = a.wrapping_sub(b);
    let flags = condition_codes(result, a, b, true);
    assert!(flags.v, "MIN - 1 overflows");
}

#[test]
fn sub_no_overflow_same_signs() {
    let flags = condition_codes(10u64.wrapping_sub(3), 10, 3, true);
    assert!(!flags.v);
}

// ══════════════════════════════════════════════════════════
// 3. Carry and borrow
// ══════════════════════════════════════════════════════════

#[test]
fn add_carry_on_unsigned_wrap() {
    let a = u64::MAX;
    let b = 2u64;
    let flags = condition_codes(a.wrapping_add(b), a, b, false);
    assert!(flags.c);
}

#[test]
fn add_no_carry_without_wrap() {
    let flags = condition_codes(30, 10, 20, false);
    assert!(!flags.c);
}

#[test]
fn sub_borrow_when_op1_smaller() {
    let flags = condition_codes(3u64.wrapping_sub(5), 3, 5, true);
    assert!(flags.c, "3 - 5 borrows");
}

#[test]
fn sub_no_borrow_when_op1_larger() {
    let flags = condition_codes(2, 5, 3, true);
    assert!(!flags.c);
}
