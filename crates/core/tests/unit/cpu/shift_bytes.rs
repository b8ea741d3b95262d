//! Shift and byte-manipulation executor tests.

use axp_core::cpu::step::StepOutcome;
use axp_core::isa::opcodes as op;

use crate::common::encode;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

fn run_one(ctx: &mut TestContext, inst: u32) {
    ctx.load_program(BASE, &[inst]);
    assert_eq!(ctx.step(), StepOutcome::Retired);
}

#[test]
fn shifts_mask_the_count_to_six_bits() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 1);
    run_one(&mut ctx, encode::operate_lit(op::INTS, op::ints::SLL, 1, 63, 3));
    assert_eq!(ctx.reg(3), 1 << 63);

    ctx.set_reg(1, 0x8000_0000_0000_0000);
    run_one(&mut ctx, encode::operate_lit(op::INTS, op::ints::SRL, 1, 63, 3));
    assert_eq!(ctx.reg(3), 1);

    run_one(&mut ctx, encode::operate_lit(op::INTS, op::ints::SRA, 1, 4, 3));
    assert_eq!(ctx.reg(3), 0xF800_0000_0000_0000, "arithmetic shift drags the sign");
}

#[test]
fn zap_and_zapnot() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0x1122_3344_5566_7788);

    // Clear the low four bytes.
    run_one(&mut ctx, encode::operate_lit(op::INTS, op::ints::ZAP, 1, 0x0F, 3));
    assert_eq!(ctx.reg(3), 0x1122_3344_0000_0000);

    // Keep only the low four bytes.
    run_one(&mut ctx, encode::operate_lit(op::INTS, op::ints::ZAPNOT, 1, 0x0F, 3));
    assert_eq!(ctx.reg(3), 0x0000_0000_5566_7788);
}

#[test]
fn extract_byte_and_word() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0x1122_3344_5566_7788);
    ctx.set_reg(2, 2);

    run_one(&mut ctx, encode::operate(op::INTS, op::ints::EXTBL, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x66);

    run_one(&mut ctx, encode::operate(op::INTS, op::ints::EXTWL, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x5566);

    run_one(&mut ctx, encode::operate(op::INTS, op::ints::EXTLL, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x3344_5566);
}

#[test]
fn insert_and_mask_byte() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0xAB);
    ctx.set_reg(2, 3);
    run_one(&mut ctx, encode::operate(op::INTS, op::ints::INSBL, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xAB00_0000);

    ctx.set_reg(1, 0xFFFF_FFFF_FFFF_FFFF);
    run_one(&mut ctx, encode::operate(op::INTS, op::ints::MSKBL, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xFFFF_FFFF_00FF_FFFF);
}

// ══════════════════════════════════════════════════════════
// The unaligned-load idiom: extql/extqh recombination
// ══════════════════════════════════════════════════════════

#[test]
fn extql_extqh_recombine_an_unaligned_quadword() {
    let mut ctx = TestContext::new();
    // Quadwords at 0 and 8; the unaligned value spans offset 3.
    let lo = 0x8877_6655_4433_2211u64;
    let hi = 0x00FF_EEDD_CCBB_AA99u64;
    let addr = 3u64;

    ctx.set_reg(1, lo);
    ctx.set_reg(2, hi);
    ctx.set_reg(4, addr);

    run_one(&mut ctx, encode::operate(op::INTS, op::ints::EXTQL, 1, 4, 5));
    run_one(&mut ctx, encode::operate(op::INTS, op::ints::EXTQH, 2, 4, 6));
    run_one(&mut ctx, encode::operate(op::INTL, op::intl::BIS, 5, 6, 7));

    // Bytes 3..10 of the combined 16-byte buffer.
    let expected = (lo >> 24) | (hi << 40);
    assert_eq!(ctx.reg(7), expected);
}

#[test]
fn extqh_with_zero_offset_contributes_nothing() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0xFFFF_FFFF_FFFF_FFFF);
    ctx.set_reg(2, 8); // offset bits are zero
    run_one(&mut ctx, encode::operate(op::INTS, op::ints::EXTQH, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0);
}

#[test]
fn inswh_carries_the_overflowed_bytes() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0xABCD);
    ctx.set_reg(2, 7);
    run_one(&mut ctx, encode::operate(op::INTS, op::ints::INSWH, 1, 2, 3));
    // Byte offset 7: the word's high byte spills into byte 0 of the
    // next quadword.
    assert_eq!(ctx.reg(3), 0xAB);
}
