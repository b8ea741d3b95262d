//! Logical, conditional-move, and extended-group executor tests.

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
fn boolean_operations() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0xF0F0);
    ctx.set_reg(2, 0xFF00);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::AND, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xF000);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::BIS, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xFFF0);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::XOR, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x0FF0);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::BIC, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x00F0);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::ORNOT, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xF0F0 | !0xFF00u64);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::EQV, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xF0F0u64 ^ !0xFF00u64);
}

#[test]
fn mov_via_bis_with_r31() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0x1234);
    // The canonical `mov r2, r3`: bis r31, r2, r3.
    run_one(&mut ctx, encode::operate(op::INTL, op::intl::BIS, 31, 2, 3));
    assert_eq!(ctx.reg(3), 0x1234);
}

#[test]
fn cmove_transfers_only_when_condition_holds() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0);
    ctx.set_reg(2, 0xAA);
    ctx.set_reg(3, 0x11);

    run_one(&mut ctx, encode::operate(op::INTL, op::intl::CMOVEQ, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0xAA, "Ra == 0 moves Rb");

    ctx.set_reg(1, 5);
    ctx.set_reg(3, 0x11);
    run_one(&mut ctx, encode::operate(op::INTL, op::intl::CMOVEQ, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x11, "Ra != 0 leaves Rc alone");
}

#[test]
fn cmovlt_uses_signed_comparison() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, (-1i64) as u64);
    ctx.set_reg(2, 0x77);
    ctx.set_reg(3, 0);
    run_one(&mut ctx, encode::operate(op::INTL, op::intl::CMOVLT, 1, 2, 3));
    assert_eq!(ctx.reg(3), 0x77);
}

#[test]
fn amask_reports_bwx_and_cix() {
    let mut ctx = TestContext::new();
    run_one(&mut ctx, encode::operate_lit(op::INTL, op::intl::AMASK, 31, 0xFF, 3));
    // Implemented feature bits read back clear.
    assert_eq!(ctx.reg(3) & 0b101, 0);
    assert_ne!(ctx.reg(3) & 0b010, 0, "FIX not claimed");
}

// ══════════════════════════════════════════════════════════
// Extended integer group (0x1C)
// ══════════════════════════════════════════════════════════

#[test]
fn sign_extensions() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0x80);
    run_one(&mut ctx, encode::operate(op::FPTI, 0x00, 31, 2, 3));
    assert_eq!(ctx.reg(3), 0xFFFF_FFFF_FFFF_FF80);

    ctx.set_reg(2, 0x8000);
    run_one(&mut ctx, encode::operate(op::FPTI, 0x01, 31, 2, 3));
    assert_eq!(ctx.reg(3), 0xFFFF_FFFF_FFFF_8000);
}

#[test]
fn population_counts() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0xFF00_0000_0000_0001);

    run_one(&mut ctx, encode::operate(op::FPTI, 0x30, 31, 2, 3));
    assert_eq!(ctx.reg(3), 9, "ctpop");

    run_one(&mut ctx, encode::operate(op::FPTI, 0x32, 31, 2, 3));
    assert_eq!(ctx.reg(3), 0, "ctlz of a value with bit 63 set");

    run_one(&mut ctx, encode::operate(op::FPTI, 0x33, 31, 2, 3));
    assert_eq!(ctx.reg(3), 0, "cttz of an odd value");

    ctx.set_reg(2, 0x10);
    run_one(&mut ctx, encode::operate(op::FPTI, 0x33, 31, 2, 3));
    assert_eq!(ctx.reg(3), 4);
}

#[test]
fn perr_sums_absolute_byte_differences() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0x0000_0000_0000_0a05);
    ctx.set_reg(2, 0x0000_0000_0000_050a);
    run_one(&mut ctx, encode::operate(op::FPTI, 0x31, 1, 2, 3));
    assert_eq!(ctx.reg(3), 10);
}

#[test]
fn unknown_function_is_illegal() {
    let mut ctx = TestContext::new();
    ctx.load_program(BASE, &[encode::operate(op::INTL, 0x7F, 1, 2, 3)]);
    assert_eq!(ctx.step(), StepOutcome::Exception);
    assert_eq!(ctx.machine.cpu(0).frame_depth(), 1);
}
