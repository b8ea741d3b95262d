//! Control-flow executor tests.

use axp_core::cpu::step::StepOutcome;
use axp_core::isa::opcodes as op;

use crate::common::encode;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

#[test]
fn br_jumps_and_links() {
    let mut ctx = TestContext::new();
    ctx.load_program(BASE, &[encode::branch(op::BR, 26, 4)]);
    assert_eq!(ctx.step(), StepOutcome::Retired);

    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 + 16);
    assert_eq!(ctx.reg(26), BASE + 4, "return address in Ra");
}

#[test]
fn conditional_branch_taken_and_not_taken() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0);
    ctx.load_program(BASE, &[encode::branch(op::BEQ, 1, 8)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 + 32, "taken");

    let mut ctx = TestContext::new();
    ctx.set_reg(1, 7);
    ctx.load_program(BASE, &[encode::branch(op::BEQ, 1, 8)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4, "fall through");
}

#[test]
fn backward_branch() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 1);
    // Place the branch far enough in that a backward displacement stays
    // inside RAM.
    ctx.load_program(BASE, &[encode::branch(op::BNE, 1, -2)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 - 8);
}

#[test]
fn signed_condition_branches() {
    for (opcode, value, expect_taken) in [
        (op::BLT, (-1i64) as u64, true),
        (op::BLT, 0, false),
        (op::BLE, 0, true),
        (op::BGE, 0, true),
        (op::BGT, 1, true),
        (op::BGT, 0, false),
    ] {
        let mut ctx = TestContext::new();
        ctx.set_reg(1, value);
        ctx.load_program(BASE, &[encode::branch(opcode, 1, 4)]);
        let _ = ctx.step();
        let expected = if expect_taken { BASE + 4 + 16 } else { BASE + 4 };
        assert_eq!(ctx.machine.cpu(0).pc(), expected, "opcode {opcode:#x} value {value:#x}");
    }
}

#[test]
fn low_bit_branches() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0b1010);
    ctx.load_program(BASE, &[encode::branch(op::BLBC, 1, 4)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 + 16, "low bit clear taken");

    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0b1011);
    ctx.load_program(BASE, &[encode::branch(op::BLBS, 1, 4)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 + 16, "low bit set taken");
}

#[test]
fn fp_branches_test_the_register_value() {
    let mut ctx = TestContext::new();
    ctx.machine.cpu_mut(0).ps.set_fp_enabled(true);
    ctx.set_freg(1, -1.5);
    ctx.load_program(BASE, &[encode::branch(op::FBLT, 1, 4)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 + 16);

    let mut ctx = TestContext::new();
    ctx.machine.cpu_mut(0).ps.set_fp_enabled(true);
    ctx.set_freg(1, 0.0);
    ctx.load_program(BASE, &[encode::branch(op::FBEQ, 1, 4)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4 + 16);
}

#[test]
fn jmp_targets_rb_with_low_bits_cleared() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0x2003);
    ctx.load_program(BASE, &[encode::jsr(op::jsr::JMP, 26, 2)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), 0x2000);
    assert_eq!(ctx.reg(26), BASE + 4);
}

#[test]
fn jsr_ret_pair_keeps_the_hint_stack_clean() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0x2000);
    ctx.load_program(BASE, &[encode::jsr(op::jsr::JSR, 26, 2)]);
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), 0x2000);

    // Return through the saved address.
    ctx.machine
        .phys()
        .write(0x2000, u64::from(encode::jsr(op::jsr::RET, 31, 26)), 4)
        .unwrap();
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4);
    assert_eq!(ctx.machine.cpu(0).stats.ras_mispredicts, 0);
}

#[test]
fn mismatched_ret_counts_a_misprediction() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0x2000);
    ctx.set_reg(3, 0x3000);
    ctx.load_program(
        BASE,
        &[encode::jsr(op::jsr::JSR, 26, 2)],
    );
    let _ = ctx.step();

    // RET to somewhere other than the predicted return address.
    ctx.machine
        .phys()
        .write(0x2000, u64::from(encode::jsr(op::jsr::RET, 31, 3)), 4)
        .unwrap();
    let _ = ctx.step();
    assert_eq!(ctx.machine.cpu(0).pc(), 0x3000, "prediction never affects architecture");
    assert_eq!(ctx.machine.cpu(0).stats.ras_mispredicts, 1);
}
