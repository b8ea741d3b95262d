//! MISC-group executor tests: barriers, RPCC, RC/RS, prefetch hints.

use axp_core::cpu::step::StepOutcome;
use axp_core::isa::opcodes as op;

use crate::common::encode;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

#[test]
fn mb_drains_the_write_buffer() {
    let mut ctx = TestContext::new();
    ctx.set_reg(1, 0x2000);
    ctx.set_reg(2, 0x42);
    ctx.load_program(
        BASE,
        &[encode::mem(op::STQ, 2, 1, 0), encode::misc(op::misc::MB)],
    );

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.machine.cpu(0).mem.cache.write_buffer_depth(), 1);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.machine.cpu(0).mem.cache.write_buffer_depth(), 0);
    assert_eq!(ctx.machine.cpu(0).stats.barriers, 1);
}

#[test]
fn wmb_and_trapb_also_count_as_barriers() {
    let mut ctx = TestContext::new();
    ctx.load_program(
        BASE,
        &[encode::misc(op::misc::WMB), encode::misc(op::misc::TRAPB)],
    );
    ctx.run_steps(2);
    assert_eq!(ctx.machine.cpu(0).stats.barriers, 2);
}

#[test]
fn rpcc_tracks_retirement() {
    let mut ctx = TestContext::new();
    ctx.load_program(
        BASE,
        &[
            encode::operate_lit(op::INTA, op::inta::ADDQ, 31, 1, 2),
            encode::operate_lit(op::INTA, op::inta::ADDQ, 31, 1, 2),
            encode::misc_reg(op::misc::RPCC, 5, 31),
        ],
    );
    ctx.run_steps(3);
    assert_eq!(ctx.reg(5), 2, "two instructions retired before the read");
}

#[test]
fn rc_and_rs_manage_the_interrupt_flag() {
    let mut ctx = TestContext::new();
    ctx.load_program(
        BASE,
        &[
            encode::misc_reg(op::misc::RS, 1, 31), // set, returns old (0)
            encode::misc_reg(op::misc::RC, 2, 31), // clear, returns old (1)
            encode::misc_reg(op::misc::RC, 3, 31), // clear again, returns 0
        ],
    );
    ctx.run_steps(3);
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 1);
    assert_eq!(ctx.reg(3), 0);
}

#[test]
fn prefetch_hints_have_no_architectural_effect() {
    let mut ctx = TestContext::new();
    ctx.set_reg(2, 0x2000);
    ctx.load_program(BASE, &[encode::misc_reg(op::misc::FETCH, 31, 2)]);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.machine.cpu(0).pc(), BASE + 4);
}

#[test]
fn unknown_misc_function_is_illegal() {
    let mut ctx = TestContext::new();
    ctx.load_program(BASE, &[encode::misc(0x1234)]);
    assert_eq!(ctx.step(), StepOutcome::Exception);
}
