//! Hot-path profiling tests.
//!
//! The decode cache must be semantically invisible: identical results with
//! profiling on or off, and invalidation on stores to cached pages and on
//! TLB flushes.

use axp_core::cpu::step::StepOutcome;
use axp_core::isa::opcodes as op;

use crate::common::encode;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

fn hot_ctx(threshold: u32) -> TestContext {
    let mut config = TestContext::config();
    config.general.hot_threshold = threshold;
    TestContext::with_config(config)
}

/// A two-instruction loop: addq r3, r1, r3; br -2 (back to the addq).
fn loop_program() -> [u32; 2] {
    [
        encode::operate(op::INTA, op::inta::ADDQ, 3, 1, 3),
        encode::branch(op::BR, 31, -2),
    ]
}

#[test]
fn hot_loop_serves_fetches_from_the_cache() {
    let mut ctx = hot_ctx(4);
    ctx.set_reg(1, 1);
    ctx.load_program(BASE, &loop_program());

    // 20 iterations of two instructions.
    ctx.run_steps(40);
    let stats = &ctx.machine.cpu(0).stats;
    assert!(stats.hot_fetches > 0, "loop got hot");
    assert_eq!(ctx.reg(3), 20, "semantics identical to plain interpretation");
}

#[test]
fn threshold_zero_disables_profiling() {
    let mut ctx = hot_ctx(0);
    ctx.set_reg(1, 1);
    ctx.load_program(BASE, &loop_program());
    ctx.run_steps(40);
    assert_eq!(ctx.machine.cpu(0).stats.hot_fetches, 0);
    assert_eq!(ctx.reg(3), 20);
}

#[test]
fn store_to_a_cached_page_invalidates_it() {
    let mut ctx = hot_ctx(2);
    ctx.set_reg(1, 1);
    ctx.load_program(BASE, &loop_program());
    ctx.run_steps(20);
    assert!(ctx.machine.cpu(0).stats.hot_fetches > 0);

    // Patch the hot addq into a subq through the CPU's own store path
    // (self-modifying code).
    let patch = encode::operate(op::INTA, op::inta::SUBQ, 3, 1, 3);
    ctx.set_reg(10, u64::from(patch));
    ctx.set_reg(11, BASE);
    ctx.machine.cpu_mut(0).set_pc(0x3000);
    ctx.machine
        .phys()
        .write(0x3000, u64::from(encode::mem(op::STL, 10, 11, 0)), 4)
        .unwrap();
    assert_eq!(ctx.step(), StepOutcome::Retired);

    // Re-run the patched instruction: the stale decode must not be used.
    ctx.set_reg(3, 100);
    ctx.machine.cpu_mut(0).set_pc(BASE);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.reg(3), 99, "patched subq executed, not the cached addq");
}

#[test]
fn tlb_flush_drops_the_decode_cache() {
    let mut ctx = hot_ctx(2);
    ctx.set_reg(1, 1);
    ctx.load_program(BASE, &loop_program());
    ctx.run_steps(12);
    let hot_before = ctx.machine.cpu(0).stats.hot_fetches;
    assert!(hot_before > 0);

    // TBIA through the PAL write path.
    ctx.machine.cpu_mut(0).ps.enter_pal();
    let loop_pc = ctx.machine.cpu(0).pc();
    ctx.machine.cpu_mut(0).set_pc(0x3000);
    ctx.machine
        .phys()
        .write(0x3000, u64::from(encode::hw_mtpr(31, 18)), 4)
        .unwrap();
    assert_eq!(ctx.step(), StepOutcome::Retired);
    ctx.machine.cpu_mut(0).ps.leave_pal();
    ctx.machine.cpu_mut(0).set_pc(loop_pc);

    // The next fetches re-decode and re-profile before going hot again.
    let _ = ctx.step();
    assert_eq!(
        ctx.machine.cpu(0).stats.hot_fetches,
        hot_before,
        "first post-flush fetch missed the decode cache"
    );
}
