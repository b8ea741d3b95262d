//! Machine run-loop tests: thread-per-CPU execution, observer events,
//! reset, and the quiesce rendezvous timeout.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axp_core::cpu::CoreState;
use axp_core::isa::opcodes as op;
use axp_core::sim::machine::MachineEvent;
use axp_core::smp::SmpCoordinator;

use crate::common::encode;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

fn counting_program() -> [u32; 3] {
    [
        encode::operate_lit(op::INTA, op::inta::ADDQ, 3, 1, 3),
        encode::operate_lit(op::INTA, op::inta::ADDQ, 3, 1, 3),
        encode::call_pal(0),
    ]
}

#[test]
fn threaded_run_executes_every_cpu_to_halt() {
    let mut ctx = TestContext::with_cpus(4);
    for (i, inst) in counting_program().iter().enumerate() {
        ctx.machine
            .phys()
            .write(BASE + (i as u64) * 4, u64::from(*inst), 4)
            .unwrap();
    }
    for idx in 0..4 {
        ctx.machine.cpu_mut(idx).set_pc(BASE);
    }
    ctx.machine.start_all();

    let retired = ctx.machine.run(1000);

    for idx in 0..4 {
        assert_eq!(ctx.machine.cpu(idx).state, CoreState::Halted);
        assert_eq!(ctx.machine.cpu(idx).regs.read(3), 2, "cpu{idx} ran its adds");
        assert_eq!(retired[idx], 2);
    }
}

#[test]
fn instruction_limit_stops_a_runaway_cpu() {
    let mut ctx = TestContext::new();
    // An infinite loop: br . (displacement -1 re-fetches the branch).
    ctx.load_program(BASE, &[encode::branch(op::BR, 31, -1)]);

    let retired = ctx.machine.run(500);
    assert_eq!(retired[0], 500);
    assert_ne!(ctx.machine.cpu(0).state, CoreState::Halted);
}

#[test]
fn observer_sees_retirements_and_state_changes() {
    let mut ctx = TestContext::new();
    let retired = Arc::new(AtomicU64::new(0));
    let halts = Arc::new(AtomicU64::new(0));

    let retired_sink = Arc::clone(&retired);
    let halts_sink = Arc::clone(&halts);
    ctx.machine.set_observer(Box::new(move |event| match event {
        MachineEvent::InstructionRetired { .. } => {
            let _ = retired_sink.fetch_add(1, Ordering::Relaxed);
        }
        MachineEvent::StateChanged {
            state: CoreState::Halted,
            ..
        } => {
            let _ = halts_sink.fetch_add(1, Ordering::Relaxed);
        }
        MachineEvent::StateChanged { .. } => {}
    }));

    ctx.load_program(BASE, &counting_program());
    ctx.run_steps(3);

    assert_eq!(retired.load(Ordering::Relaxed), 2);
    assert_eq!(halts.load(Ordering::Relaxed), 1);
}

#[test]
fn machine_reset_restores_every_cpu() {
    let mut ctx = TestContext::with_cpus(2);
    ctx.load_program(BASE, &counting_program());
    ctx.run_steps(3);
    assert_eq!(ctx.machine.cpu(0).state, CoreState::Halted);

    ctx.machine.reset();
    for idx in 0..2 {
        assert_eq!(ctx.machine.cpu(idx).state, CoreState::Reset);
        assert_eq!(ctx.machine.cpu(idx).pc(), 0);
    }
    // Memory survives reset; the program is still there.
    assert_eq!(
        ctx.machine.phys().read(BASE, 4).unwrap() as u32,
        counting_program()[0]
    );
}

#[test]
fn quiesce_times_out_without_full_attendance() {
    // Two parties expected, only one arrives: the rendezvous must fail
    // within the configured timeout instead of hanging.
    let coord = SmpCoordinator::new(2, Duration::from_millis(50));
    assert!(!coord.quiesce(), "lone CPU times out");
}

#[test]
fn quiesce_succeeds_when_everyone_arrives() {
    let coord = Arc::new(SmpCoordinator::new(2, Duration::from_secs(5)));
    let ok = std::thread::scope(|scope| {
        let a = {
            let coord = Arc::clone(&coord);
            scope.spawn(move || coord.quiesce())
        };
        let b = {
            let coord = Arc::clone(&coord);
            scope.spawn(move || coord.quiesce())
        };
        a.join().unwrap_or(false) && b.join().unwrap_or(false)
    });
    assert!(ok);
}
