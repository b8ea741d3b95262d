//! The instruction step loop.
//!
//! Execution proceeds one architectural instruction at a time through fetch,
//! decode, execute, and writeback. Pause requests, coherency events, and
//! interrupts are honored at instruction boundaries only; a fault anywhere
//! in the pipeline delivers an exception without committing any state of the
//! faulting instruction.

use crate::common::constants::{INSTRUCTION_SIZE, PAGE_SHIFT};
use crate::common::data::AccessType;
use crate::common::error::Exception;
use crate::isa::decode::decode;
use crate::isa::disasm::disassemble;
use crate::smp::CoherencyEvent;

use super::{CoreState, CpuCore, Flow};

/// Outcome of one call to [`CpuCore::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction retired normally.
    Retired,
    /// An exception was delivered; the PAL handler runs next.
    Exception,
    /// An interrupt was accepted at the instruction boundary.
    Interrupted,
    /// The CPU is in `Reset` or `Paused` and did nothing.
    Idle,
    /// The CPU is halted (terminal).
    Halted,
}

impl CpuCore {
    /// Executes one architectural instruction.
    pub fn step(&mut self) -> StepOutcome {
        match self.state {
            CoreState::Reset | CoreState::Paused => return StepOutcome::Idle,
            CoreState::Halted => return StepOutcome::Halted,
            CoreState::Running | CoreState::ExceptionHandling => {}
        }

        if self.pause_pending() {
            self.state = CoreState::Paused;
            return StepOutcome::Idle;
        }

        self.drain_coherency();

        // Interrupt acceptance: only between instructions, never in PAL
        // mode, and only for levels above the current IPL.
        if !self.ps.pal_mode() && self.ps.interrupts_enabled() {
            if let Some(int) = self.coord.take_interrupt(self.cpu_id, self.ps.ipl()) {
                let exc = Exception::Interrupt {
                    vector: int.vector,
                    level: int.level,
                };
                self.stats.interrupts_taken += 1;
                self.deliver_exception(&exc, self.pc(), 0);
                return StepOutcome::Interrupted;
            }
        }

        let pc = self.pc();
        let decoded = match self.hot.lookup(pc).copied() {
            Some(d) => {
                self.stats.hot_fetches += 1;
                d
            }
            None => {
                let ctx = self.mmu_ctx();
                let raw = match self.mem.fetch(&ctx, pc) {
                    Ok(raw) => raw,
                    Err(fault) => {
                        self.deliver_exception(&Exception::Memory(fault), pc, 0);
                        return StepOutcome::Exception;
                    }
                };
                let d = decode(raw);
                if self.hot.profile(pc) {
                    if let Some(pa) = self.mem.probe(&ctx, pc, AccessType::Fetch) {
                        self.hot.install(pc, d, pa.ppn());
                    }
                }
                d
            }
        };

        if self.trace {
            tracing::trace!(
                cpu = self.cpu_id,
                pc = format_args!("{pc:#x}"),
                "{}",
                disassemble(decoded.raw, pc)
            );
        }

        match self.execute(&decoded) {
            Ok(Flow::Next) => self.set_pc(pc.wrapping_add(INSTRUCTION_SIZE)),
            Ok(Flow::Jump(target)) => self.set_pc(target),
            Ok(Flow::Halt) => {
                tracing::info!(cpu = self.cpu_id, pc = format_args!("{pc:#x}"), "halt");
                self.state = CoreState::Halted;
                return StepOutcome::Halted;
            }
            Err(exc) => {
                // Arithmetic and FP traps complete the instruction; every
                // other exception restarts it after PALcode intervenes.
                let resume = match exc {
                    Exception::Arithmetic(_) | Exception::FloatingPoint(_) => {
                        pc.wrapping_add(INSTRUCTION_SIZE)
                    }
                    _ => pc,
                };
                self.deliver_exception(&exc, resume, decoded.raw);
                return StepOutcome::Exception;
            }
        }

        self.stats.instructions_retired += 1;
        StepOutcome::Retired
    }

    /// Applies every coherency event queued by peer CPUs.
    fn drain_coherency(&mut self) {
        for event in self.coord.take_coherency_events(self.cpu_id) {
            match event {
                CoherencyEvent::InvalidateLine(line) => {
                    self.hot.invalidate_page(line >> PAGE_SHIFT);
                }
                CoherencyEvent::TlbShootdown(_) => self.hot.invalidate_all(),
            }
            self.mem.apply_coherency(event);
        }
    }
}
