//! CPU core definition.
//!
//! This module defines the central `CpuCore` structure holding all
//! architectural state of one logical CPU:
//! 1. **State Management:** Registers, program counter, processor status,
//!    and the run-state machine.
//! 2. **Memory:** The per-CPU `MemorySystem` (TLB, caches) borrowing the
//!    shared physical memory and bus.
//! 3. **SMP Integration:** The borrowed coordinator for reservations,
//!    coherency events, and IPIs.

/// Exception frames, PAL entry dispatch, and REI.
pub mod exception;

/// Opcode-family executors.
pub mod exec;

/// Hot-path profiling and decode caching.
pub mod hotpath;

/// The fetch/decode/execute/writeback step loop.
pub mod step;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::RegisterBank;
use crate::common::constants::PC_ALIGN_MASK;
use crate::config::{Config, PalOffsets};
use crate::mem::system::{MemorySystem, MmuContext};
use crate::mem::tlb::TranslateMode;
use crate::arch::ipr::Ipr;
use crate::arch::mode::PrivilegeMode;
use crate::arch::ps::ProcessorStatus;
use crate::smp::SmpCoordinator;
use crate::stats::CpuStats;

use self::exception::ExceptionFrame;
use self::hotpath::HotPathCache;

/// Run state of one CPU.
///
/// `Halted` is terminal; every other state can be left again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreState {
    /// Constructed or reset; not yet started.
    Reset,
    /// Executing instructions.
    Running,
    /// Stopped by an external pause request; all state preserved.
    Paused,
    /// Stopped permanently by HALT or an unrecoverable machine check.
    Halted,
    /// Executing a PAL handler with at least one frame on the stack.
    ExceptionHandling,
}

/// Control-flow outcome of one executed instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Transfer control to the given target.
    Jump(u64),
    /// The CPU halts (terminal).
    Halt,
}

/// The local mirror of this CPU's load-locked reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reservation {
    /// Physical address the LL hit.
    pub address: u64,
    /// Access size (4 or 8).
    pub size: usize,
}

/// Return-address stack depth for branch-prediction hints.
pub(crate) const RET_STACK_DEPTH: usize = 16;

/// One logical Alpha CPU.
pub struct CpuCore {
    /// 0-based ordinal; immutable after construction.
    pub cpu_id: usize,
    /// Program counter; always 4-byte aligned.
    pc: u64,
    /// Register bank (integer, FP, FPCR, IPRs).
    pub regs: RegisterBank,
    /// Processor status word.
    pub ps: ProcessorStatus,
    /// Run-state machine.
    pub state: CoreState,
    /// Per-CPU memory system.
    pub mem: MemorySystem,
    /// Execution statistics.
    pub stats: CpuStats,

    pub(crate) coord: Arc<SmpCoordinator>,
    pub(crate) frames: Vec<ExceptionFrame>,
    pub(crate) hot: HotPathCache,
    pub(crate) pal_offsets: PalOffsets,
    pub(crate) ipi_level: u8,
    pub(crate) reservation: Option<Reservation>,
    pub(crate) ret_stack: Vec<u64>,
    pub(crate) intr_flag: bool,
    pub(crate) double_fault: bool,
    pub(crate) trace: bool,
    reset_vector: u64,
    scbb_init: u64,
    pause_requested: Arc<AtomicBool>,
}

impl CpuCore {
    /// Creates a CPU in the `Reset` state.
    pub fn new(
        cpu_id: usize,
        config: &Config,
        mem: MemorySystem,
        coord: Arc<SmpCoordinator>,
    ) -> Self {
        let mut regs = RegisterBank::new(cpu_id);
        regs.set_ipr(Ipr::Scbb, config.pal.scbb);
        Self {
            cpu_id,
            pc: config.general.reset_vector & !PC_ALIGN_MASK,
            regs,
            ps: ProcessorStatus::reset(),
            state: CoreState::Reset,
            mem,
            stats: CpuStats::default(),
            coord,
            frames: Vec::new(),
            hot: HotPathCache::new(config.general.hot_threshold),
            pal_offsets: config.pal.resolve_offsets(),
            ipi_level: config.smp.ipi_level,
            reservation: None,
            ret_stack: Vec::with_capacity(RET_STACK_DEPTH),
            intr_flag: false,
            double_fault: false,
            trace: config.general.trace_instructions,
            reset_vector: config.general.reset_vector & !PC_ALIGN_MASK,
            scbb_init: config.pal.scbb,
            pause_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the current program counter.
    #[inline(always)]
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Sets the program counter, forcing the low two bits to zero.
    #[inline(always)]
    pub fn set_pc(&mut self, pc: u64) {
        self.pc = pc & !PC_ALIGN_MASK;
    }

    /// Returns the local view of the LL reservation.
    pub fn reservation(&self) -> Option<Reservation> {
        self.reservation
    }

    /// Returns the shared handle used to request a pause.
    pub fn pause_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pause_requested)
    }

    /// Returns whether a pause has been requested externally.
    pub(crate) fn pause_pending(&self) -> bool {
        self.pause_requested.load(Ordering::Acquire)
    }

    /// Moves `Reset` or `Paused` into `Running`.
    ///
    /// Returns whether the CPU is now running; `Halted` stays halted.
    pub fn start(&mut self) -> bool {
        match self.state {
            CoreState::Reset | CoreState::Paused => {
                self.pause_requested.store(false, Ordering::Release);
                self.state = CoreState::Running;
                true
            }
            CoreState::Running | CoreState::ExceptionHandling => true,
            CoreState::Halted => false,
        }
    }

    /// Requests a cooperative pause; honored at the next instruction boundary.
    pub fn request_pause(&self) {
        self.pause_requested.store(true, Ordering::Release);
    }

    /// Halts the CPU permanently.
    pub fn halt(&mut self) {
        self.state = CoreState::Halted;
    }

    /// Resets architectural state: registers to zero, PC to the reset vector.
    ///
    /// The CPU identity (`cpu_id`, `Whami`) and configuration survive.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.regs.set_ipr(Ipr::Scbb, self.scbb_init);
        self.ps = ProcessorStatus::reset();
        self.pc = self.reset_vector;
        self.state = CoreState::Reset;
        self.frames.clear();
        self.hot.invalidate_all();
        self.mem.invalidate_tlb_all();
        self.mem.cache.flush();
        self.reservation = None;
        self.double_fault = false;
        self.intr_flag = false;
        self.ret_stack.clear();
        self.coord.clear_reservation(self.cpu_id);
    }

    /// Builds the translation context for the current access.
    ///
    /// Captured fresh per access from the PS and IPR bank; also useful to
    /// external drivers issuing accesses on a CPU's behalf.
    #[inline]
    pub fn mmu_ctx(&self) -> MmuContext {
        MmuContext {
            asn: self.regs.ipr(Ipr::Asn) as u8,
            ptbr: self.regs.ipr(Ipr::Ptbr),
            mode: if self.ps.mode() == PrivilegeMode::User {
                TranslateMode::User
            } else {
                TranslateMode::Kernel
            },
            physical: self.ps.pal_mode(),
        }
    }

    /// Reads the `Rb` operand or the zero-extended 8-bit literal.
    #[inline(always)]
    pub(crate) fn rb_or_lit(&self, d: &crate::isa::decode::Decoded) -> u64 {
        if d.is_literal {
            u64::from(d.literal)
        } else {
            self.regs.read(d.rb)
        }
    }

    /// Instruction memory barrier: invalidates the I-cache and the
    /// hot-path decode cache.
    ///
    /// Required after code is written to memory by anything other than the
    /// executing CPU's own store path (loaders, DMA, peer CPUs without an
    /// intervening coherency event).
    pub fn imb(&mut self) {
        self.mem.cache.invalidate_icache();
        self.hot.invalidate_all();
    }

    /// Waits at the machine-wide quiesce rendezvous.
    ///
    /// Used by collaborators that must stop every CPU (bus reconfiguration,
    /// snapshot capture). A rendezvous that exceeds the configured timeout
    /// escalates to a machine check on this CPU instead of hanging.
    pub fn rendezvous(&mut self) {
        if !self.coord.quiesce() {
            let exc = crate::common::error::Exception::MachineCheck(
                crate::common::error::MachineCheckKind::BusError,
            );
            self.deliver_exception(&exc, self.pc(), 0);
        }
    }

    /// Returns a statistics snapshot with the memory-side counters merged in.
    pub fn stats_snapshot(&self) -> CpuStats {
        let mut stats = self.stats.clone();
        stats.itlb_hits = self.mem.itlb_hits;
        stats.itlb_misses = self.mem.itlb_misses;
        stats.dtlb_hits = self.mem.dtlb_hits;
        stats.dtlb_misses = self.mem.dtlb_misses;
        stats
    }

    /// Dumps PC, PS, and the integer file to stderr.
    pub fn dump_state(&self) {
        eprintln!(
            "cpu{} pc={:#018x} ps=[{}] state={:?}",
            self.cpu_id, self.pc, self.ps, self.state
        );
        self.regs.dump();
    }
}

impl std::fmt::Debug for CpuCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCore")
            .field("cpu_id", &self.cpu_id)
            .field("pc", &self.pc)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
