//! Exception delivery, PAL transitions, and REI.
//!
//! Faults detected during fetch or execute never commit architectural state;
//! the step loop hands the `Exception` here. Delivery saves PC, PS, the
//! integer file, and the FPCR into a frame on the PAL shadow stack, forces
//! kernel mode at IPL 7 with `pal_mode` set, and jumps to the entry point
//! computed from SCBB and the per-flavor offset table. `REI` pops the frame
//! and restores everything byte-for-byte.
//!
//! A fault raised while already in PAL mode escalates to a double fault; a
//! second double fault halts the CPU.

use crate::arch::ipr::Ipr;
use crate::common::error::{Exception, ExceptionClass, MemoryFault, MemoryFaultKind};

use super::{CoreState, CpuCore};

/// Saved context stacked on entry to a PAL handler.
#[derive(Clone, Debug)]
pub struct ExceptionFrame {
    /// PC to resume at (the faulting instruction, or its successor for
    /// CALL_PAL and interrupts).
    pub pc: u64,
    /// Raw processor status at the time of the exception.
    pub ps: u64,
    /// Compact summary identifying the exception for PALcode.
    pub exception_summary: u64,
    /// Snapshot of the integer file.
    pub int_regs: [u64; 32],
    /// Raw FPCR.
    pub fpcr: u64,
    /// Faulting address for memory faults, zero otherwise.
    pub fault_address: u64,
    /// Raw encoding of the faulting instruction, when known.
    pub fault_instruction: u32,
}

/// Encodes an exception class into the frame summary word.
fn class_code(class: ExceptionClass) -> u64 {
    match class {
        ExceptionClass::MachineCheck => 0,
        ExceptionClass::ArithmeticTrap => 1,
        ExceptionClass::AlignmentFault => 2,
        ExceptionClass::IllegalInstruction => 3,
        ExceptionClass::Interrupt => 4,
        ExceptionClass::Ast => 5,
        ExceptionClass::FpException => 6,
        ExceptionClass::PageFault => 7,
        ExceptionClass::AccessViolation => 8,
        ExceptionClass::Unknown => 9,
    }
}

/// Marker bit distinguishing CALL_PAL frames from exception frames.
const SUMMARY_CALL_PAL: u64 = 1 << 32;

impl CpuCore {
    /// Delivers an exception through the PAL path.
    ///
    /// `resume_pc` is the PC the handler's REI returns to: the faulting
    /// instruction for restartable faults, its successor for traps that
    /// complete the instruction.
    pub(crate) fn deliver_exception(&mut self, exc: &Exception, resume_pc: u64, instruction: u32) {
        // Any exception destroys the reservation.
        self.reservation = None;
        self.coord.clear_reservation(self.cpu_id);

        if self.ps.pal_mode() {
            if self.double_fault {
                tracing::error!(cpu = self.cpu_id, %exc, "double fault while handling a double fault; halting");
                self.state = CoreState::Halted;
                return;
            }
            self.double_fault = true;
            let escalated = Exception::Memory(MemoryFault::new(
                MemoryFaultKind::DoubleFault,
                exc.fault_address(),
                0,
                false,
                resume_pc,
            ));
            tracing::warn!(cpu = self.cpu_id, original = %exc, "fault in PAL mode; escalating to double fault");
            self.push_frame_and_enter(&escalated, resume_pc, instruction);
            return;
        }

        self.push_frame_and_enter(exc, resume_pc, instruction);
    }

    fn push_frame_and_enter(&mut self, exc: &Exception, resume_pc: u64, instruction: u32) {
        let class = exc.class();
        tracing::debug!(
            cpu = self.cpu_id,
            %exc,
            ?class,
            resume_pc = format_args!("{resume_pc:#x}"),
            "exception delivery"
        );

        self.frames.push(ExceptionFrame {
            pc: resume_pc,
            ps: self.ps.raw(),
            exception_summary: class_code(class),
            int_regs: self.regs.int_snapshot(),
            fpcr: self.regs.fpcr().raw(),
            fault_address: exc.fault_address(),
            fault_instruction: instruction,
        });

        self.regs.set_ipr(Ipr::FaultVa, exc.fault_address());
        self.ps.enter_pal();
        self.state = CoreState::ExceptionHandling;
        self.stats.traps_taken += 1;

        let scbb = self.regs.ipr(Ipr::Scbb);
        let entry = scbb.wrapping_add(self.pal_offsets.offset(class));
        self.set_pc(entry);
    }

    /// Enters the PAL CALL_PAL handler for `func`.
    ///
    /// The frame resumes at the instruction after the CALL_PAL.
    pub(crate) fn enter_call_pal(&mut self, func: u32, next_pc: u64, instruction: u32, offset: u64) {
        tracing::debug!(cpu = self.cpu_id, func = format_args!("{func:#x}"), "call_pal");
        self.frames.push(ExceptionFrame {
            pc: next_pc,
            ps: self.ps.raw(),
            exception_summary: u64::from(func) | SUMMARY_CALL_PAL,
            int_regs: self.regs.int_snapshot(),
            fpcr: self.regs.fpcr().raw(),
            fault_address: 0,
            fault_instruction: instruction,
        });

        self.ps.enter_pal();
        self.state = CoreState::ExceptionHandling;

        let scbb = self.regs.ipr(Ipr::Scbb);
        self.set_pc(scbb.wrapping_add(offset));
    }

    /// Pops the top exception frame and resumes the interrupted context.
    ///
    /// Returns `false` when no frame is stacked (REI outside a handler).
    pub(crate) fn rei(&mut self) -> bool {
        let Some(frame) = self.frames.pop() else {
            return false;
        };

        self.regs.restore_ints(&frame.int_regs);
        *self.regs.fpcr_mut() = crate::arch::fpcr::Fpcr::from_raw(frame.fpcr);
        self.ps = crate::arch::ps::ProcessorStatus::from_raw(frame.ps);
        self.set_pc(frame.pc);

        if self.frames.is_empty() {
            self.double_fault = false;
            self.state = CoreState::Running;
        } else {
            self.state = CoreState::ExceptionHandling;
        }
        tracing::trace!(cpu = self.cpu_id, pc = format_args!("{:#x}", self.pc()), "rei");
        true
    }

    /// Returns the depth of the PAL shadow stack.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the top exception frame, if any (for observers and tests).
    pub fn current_frame(&self) -> Option<&ExceptionFrame> {
        self.frames.last()
    }
}
