//! Opcode-family executors.
//!
//! Each submodule implements one family of the Alpha instruction set as
//! methods on `CpuCore`. Executors compute every fallible quantity before
//! committing any register or memory state, so a fault mid-instruction never
//! leaves the architectural state half-written.

/// Integer arithmetic (opcode 0x10).
mod arith;

/// Control flow: branches (0x30-0x3F) and jumps (0x1A).
mod control;

/// Floating-point operates (0x14-0x17).
mod fp;

/// Integer logical operations and conditional moves (0x11), and the
/// extended integer group (0x1C).
mod logical;

/// Memory operations (0x08-0x0F, 0x20-0x2F).
mod memops;

/// Barriers, RPCC, and prefetch hints (0x18).
mod misc;

/// Integer multiply (0x13).
mod mul;

/// PAL dispatch (0x00) and the hardware-privileged opcodes (0x19-0x1F).
mod pal;

/// Shifts and byte manipulation (0x12).
mod shift;

use crate::common::error::Exception;
use crate::isa::decode::Decoded;
use crate::isa::opcodes as op;

use super::{CpuCore, Flow};

impl CpuCore {
    /// Dispatches one decoded instruction to its family executor.
    pub(crate) fn execute(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        match d.opcode {
            op::CALL_PAL => self.exec_call_pal(d),

            op::LDA | op::LDAH => self.exec_load_address(d),
            op::LDBU | op::LDWU | op::LDL | op::LDQ | op::LDQ_U => self.exec_load(d),
            op::STB | op::STW | op::STL | op::STQ | op::STQ_U => self.exec_store(d),
            op::LDL_L | op::LDQ_L => self.exec_load_locked(d),
            op::STL_C | op::STQ_C => self.exec_store_conditional(d),
            op::LDS | op::LDT => self.exec_fp_load(d),
            op::STS | op::STT => self.exec_fp_store(d),

            op::INTA => self.exec_arith(d),
            op::INTL => self.exec_logical(d),
            op::INTS => self.exec_shift(d),
            op::INTM => self.exec_mul(d),
            op::FPTI => self.exec_extended(d),

            op::ITFP => self.exec_itfp(d),
            op::FLTI => self.exec_flti(d),
            op::FLTL => self.exec_fltl(d),

            op::MISC => self.exec_misc(d),
            op::JSR => self.exec_jsr(d),

            op::HW_MFPR => self.exec_hw_mfpr(d),
            op::HW_MTPR => self.exec_hw_mtpr(d),
            op::HW_LD => self.exec_hw_ld(d),
            op::HW_ST => self.exec_hw_st(d),
            op::HW_REI => self.exec_hw_rei(d),

            op::BR | op::BSR => self.exec_branch_always(d),
            op::BEQ | op::BNE | op::BLT | op::BLE | op::BGE | op::BGT | op::BLBC | op::BLBS => {
                self.exec_branch_int(d)
            }
            op::FBEQ | op::FBNE | op::FBLT | op::FBLE | op::FBGE | op::FBGT => {
                self.exec_branch_fp(d)
            }

            // VAX floating point (0x15) and its loads/stores are outside the
            // supported architecture profile; so is every unassigned opcode.
            _ => Err(self.illegal(d)),
        }
    }

    /// Builds the illegal-instruction exception for the current PC.
    #[inline]
    pub(crate) fn illegal(&self, d: &Decoded) -> Exception {
        Exception::IllegalInstruction {
            pc: self.pc(),
            instruction: d.raw,
        }
    }
}
