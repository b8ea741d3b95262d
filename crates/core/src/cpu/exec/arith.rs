//! Integer arithmetic executors (opcode 0x10).
//!
//! Adds, subtracts, scaled variants, compares, and CMPBGE. The add/subtract
//! family updates the condition-code shadow flags; the /V variants
//! additionally raise an integer-overflow trap when the FPCR enables it,
//! otherwise they record the sticky flag and continue.

use crate::common::error::{ArithmeticTrap, Exception};
use crate::common::reg::condition_codes;
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::inta;

/// Sign-extends the low 32 bits, the longword result convention.
#[inline(always)]
fn sext32(val: u64) -> u64 {
    val as u32 as i32 as i64 as u64
}

impl CpuCore {
    pub(crate) fn exec_arith(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let a = self.regs.read(d.ra);
        let b = self.rb_or_lit(d);

        // (result, flag-bearing, overflowed, is_subtraction)
        let (result, update_cc, overflow, is_sub) = match d.func {
            inta::ADDL => (sext32(a.wrapping_add(b)), true, false, false),
            inta::S4ADDL => (sext32((a << 2).wrapping_add(b)), false, false, false),
            inta::S8ADDL => (sext32((a << 3).wrapping_add(b)), false, false, false),
            inta::SUBL => (sext32(a.wrapping_sub(b)), true, false, true),
            inta::S4SUBL => (sext32((a << 2).wrapping_sub(b)), false, false, true),
            inta::S8SUBL => (sext32((a << 3).wrapping_sub(b)), false, false, true),
            inta::ADDQ => (a.wrapping_add(b), true, false, false),
            inta::S4ADDQ => ((a << 2).wrapping_add(b), false, false, false),
            inta::S8ADDQ => ((a << 3).wrapping_add(b), false, false, false),
            inta::SUBQ => (a.wrapping_sub(b), true, false, true),
            inta::S4SUBQ => ((a << 2).wrapping_sub(b), false, false, true),
            inta::S8SUBQ => ((a << 3).wrapping_sub(b), false, false, true),

            inta::ADDL_V => {
                let (res, ovf) = (a as u32 as i32).overflowing_add(b as u32 as i32);
                (res as i64 as u64, true, ovf, false)
            }
            inta::SUBL_V => {
                let (res, ovf) = (a as u32 as i32).overflowing_sub(b as u32 as i32);
                (res as i64 as u64, true, ovf, true)
            }
            inta::ADDQ_V => {
                let (res, ovf) = (a as i64).overflowing_add(b as i64);
                (res as u64, true, ovf, false)
            }
            inta::SUBQ_V => {
                let (res, ovf) = (a as i64).overflowing_sub(b as i64);
                (res as u64, true, ovf, true)
            }

            inta::CMPEQ => ((a == b) as u64, false, false, false),
            inta::CMPLT => (((a as i64) < (b as i64)) as u64, false, false, false),
            inta::CMPLE => (((a as i64) <= (b as i64)) as u64, false, false, false),
            inta::CMPULT => ((a < b) as u64, false, false, false),
            inta::CMPULE => ((a <= b) as u64, false, false, false),
            inta::CMPBGE => (cmpbge(a, b), false, false, false),

            _ => return Err(self.illegal(d)),
        };

        if overflow {
            if self.regs.fpcr().integer_overflow_trap_enabled() {
                return Err(Exception::Arithmetic(ArithmeticTrap::IntegerOverflow));
            }
            self.regs.fpcr_mut().set_integer_overflow();
        }

        if update_cc {
            self.ps.set_flags(condition_codes(result, a, b, is_sub));
        }
        self.regs.write(d.rc, result);
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }
}

/// CMPBGE: per-byte unsigned `>=` comparison producing an 8-bit mask.
fn cmpbge(a: u64, b: u64) -> u64 {
    let mut mask = 0u64;
    for i in 0..8 {
        let ab = (a >> (i * 8)) & 0xFF;
        let bb = (b >> (i * 8)) & 0xFF;
        if ab >= bb {
            mask |= 1 << i;
        }
    }
    mask
}
