//! Integer multiply executors (opcode 0x13).

use crate::common::error::{ArithmeticTrap, Exception};
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::intm;

impl CpuCore {
    pub(crate) fn exec_mul(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let a = self.regs.read(d.ra);
        let b = self.rb_or_lit(d);

        let (result, overflow) = match d.func {
            intm::MULL => (
                (a as u32 as i32).wrapping_mul(b as u32 as i32) as i64 as u64,
                false,
            ),
            intm::MULQ => (a.wrapping_mul(b), false),
            intm::UMULH => ((((a as u128) * (b as u128)) >> 64) as u64, false),
            intm::MULL_V => {
                let (res, ovf) = (a as u32 as i32).overflowing_mul(b as u32 as i32);
                (res as i64 as u64, ovf)
            }
            intm::MULQ_V => {
                let (res, ovf) = (a as i64).overflowing_mul(b as i64);
                (res as u64, ovf)
            }
            _ => return Err(self.illegal(d)),
        };

        if overflow {
            if self.regs.fpcr().integer_overflow_trap_enabled() {
                return Err(Exception::Arithmetic(ArithmeticTrap::IntegerOverflow));
            }
            self.regs.fpcr_mut().set_integer_overflow();
        }

        self.regs.write(d.rc, result);
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }
}
