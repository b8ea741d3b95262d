//! Control-flow executors: branches (opcodes 0x30-0x3F) and the JSR group
//! (opcode 0x1A).
//!
//! Branch targets are `pc + 4 + (sign_extend(disp21) << 2)`. BR/BSR and the
//! JSR group write the return address into `Ra`. Calls push a hint onto a
//! small return-address stack; mispredictions are counted but never
//! architecturally visible.

use crate::common::error::Exception;
use crate::cpu::{CpuCore, Flow, RET_STACK_DEPTH};
use crate::isa::decode::Decoded;
use crate::isa::opcodes as op;

impl CpuCore {
    fn push_return_hint(&mut self, return_pc: u64) {
        if self.ret_stack.len() == RET_STACK_DEPTH {
            let _ = self.ret_stack.remove(0);
        }
        self.ret_stack.push(return_pc);
    }

    fn pop_return_hint(&mut self, actual_target: u64) {
        match self.ret_stack.pop() {
            Some(predicted) if predicted == actual_target => {}
            Some(_) => self.stats.ras_mispredicts += 1,
            None => {}
        }
    }

    pub(crate) fn exec_branch_always(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let pc = self.pc();
        let return_pc = pc.wrapping_add(4);
        let target = d.branch_target(pc);

        if d.opcode == op::BSR {
            self.push_return_hint(return_pc);
        }
        self.regs.write(d.ra, return_pc);
        self.stats.inst_branch += 1;
        self.stats.branches_taken += 1;
        Ok(Flow::Jump(target))
    }

    pub(crate) fn exec_branch_int(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let a = self.regs.read(d.ra);
        let taken = match d.opcode {
            op::BEQ => a == 0,
            op::BNE => a != 0,
            op::BLT => (a as i64) < 0,
            op::BLE => (a as i64) <= 0,
            op::BGE => (a as i64) >= 0,
            op::BGT => (a as i64) > 0,
            op::BLBC => a & 1 == 0,
            _ => a & 1 != 0,
        };
        self.finish_branch(d, taken)
    }

    pub(crate) fn exec_branch_fp(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.check_fp_enabled()?;
        let a = f64::from_bits(self.regs.read_f(d.ra));
        let taken = match d.opcode {
            op::FBEQ => a == 0.0,
            op::FBNE => a != 0.0,
            op::FBLT => a < 0.0,
            op::FBLE => a <= 0.0,
            op::FBGE => a >= 0.0,
            _ => a > 0.0,
        };
        self.finish_branch(d, taken)
    }

    fn finish_branch(&mut self, d: &Decoded, taken: bool) -> Result<Flow, Exception> {
        self.stats.inst_branch += 1;
        if taken {
            self.stats.branches_taken += 1;
            Ok(Flow::Jump(d.branch_target(self.pc())))
        } else {
            Ok(Flow::Next)
        }
    }

    pub(crate) fn exec_jsr(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let pc = self.pc();
        let return_pc = pc.wrapping_add(4);
        // The target comes from Rb with the low bits forced clear; the
        // displacement field only carries the predictor hint.
        let target = self.regs.read(d.rb) & !0x3;
        let kind = (d.raw >> 14) & 0x3;

        match kind {
            op::jsr::JSR => self.push_return_hint(return_pc),
            op::jsr::RET => self.pop_return_hint(target),
            op::jsr::JSR_COROUTINE => {
                self.pop_return_hint(target);
                self.push_return_hint(return_pc);
            }
            _ => {}
        }

        self.regs.write(d.ra, return_pc);
        self.stats.inst_branch += 1;
        self.stats.branches_taken += 1;
        Ok(Flow::Jump(target))
    }
}
