//! MISC group executors (opcode 0x18).
//!
//! Barriers drain the write buffer; RPCC reads the cycle counter; RC/RS
//! manage the interrupt flag used by PALcode restart sequences; the
//! prefetch and evict hints probe the translation non-faultingly and have
//! no architectural effect.

use crate::common::data::AccessType;
use crate::common::error::Exception;
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::misc;

impl CpuCore {
    pub(crate) fn exec_misc(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let func = d.raw & 0xFFFF;
        match func {
            misc::TRAPB | misc::EXCB | misc::MB | misc::WMB => {
                let _ = self.mem.barrier();
                self.stats.barriers += 1;
            }
            misc::RPCC => {
                // The process cycle counter advances with retirement; the
                // high half holds the offset, zero in this implementation.
                self.regs
                    .write(d.ra, self.stats.instructions_retired & 0xFFFF_FFFF);
            }
            misc::RC => {
                self.regs.write(d.ra, u64::from(self.intr_flag));
                self.intr_flag = false;
            }
            misc::RS => {
                self.regs.write(d.ra, u64::from(self.intr_flag));
                self.intr_flag = true;
            }
            misc::FETCH | misc::FETCH_M | misc::ECB | misc::WH64 => {
                let ctx = self.mmu_ctx();
                let va = self.regs.read(d.rb);
                let access = if func == misc::FETCH {
                    AccessType::Read
                } else {
                    AccessType::Write
                };
                let _ = self.mem.probe(&ctx, va, access);
            }
            _ => return Err(self.illegal(d)),
        }
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }
}
