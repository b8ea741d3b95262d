//! Memory operation executors (opcodes 0x08-0x0F and 0x20-0x2F).
//!
//! The effective address is always `Rb + sign_extend(disp16)`. Aligned
//! access rules are enforced by the memory system; the unaligned opcodes
//! (LDQ_U/STQ_U) operate on the containing aligned quadword. Every store
//! invalidates any hot-path decode cached from the written physical page.

use crate::common::error::Exception;
use crate::cpu::{CpuCore, Flow, Reservation};
use crate::isa::decode::Decoded;
use crate::isa::opcodes as op;

impl CpuCore {
    #[inline(always)]
    fn effective_address(&self, d: &Decoded) -> u64 {
        self.regs.read(d.rb).wrapping_add(d.mem_disp as u64)
    }

    pub(crate) fn exec_load_address(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let base = self.regs.read(d.rb);
        let value = match d.opcode {
            op::LDA => base.wrapping_add(d.mem_disp as u64),
            _ => base.wrapping_add((d.mem_disp as u64) << 16),
        };
        self.regs.write(d.ra, value);
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_load(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let ctx = self.mmu_ctx();
        let pc = self.pc();
        let va = self.effective_address(d);

        let value = match d.opcode {
            op::LDBU => self.mem.read_virtual(&ctx, va, 1, pc)?,
            op::LDWU => self.mem.read_virtual(&ctx, va, 2, pc)?,
            op::LDL => self.mem.read_virtual(&ctx, va, 4, pc)? as u32 as i32 as i64 as u64,
            op::LDQ => self.mem.read_virtual(&ctx, va, 8, pc)?,
            // LDQ_U reads the aligned quadword containing the address.
            _ => self.mem.read_virtual(&ctx, va & !7, 8, pc)?,
        };

        self.regs.write(d.ra, value);
        self.stats.inst_load += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_store(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let ctx = self.mmu_ctx();
        let pc = self.pc();
        let va = self.effective_address(d);
        let value = self.regs.read(d.ra);

        let pa = match d.opcode {
            op::STB => self.mem.write_virtual(&ctx, va, value, 1, pc)?,
            op::STW => self.mem.write_virtual(&ctx, va, value, 2, pc)?,
            op::STL => self.mem.write_virtual(&ctx, va, value, 4, pc)?,
            op::STQ => self.mem.write_virtual(&ctx, va, value, 8, pc)?,
            _ => {
                // STQ_U merges into the aligned quadword: byte offset k
                // preserves bytes [8-k .. 7] and overwrites [0 .. 7-k];
                // offset 0 replaces the whole quadword.
                let aligned = va & !7;
                let k = (va & 7) as usize;
                let keep_mask = if k == 0 { 0 } else { u64::MAX << (8 * (8 - k)) };
                let old = self.mem.read_virtual(&ctx, aligned, 8, pc)?;
                let merged = (old & keep_mask) | (value & !keep_mask);
                self.mem.write_virtual(&ctx, aligned, merged, 8, pc)?
            }
        };

        self.hot.invalidate_page(pa.ppn());
        self.stats.inst_store += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_load_locked(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let ctx = self.mmu_ctx();
        let pc = self.pc();
        let va = self.effective_address(d);
        let size = if d.opcode == op::LDL_L { 4 } else { 8 };

        let (raw, pa) = self.mem.read_virtual_atomic(&ctx, va, size, pc)?;
        let value = if size == 4 {
            raw as u32 as i32 as i64 as u64
        } else {
            raw
        };

        self.reservation = Some(Reservation {
            address: pa.val(),
            size,
        });
        self.regs.write(d.ra, value);
        self.stats.inst_load += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_store_conditional(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let ctx = self.mmu_ctx();
        let pc = self.pc();
        let va = self.effective_address(d);
        let size = if d.opcode == op::STL_C { 4 } else { 8 };
        let value = self.regs.read(d.ra);

        let success = self
            .mem
            .write_virtual_conditional(&ctx, va, value, size, pc)?;
        self.reservation = None;

        if success {
            self.stats.sc_success += 1;
        } else {
            self.stats.sc_fail += 1;
        }
        self.regs.write(d.ra, u64::from(success));
        self.stats.inst_store += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_fp_load(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.check_fp_enabled()?;
        let ctx = self.mmu_ctx();
        let pc = self.pc();
        let va = self.effective_address(d);

        let value = match d.opcode {
            // S-format loads widen the 32-bit pattern to register format.
            op::LDS => {
                let raw = self.mem.read_virtual(&ctx, va, 4, pc)? as u32;
                f64::from(f32::from_bits(raw)).to_bits()
            }
            _ => self.mem.read_virtual(&ctx, va, 8, pc)?,
        };

        self.regs.write_f(d.ra, value);
        self.stats.inst_load += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_fp_store(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.check_fp_enabled()?;
        let ctx = self.mmu_ctx();
        let pc = self.pc();
        let va = self.effective_address(d);
        let raw = self.regs.read_f(d.ra);

        let pa = match d.opcode {
            op::STS => {
                let narrowed = (f64::from_bits(raw) as f32).to_bits();
                self.mem
                    .write_virtual(&ctx, va, u64::from(narrowed), 4, pc)?
            }
            _ => self.mem.write_virtual(&ctx, va, raw, 8, pc)?,
        };

        self.hot.invalidate_page(pa.ppn());
        self.stats.inst_store += 1;
        Ok(Flow::Next)
    }
}
