//! PAL dispatch (opcode 0x00) and the hardware-privileged opcodes.
//!
//! CALL_PAL traps into the Privileged Architecture Library: the function
//! family selects an entry point offset from SCBB, a frame is pushed, and
//! the CPU enters PAL mode. The HW_* opcodes are usable only in PAL mode:
//! IPR access, physical-mode loads and stores, and HW_REI to pop the frame.
//!
//! HALT (CALL_PAL function 0) is privileged; from user mode it raises an
//! illegal-instruction exception.

use crate::arch::ipr::Ipr;
use crate::common::error::Exception;
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::pal;
use crate::smp::TlbShootdown;

/// Conventional interprocessor-interrupt vector (SCB offset style).
pub const IPI_VECTOR: u64 = 0x660;

/// Software-interrupt vector base; the request level is added.
pub const SWI_VECTOR_BASE: u64 = 0x500;

impl CpuCore {
    pub(crate) fn exec_call_pal(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let func = d.pal_func;
        let next_pc = self.pc().wrapping_add(4);
        self.stats.inst_pal += 1;

        if func == pal::HALT {
            if self.ps.pal_mode() || self.ps.mode().is_kernel() {
                return Ok(Flow::Halt);
            }
            return Err(self.illegal(d));
        }

        if func <= pal::PRIVILEGED_MAX {
            if !self.ps.pal_mode() && !self.ps.mode().is_kernel() {
                return Err(self.illegal(d));
            }
            let offset = self.pal_offsets.call_pal_privileged;
            self.enter_call_pal(func, next_pc, d.raw, offset);
            return Ok(Flow::Jump(self.pc()));
        }

        if (pal::UNPRIVILEGED_BASE..=pal::UNPRIVILEGED_MAX).contains(&func) {
            let offset = self.pal_offsets.call_pal_unprivileged;
            self.enter_call_pal(func, next_pc, d.raw, offset);
            return Ok(Flow::Jump(self.pc()));
        }

        Err(self.illegal(d))
    }

    fn require_pal_mode(&self, d: &Decoded) -> Result<(), Exception> {
        if self.ps.pal_mode() {
            Ok(())
        } else {
            Err(self.illegal(d))
        }
    }

    pub(crate) fn exec_hw_mfpr(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.require_pal_mode(d)?;
        let Some(ipr) = Ipr::from_number((d.raw & 0xFFFF) as u16) else {
            return Err(self.illegal(d));
        };
        self.regs.write(d.ra, self.regs.ipr(ipr));
        Ok(Flow::Next)
    }

    pub(crate) fn exec_hw_mtpr(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.require_pal_mode(d)?;
        let Some(ipr) = Ipr::from_number((d.raw & 0xFFFF) as u16) else {
            return Err(self.illegal(d));
        };
        let value = self.regs.read(d.ra);
        self.write_ipr(ipr, value);
        Ok(Flow::Next)
    }

    /// Writes an IPR, applying the side effects of the operation registers.
    pub(crate) fn write_ipr(&mut self, ipr: Ipr, value: u64) {
        let asn = self.regs.ipr(Ipr::Asn) as u8;
        match ipr {
            Ipr::Tbia => {
                self.mem.invalidate_tlb_all();
                self.hot.invalidate_all();
                self.coord.on_tlb_invalidate(self.cpu_id, TlbShootdown::All);
            }
            Ipr::Tbiasn => {
                let target = value as u8;
                self.mem.invalidate_tlb_by_asn(target);
                self.hot.invalidate_all();
                self.coord
                    .on_tlb_invalidate(self.cpu_id, TlbShootdown::Asn(target));
            }
            Ipr::Tbis => {
                self.mem.invalidate_tlb_single(value, asn);
                self.hot.invalidate_all();
                self.coord
                    .on_tlb_invalidate(self.cpu_id, TlbShootdown::Single { va: value, asn });
            }
            Ipr::Tbisd => {
                self.mem.invalidate_tlb_single_data(value, asn);
                self.coord
                    .on_tlb_invalidate(self.cpu_id, TlbShootdown::SingleData { va: value, asn });
            }
            Ipr::Tbisi => {
                self.mem.invalidate_tlb_single_instr(value, asn);
                self.hot.invalidate_all();
                self.coord
                    .on_tlb_invalidate(self.cpu_id, TlbShootdown::SingleInstr { va: value, asn });
            }
            Ipr::Ipl => {
                self.regs.set_ipr(Ipr::Ipl, value & 0x7);
                self.ps.set_ipl((value & 0x7) as u8);
            }
            Ipr::Ipir => {
                let target = value as usize;
                if target < self.coord.num_cpus() {
                    self.coord
                        .send_ipi(self.cpu_id, target, IPI_VECTOR, self.ipi_level);
                    self.stats.ipis_sent += 1;
                }
                self.regs.set_ipr(Ipr::Ipir, value);
            }
            Ipr::Sirr => {
                // A software interrupt request at level 1-7 sets the
                // summary bit and queues delivery on this CPU.
                let level = (value & 0x7) as u8;
                if level > 0 {
                    let sisr = self.regs.ipr(Ipr::Sisr) | (1 << level);
                    self.regs.set_ipr(Ipr::Sisr, sisr);
                    self.coord.send_ipi(
                        self.cpu_id,
                        self.cpu_id,
                        SWI_VECTOR_BASE + u64::from(level),
                        level,
                    );
                }
                self.regs.set_ipr(Ipr::Sirr, value);
            }
            _ => self.regs.set_ipr(ipr, value),
        }
    }

    pub(crate) fn exec_hw_ld(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.require_pal_mode(d)?;
        let pa = self.regs.read(d.rb).wrapping_add(d.mem_disp as u64);
        let value = self.mem.privileged_read(pa, 8).map_err(|mut f| {
            f.pc = self.pc();
            Exception::Memory(f)
        })?;
        self.regs.write(d.ra, value);
        self.stats.inst_load += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_hw_st(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.require_pal_mode(d)?;
        let pa = self.regs.read(d.rb).wrapping_add(d.mem_disp as u64);
        let value = self.regs.read(d.ra);
        self.mem.privileged_write(pa, value, 8).map_err(|mut f| {
            f.pc = self.pc();
            Exception::Memory(f)
        })?;
        self.hot.invalidate_page(pa >> crate::common::constants::PAGE_SHIFT);
        self.stats.inst_store += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_hw_rei(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.require_pal_mode(d)?;
        if self.rei() {
            Ok(Flow::Jump(self.pc()))
        } else {
            Err(self.illegal(d))
        }
    }
}
