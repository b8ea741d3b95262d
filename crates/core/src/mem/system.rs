//! Memory system facade.
//!
//! `MemorySystem` composes one CPU's TLB and cache hierarchy with the shared
//! physical memory and bus into the single translated-access API the CPU
//! core uses. It provides:
//! 1. **Translated access:** `read_virtual` / `write_virtual` with the
//!    alignment rule and typed faults.
//! 2. **Atomics:** `read_virtual_atomic` (LL) and `write_virtual_conditional`
//!    (SC) arbitrated through the SMP coordinator.
//! 3. **Probing:** Non-faulting translation for prefetch decisions.
//! 4. **Privileged bypass:** Physical access without protection checks for
//!    PAL code and the page-table walk.
//!
//! On an MMIO physical range the cache is bypassed and the access dispatches
//! to the device; on regular memory the cache hierarchy is consulted first.
//! Every successful virtual write notifies the coordinator with the physical
//! line address so remote reservations and cached copies are invalidated.

use std::sync::Arc;

use crate::common::addr::{PhysAddr, VirtAddr};
use crate::common::constants::PAGE_SHIFT;
use crate::common::data::AccessType;
use crate::common::error::{MemoryFault, MemoryFaultKind};
use crate::config::Config;
use crate::smp::{CoherencyEvent, SmpCoordinator, TlbShootdown};
use crate::soc::bus::Bus;
use crate::soc::phys::PhysicalMemory;

use super::cache::CacheHierarchy;
use super::pte::Pte;
use super::tlb::{Tlb, TlbEntry, TranslateMode};

/// Translation context captured from the CPU at the start of an access.
///
/// Built fresh per access from the PS and IPR bank, so the memory system
/// never reaches back into CPU state.
#[derive(Clone, Copy, Debug)]
pub struct MmuContext {
    /// Current address space number.
    pub asn: u8,
    /// Page table base register; zero means translation is disabled.
    pub ptbr: u64,
    /// Privilege view of the access.
    pub mode: TranslateMode,
    /// PAL mode uses physical addressing directly.
    pub physical: bool,
}

/// Per-CPU translated-access facade.
#[derive(Debug)]
pub struct MemorySystem {
    cpu_id: usize,
    itlb: Tlb,
    dtlb: Tlb,
    /// The per-CPU cache hierarchy.
    pub cache: CacheHierarchy,
    phys: Arc<PhysicalMemory>,
    bus: Arc<Bus>,
    coord: Arc<SmpCoordinator>,

    /// Instruction TLB hits.
    pub itlb_hits: u64,
    /// Instruction TLB misses (walked or delivered).
    pub itlb_misses: u64,
    /// Data TLB hits.
    pub dtlb_hits: u64,
    /// Data TLB misses (walked or delivered).
    pub dtlb_misses: u64,
}

impl MemorySystem {
    /// Creates the memory system for one CPU.
    pub fn new(
        cpu_id: usize,
        config: &Config,
        phys: Arc<PhysicalMemory>,
        bus: Arc<Bus>,
        coord: Arc<SmpCoordinator>,
    ) -> Self {
        Self {
            cpu_id,
            itlb: Tlb::new(config.memory.tlb_entries),
            dtlb: Tlb::new(config.memory.tlb_entries),
            cache: CacheHierarchy::new(
                &config.cache.l1_i,
                &config.cache.l1_d,
                &config.cache.l2,
                &config.cache.l3,
                config.memory.write_buffer_lines,
            ),
            phys,
            bus,
            coord,
            itlb_hits: 0,
            itlb_misses: 0,
            dtlb_hits: 0,
            dtlb_misses: 0,
        }
    }

    /// Returns the line size used for coordinator store notifications.
    #[inline]
    fn line_of(&self, pa: u64) -> u64 {
        pa & !(self.cache.l1d.line_bytes() as u64 - 1)
    }

    #[inline]
    fn check_alignment(
        va: u64,
        size: usize,
        is_write: bool,
        pc: u64,
    ) -> Result<(), MemoryFault> {
        debug_assert!(
            crate::common::constants::LEGAL_ACCESS_SIZES.contains(&size),
            "illegal access size {size}"
        );
        if va & (size as u64 - 1) != 0 {
            return Err(MemoryFault::new(
                MemoryFaultKind::AlignmentFault,
                va,
                size,
                is_write,
                pc,
            ));
        }
        Ok(())
    }

    /// Translates a virtual address, walking the page table on a TLB miss.
    ///
    /// A miss with a valid PTE refills the TLB and retries internally. A
    /// not-present PTE raises `PageFault`; a page the table cannot describe
    /// raises `TlbMiss` for PALcode to service.
    pub fn translate(
        &mut self,
        ctx: &MmuContext,
        va: u64,
        size: usize,
        access: AccessType,
        pc: u64,
    ) -> Result<u64, MemoryFault> {
        if ctx.physical || ctx.ptbr == 0 {
            return Ok(va);
        }

        let vaddr = VirtAddr::new(va);
        let vpn = vaddr.vpn();
        let is_fetch = access == AccessType::Fetch;
        let fault = |kind| MemoryFault::new(kind, va, size, access.is_write(), pc);

        let tlb = if is_fetch { &self.itlb } else { &self.dtlb };
        if let Some(entry) = tlb.lookup(vpn, ctx.asn).copied() {
            let pa = (entry.ppn << PAGE_SHIFT) | vaddr.page_offset();
            let denied = Tlb::check_permissions(&entry, access, ctx.mode);
            if is_fetch {
                self.itlb_hits += 1;
            } else {
                self.dtlb_hits += 1;
            }
            return match denied {
                Some(kind) => Err(fault(kind)),
                None => Ok(pa),
            };
        }
        if is_fetch {
            self.itlb_misses += 1;
        } else {
            self.dtlb_misses += 1;
        }

        // Refill from the linear page table at PTBR: one quadword PTE per
        // virtual page. A VPN the table cannot cover is delivered as a TLB
        // miss for PALcode to service.
        let pte_addr = ctx.ptbr.wrapping_add(vpn.wrapping_mul(8));
        let raw = self
            .phys
            .read(pte_addr, 8)
            .map_err(|_| fault(MemoryFaultKind::TlbMiss))?;
        let pte = Pte(raw);
        if !pte.valid() {
            return Err(fault(MemoryFaultKind::PageFault));
        }

        let entry = TlbEntry::from_pte(vpn, pte, ctx.asn);
        let denied = Tlb::check_permissions(&entry, access, ctx.mode);
        let pa = (entry.ppn << PAGE_SHIFT) | vaddr.page_offset();
        if is_fetch {
            self.itlb.fill(entry);
        } else {
            self.dtlb.fill(entry);
        }
        match denied {
            Some(kind) => Err(fault(kind)),
            None => Ok(pa),
        }
    }

    fn read_physical(
        &mut self,
        pa: u64,
        size: usize,
        is_fetch: bool,
        pc: u64,
    ) -> Result<u64, MemoryFault> {
        if self.bus.is_mmio(pa) {
            // Cache bypassed on device ranges.
            return self.bus.read(pa, size).ok_or_else(|| {
                MemoryFault::new(MemoryFaultKind::BusError, pa, size, false, pc)
            });
        }
        self.cache
            .read(pa, size, is_fetch, &self.phys)
            .map_err(|mut f| {
                f.pc = pc;
                f
            })
    }

    fn write_physical(
        &mut self,
        pa: u64,
        value: u64,
        size: usize,
        pc: u64,
    ) -> Result<(), MemoryFault> {
        if self.bus.is_mmio(pa) {
            return match self.bus.write(pa, value, size) {
                Some(true) => Ok(()),
                _ => Err(MemoryFault::new(
                    MemoryFaultKind::BusError,
                    pa,
                    size,
                    true,
                    pc,
                )),
            };
        }
        self.cache.write(pa, value, size, &self.phys).map_err(|mut f| {
            f.pc = pc;
            f
        })
    }

    /// Fetches the 32-bit instruction word at `pc`.
    pub fn fetch(&mut self, ctx: &MmuContext, pc: u64) -> Result<u32, MemoryFault> {
        Self::check_alignment(pc, 4, false, pc)?;
        let pa = self.translate(ctx, pc, 4, AccessType::Fetch, pc)?;
        Ok(self.read_physical(pa, 4, true, pc)? as u32)
    }

    /// Reads `size` bytes at virtual address `va`.
    pub fn read_virtual(
        &mut self,
        ctx: &MmuContext,
        va: u64,
        size: usize,
        pc: u64,
    ) -> Result<u64, MemoryFault> {
        Self::check_alignment(va, size, false, pc)?;
        let pa = self.translate(ctx, va, size, AccessType::Read, pc)?;
        self.read_physical(pa, size, false, pc)
    }

    /// Writes `size` bytes at virtual address `va`.
    ///
    /// Returns the physical address written so the caller can invalidate any
    /// hot-path decode cached from that page.
    pub fn write_virtual(
        &mut self,
        ctx: &MmuContext,
        va: u64,
        value: u64,
        size: usize,
        pc: u64,
    ) -> Result<PhysAddr, MemoryFault> {
        Self::check_alignment(va, size, true, pc)?;
        let pa = self.translate(ctx, va, size, AccessType::Write, pc)?;
        self.write_physical(pa, value, size, pc)?;
        self.coord.invalidate_block(pa);
        self.coord.publish_store(self.cpu_id, self.line_of(pa));
        Ok(PhysAddr::new(pa))
    }

    /// Load-locked read: reads the value and records a reservation.
    ///
    /// Returns the value together with the physical address the reservation
    /// was recorded at.
    pub fn read_virtual_atomic(
        &mut self,
        ctx: &MmuContext,
        va: u64,
        size: usize,
        pc: u64,
    ) -> Result<(u64, PhysAddr), MemoryFault> {
        Self::check_alignment(va, size, false, pc)?;
        let pa = self.translate(ctx, va, size, AccessType::Read, pc)?;
        let value = self.read_physical(pa, size, false, pc)?;
        self.coord.record_reservation(self.cpu_id, pa, size);
        Ok((value, PhysAddr::new(pa)))
    }

    /// Store-conditional write: succeeds only if the reservation is intact.
    ///
    /// Returns whether the store was performed. The reservation is consumed
    /// either way.
    pub fn write_virtual_conditional(
        &mut self,
        ctx: &MmuContext,
        va: u64,
        value: u64,
        size: usize,
        pc: u64,
    ) -> Result<bool, MemoryFault> {
        Self::check_alignment(va, size, true, pc)?;
        let pa = self.translate(ctx, va, size, AccessType::Write, pc)?;
        if !self.coord.try_store_conditional(self.cpu_id, pa, size) {
            return Ok(false);
        }
        self.write_physical(pa, value, size, pc)?;
        self.coord.publish_store(self.cpu_id, self.line_of(pa));
        Ok(true)
    }

    /// Non-faulting translation probe for prefetch decisions.
    pub fn probe(&mut self, ctx: &MmuContext, va: u64, access: AccessType) -> Option<PhysAddr> {
        self.translate(ctx, va, 1, access, 0).ok().map(PhysAddr::new)
    }

    /// Reads physical memory or a device without protection checks (PAL).
    pub fn privileged_read(&mut self, pa: u64, size: usize) -> Result<u64, MemoryFault> {
        if self.bus.is_mmio(pa) {
            return self
                .bus
                .read(pa, size)
                .ok_or_else(|| MemoryFault::new(MemoryFaultKind::BusError, pa, size, false, 0));
        }
        self.phys.read(pa, size)
    }

    /// Writes physical memory or a device without protection checks (PAL).
    ///
    /// Bypasses the cache; the local copy of the line is dropped and the
    /// store is published so reservations and remote copies stay coherent.
    pub fn privileged_write(&mut self, pa: u64, value: u64, size: usize) -> Result<(), MemoryFault> {
        if self.bus.is_mmio(pa) {
            return match self.bus.write(pa, value, size) {
                Some(true) => Ok(()),
                _ => Err(MemoryFault::new(
                    MemoryFaultKind::BusError,
                    pa,
                    size,
                    true,
                    0,
                )),
            };
        }
        self.phys.write(pa, value, size)?;
        self.cache.invalidate_line(pa);
        self.coord.invalidate_block(pa);
        self.coord.publish_store(self.cpu_id, self.line_of(pa));
        Ok(())
    }

    /// Drains the write buffer (MB, WMB, TRAPB). Returns lines retired.
    pub fn barrier(&mut self) -> usize {
        self.cache.drain_write_buffer()
    }

    /// Invalidates both TLB sides entirely (TBIA).
    pub fn invalidate_tlb_all(&mut self) {
        self.itlb.invalidate_all();
        self.dtlb.invalidate_all();
    }

    /// Invalidates every non-global entry of one address space (TBIASN).
    pub fn invalidate_tlb_by_asn(&mut self, asn: u8) {
        self.itlb.invalidate_by_asn(asn);
        self.dtlb.invalidate_by_asn(asn);
    }

    /// Invalidates one page in both sides (TBIS).
    pub fn invalidate_tlb_single(&mut self, va: u64, asn: u8) {
        let vpn = VirtAddr::new(va).vpn();
        self.itlb.invalidate_single(vpn, asn);
        self.dtlb.invalidate_single(vpn, asn);
    }

    /// Invalidates one page in the data side only.
    pub fn invalidate_tlb_single_data(&mut self, va: u64, asn: u8) {
        self.dtlb.invalidate_single(VirtAddr::new(va).vpn(), asn);
    }

    /// Invalidates one page in the instruction side only.
    pub fn invalidate_tlb_single_instr(&mut self, va: u64, asn: u8) {
        self.itlb.invalidate_single(VirtAddr::new(va).vpn(), asn);
    }

    /// Applies one queued coherency event from a peer CPU.
    pub fn apply_coherency(&mut self, event: CoherencyEvent) {
        match event {
            CoherencyEvent::InvalidateLine(line) => self.cache.invalidate_line(line),
            CoherencyEvent::TlbShootdown(op) => match op {
                TlbShootdown::All => self.invalidate_tlb_all(),
                TlbShootdown::Asn(asn) => self.invalidate_tlb_by_asn(asn),
                TlbShootdown::Single { va, asn } => self.invalidate_tlb_single(va, asn),
                TlbShootdown::SingleData { va, asn } => self.invalidate_tlb_single_data(va, asn),
                TlbShootdown::SingleInstr { va, asn } => self.invalidate_tlb_single_instr(va, asn),
            },
        }
    }
}
