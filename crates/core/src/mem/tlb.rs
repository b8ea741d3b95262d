//! Translation Lookaside Buffer.
//!
//! A per-CPU cache of virtual-to-physical page translations with ASN
//! tagging. Each CPU carries two independent instances, one for the
//! instruction stream and one for data. Entries are created on refill from a
//! page-table entry and destroyed by the explicit invalidation operations or
//! by ASN reuse; address-space-match (global) entries survive ASN-scoped
//! invalidation.

use crate::common::data::AccessType;
use crate::common::error::MemoryFaultKind;

use super::pte::Pte;

/// Privilege view used for translation checks.
///
/// The TLB distinguishes only privileged and unprivileged accesses; the
/// three privileged modes (kernel, executive, supervisor) translate alike,
/// with PALcode responsible for finer-grained policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslateMode {
    /// Privileged access: kernel-only entries are usable.
    Kernel,
    /// Unprivileged access: kernel-only entries fault.
    User,
}

/// A single TLB entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct TlbEntry {
    /// Virtual page number (tag).
    pub vpn: u64,
    /// Physical page number (data).
    pub ppn: u64,
    /// Address space number this entry belongs to.
    pub asn: u8,
    /// Entry matches every ASN (PTE address-space-match bit).
    pub global: bool,
    /// Read permission.
    pub readable: bool,
    /// Write permission.
    pub writable: bool,
    /// Execute permission.
    pub executable: bool,
    /// Usable only from privileged modes.
    pub kernel_only: bool,
    /// Entry validity flag.
    pub valid: bool,
}

impl TlbEntry {
    /// Builds an entry from a valid page-table entry.
    pub fn from_pte(vpn: u64, pte: Pte, asn: u8) -> Self {
        Self {
            vpn,
            ppn: pte.pfn(),
            asn,
            global: pte.global(),
            readable: pte.readable(),
            writable: pte.writable(),
            executable: pte.executable(),
            kernel_only: pte.kernel_only(),
            valid: true,
        }
    }

    #[inline(always)]
    fn matches(&self, vpn: u64, asn: u8) -> bool {
        self.valid && self.vpn == vpn && (self.global || self.asn == asn)
    }
}

/// One side (instruction or data) of the translation buffer.
#[derive(Clone, Debug)]
pub struct Tlb {
    entries: Vec<TlbEntry>,
    mask: usize,
}

impl Tlb {
    /// Creates a TLB with `size` entries (rounded up to a power of two).
    pub fn new(size: usize) -> Self {
        let safe_size = if size.is_power_of_two() {
            size.max(1)
        } else {
            size.next_power_of_two()
        };

        Self {
            entries: vec![TlbEntry::default(); safe_size],
            mask: safe_size - 1,
        }
    }

    /// Looks up a virtual page number under the given ASN.
    #[inline(always)]
    pub fn lookup(&self, vpn: u64, asn: u8) -> Option<&TlbEntry> {
        let idx = (vpn as usize) & self.mask;
        let entry = &self.entries[idx];
        entry.matches(vpn, asn).then_some(entry)
    }

    /// Checks the permissions of a hit entry against the access.
    ///
    /// Returns the fault kind for a denied access, `None` when permitted.
    pub fn check_permissions(
        entry: &TlbEntry,
        access: AccessType,
        mode: TranslateMode,
    ) -> Option<MemoryFaultKind> {
        if entry.kernel_only && mode == TranslateMode::User {
            return Some(MemoryFaultKind::AccessViolation);
        }
        match access {
            AccessType::Fetch if !entry.executable => {
                Some(MemoryFaultKind::ExecuteProtectionFault)
            }
            AccessType::Write if !entry.writable => Some(MemoryFaultKind::WriteProtectionFault),
            AccessType::Read if !entry.readable => Some(MemoryFaultKind::ProtectionViolation),
            _ => None,
        }
    }

    /// Installs an entry, replacing whatever occupies its slot.
    pub fn fill(&mut self, entry: TlbEntry) {
        let idx = (entry.vpn as usize) & self.mask;
        self.entries[idx] = entry;
    }

    /// Invalidates every entry (TBIA).
    pub fn invalidate_all(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }

    /// Invalidates every non-global entry tagged with `asn` (TBIASN).
    pub fn invalidate_by_asn(&mut self, asn: u8) {
        for e in &mut self.entries {
            if e.valid && !e.global && e.asn == asn {
                e.valid = false;
            }
        }
    }

    /// Invalidates the entry for `vpn` under `asn`, if present (TBIS).
    ///
    /// Global entries are single-shot invalidated too: TBIS names a specific
    /// page, so the ASM bit does not protect it.
    pub fn invalidate_single(&mut self, vpn: u64, asn: u8) {
        let idx = (vpn as usize) & self.mask;
        let entry = &mut self.entries[idx];
        if entry.matches(vpn, asn) {
            entry.valid = false;
        }
    }
}
