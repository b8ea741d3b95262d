//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to
//! prevent accidental mixing of address spaces. It provides:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Address Manipulation:** Helpers for page numbers, page offsets, and line alignment.
//! 3. **MMU Integration:** Acts as the primary interface for translation operations.

use super::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT};

/// A virtual address in the Alpha AXP address space.
///
/// Virtual addresses are used by guest software and must be translated to
/// physical addresses through the TLB before accessing memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtAddr(pub u64);

/// A physical address in the Alpha AXP address space.
///
/// Physical addresses represent emulated hardware memory locations and are
/// used after virtual-to-physical translation has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the virtual page number (address divided by the 8 KiB page size).
    #[inline(always)]
    pub fn vpn(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Extracts the page offset (0-8191) within the 8 KiB page.
    pub fn page_offset(&self) -> u64 {
        self.0 & PAGE_OFFSET_MASK
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the physical page number.
    #[inline(always)]
    pub fn ppn(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Rounds the address down to the given power-of-two granule.
    #[inline(always)]
    pub fn align_down(&self, granule: u64) -> u64 {
        self.0 & !(granule - 1)
    }
}
