//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout
//! the emulator. These types are used for the following:
//! 1. **Permission Validation:** Checking read/write/execute protection in the TLB.
//! 2. **Fault Generation:** Selecting the correct fault kind for a denied access.
//! 3. **Statistics Tracking:** Categorizing memory operations for analysis.

/// Type of memory access operation.
///
/// Used to distinguish between instruction fetches, data loads, and data
/// stores for proper translation and permission enforcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch access. Requires execute permission.
    Fetch,

    /// Data read access. Requires read permission.
    Read,

    /// Data write access. Requires write permission.
    Write,
}

impl AccessType {
    /// Returns `true` for store-side accesses.
    #[inline(always)]
    pub fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}
