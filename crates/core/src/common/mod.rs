//! Common utilities and types used throughout the Alpha AXP emulator.
//!
//! This module provides fundamental building blocks that are shared across all
//! components of the emulator. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** System-wide constants for pages, instructions, and reservations.
//! 3. **Memory Access:** Definitions for categorizing memory operations (Fetch/Read/Write).
//! 4. **Error Handling:** The fault taxonomy delivered through the PAL exception path.
//! 5. **Register Management:** The architectural register bank and condition-code helper.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the emulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Fault taxonomy and exception definitions.
pub mod error;

/// Register bank implementation.
pub mod reg;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_SHIFT, PAGE_SIZE, RESERVATION_GRANULE};
pub use data::AccessType;
pub use error::{Exception, MemoryFault, MemoryFaultKind};
pub use reg::RegisterBank;
