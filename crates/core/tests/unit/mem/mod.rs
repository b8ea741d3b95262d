//! Memory subsystem unit tests.



/// TLB lookup, permissions, and invalidation.
pub mod tlb;
