//! Alpha AXP system emulator library.
//!
//! This crate implements an architecturally faithful Alpha AXP multiprocessor
//! core with the following:
//! 1. **CPU:** Fetch/decode/execute/writeback interpretation of the full
//!    32-bit instruction set with a hot-path decode cache, precise exception
//!    delivery, and PAL-mode transitions.
//! 2. **Memory:** Per-CPU split TLBs with ASN tagging, a three-level cache
//!    hierarchy with write buffering, bounds-checked physical memory, and
//!    MMIO dispatch over the device bus.
//! 3. **SMP:** Thread-per-CPU execution with linearizable LL/SC reservation
//!    arbitration, cache coherency events, TLB shootdowns, and IPIs.
//! 4. **Simulation:** `Machine` (owns memory, bus, coordinator, and CPUs),
//!    image loader, configuration, and statistics.

/// Architectural register-level state (register files, PS, FPCR, IPRs).
pub mod arch;
/// Common types and constants (addresses, access types, faults, registers).
pub mod common;
/// Emulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (state machine, step loop, executors, exceptions, hot path).
pub mod cpu;
/// Alpha AXP instruction set support (opcodes, decode, disassembly).
pub mod isa;
/// Per-CPU memory subsystem (TLB, PTE, caches, memory-system facade).
pub mod mem;
/// Simulation: `Machine`, builder, and image loader.
pub mod sim;
/// Cross-CPU coordination (reservations, coherency, IPIs).
pub mod smp;
/// System-level components (physical memory, bus, devices).
pub mod soc;
/// Execution statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds registers, caches, TLBs, and statistics.
pub use crate::cpu::CpuCore;
/// Top-level machine; owns memory, bus, coordinator, and all CPUs.
pub use crate::sim::Machine;
/// Shared coordinator for reservations, coherency, and IPIs.
pub use crate::smp::SmpCoordinator;
