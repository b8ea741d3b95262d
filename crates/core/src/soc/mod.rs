//! System-level components shared by all CPUs.
//!
//! This module implements the physical side of the machine. It provides:
//! 1. **Physical Memory:** The flat, bounds-checked backing store.
//! 2. **Bus:** Physical address routing to memory-mapped devices.
//! 3. **Devices:** The device register contract and a minimal console.

/// System bus routing physical ranges to device handlers.
pub mod bus;

/// Memory-mapped device contract and bundled device models.
pub mod devices;

/// Flat physical memory backing store.
pub mod phys;

pub use bus::Bus;
pub use devices::Device;
pub use phys::PhysicalMemory;
