//! Machine assembly and image loading.
//!
//! This module owns the top of the object graph: `Machine` holds the
//! physical memory, bus, SMP coordinator, and every CPU core, and drives
//! execution either single-stepped (tests, scripted drivers) or with one
//! host thread per CPU. `loader` places Alpha ELF or flat images into
//! physical memory.

/// Binary image loading.
pub mod loader;

/// The machine: owner of all components and the run loop.
pub mod machine;

pub use machine::{Machine, MachineBuilder, MachineEvent};
