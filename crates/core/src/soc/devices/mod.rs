//! Memory-mapped device contract.
//!
//! This module defines the `Device` trait implemented by all bus-attached
//! components. It provides:
//! 1. **Identification:** `name` for bus diagnostics and overlap errors.
//! 2. **Access:** Register read/write at device-relative offsets in sizes
//!    of 1, 2, 4, or 8 bytes.
//! 3. **Lifecycle:** `reset` back to power-on state.
//!
//! Devices see only `(offset, size, value)` tuples; address decoding happens
//! in the bus. Implementors must be `Send` so the bus can be shared across
//! CPU threads behind its per-device locks.

/// A minimal byte-oriented console device.
pub mod console;

/// Trait for memory-mapped I/O devices attached to the system bus.
pub trait Device: Send {
    /// Returns a short name for this device (e.g. `"CONSOLE"`).
    fn name(&self) -> &str;

    /// Reads a register at the given device-relative offset.
    ///
    /// `size` is one of 1, 2, 4, or 8. A device that does not support the
    /// requested size returns a defined default (conventionally zero).
    fn read(&mut self, offset: u64, size: usize) -> u64;

    /// Writes a register at the given device-relative offset.
    ///
    /// Returns `false` when the device rejects the access (unsupported size
    /// or read-only register); the memory system turns that into a bus-error
    /// fault.
    fn write(&mut self, offset: u64, value: u64, size: usize) -> bool;

    /// Returns the device to its power-on state.
    fn reset(&mut self) {}

    /// Returns a mutable reference as `Console` if this device is the
    /// console; otherwise `None`.
    fn as_console_mut(&mut self) -> Option<&mut Console> {
        None
    }
}

pub use console::Console;
