//! Alpha Integer Register File.
//!
//! This module implements the integer register file. It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`R0`-`R31`).
//! 2. **Invariant Enforcement:** Register `R31` is hardwired to zero.
//! 3. **Snapshots:** Whole-file capture and restore for exception frames.

use crate::common::constants::REG_ZERO;

/// Integer register file.
///
/// Register `R31` reads as zero; the slot may be written but the value is
/// discarded, so reads always observe zero.
#[derive(Clone, Debug)]
pub struct IntRegs {
    regs: [u64; 32],
}

impl IntRegs {
    /// Creates a new integer register file with all registers zeroed.
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads an integer register. `R31` always returns 0.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        if idx == REG_ZERO { 0 } else { self.regs[idx] }
    }

    /// Writes an integer register. Writes to `R31` are discarded.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != REG_ZERO {
            self.regs[idx] = val;
        }
    }

    /// Captures the full register file for an exception frame.
    pub fn snapshot(&self) -> [u64; 32] {
        self.regs
    }

    /// Restores the full register file from an exception frame.
    pub fn restore(&mut self, snapshot: &[u64; 32]) {
        self.regs = *snapshot;
        self.regs[REG_ZERO] = 0;
    }

    /// Resets every register to zero.
    pub fn reset(&mut self) {
        self.regs = [0; 32];
    }

    /// Dumps the contents of all integer registers to stderr.
    pub fn dump(&self) {
        for i in (0..32).step_by(2) {
            eprintln!(
                "R{:<2}={:#018x} R{:<2}={:#018x}",
                i,
                self.read(i),
                i + 1,
                self.read(i + 1)
            );
        }
    }
}

impl Default for IntRegs {
    fn default() -> Self {
        Self::new()
    }
}
