//! Alpha Floating-Point Register File.
//!
//! This module implements the floating-point register file. It performs the following:
//! 1. **Storage:** Maintains 32 registers as raw 64-bit words.
//! 2. **Invariant Enforcement:** Register `F31` is hardwired to +0.0.
//! 3. **Reinterpretation:** Values are raw bits, reinterpretable as IEEE
//!    double (T format) or single (S format, stored widened to 64 bits).

/// Floating-point register index hardwired to +0.0.
const FP_ZERO: usize = 31;

/// Floating-point register file.
///
/// Registers are stored as raw 64-bit words rather than `f64` so that
/// non-canonical encodings survive a move untouched.
#[derive(Clone, Debug)]
pub struct FpRegs {
    regs: [u64; 32],
}

impl FpRegs {
    /// Creates a new floating-point register file with all registers at +0.0.
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads a register's raw 64-bit contents. `F31` always returns +0.0.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        if idx == FP_ZERO { 0 } else { self.regs[idx] }
    }

    /// Writes raw 64-bit contents. Writes to `F31` are discarded.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != FP_ZERO {
            self.regs[idx] = val;
        }
    }

    /// Reads a register as an IEEE double.
    #[inline(always)]
    pub fn read_f64(&self, idx: usize) -> f64 {
        f64::from_bits(self.read(idx))
    }

    /// Writes an IEEE double into a register.
    #[inline(always)]
    pub fn write_f64(&mut self, idx: usize, val: f64) {
        self.write(idx, val.to_bits());
    }

    /// Captures the full register file for an exception frame.
    pub fn snapshot(&self) -> [u64; 32] {
        self.regs
    }

    /// Resets every register to +0.0.
    pub fn reset(&mut self) {
        self.regs = [0; 32];
    }
}

impl Default for FpRegs {
    fn default() -> Self {
        Self::new()
    }
}
