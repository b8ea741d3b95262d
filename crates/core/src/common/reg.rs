//! Architectural Register Bank.
//!
//! This module provides the `RegisterBank` struct, the single interface for
//! all register-level state of one CPU. It provides:
//! 1. **Unified Storage:** Integer file, floating-point file, FPCR, and IPR bank.
//! 2. **Abstraction:** A single set of methods for reading and writing registers.
//! 3. **Condition Codes:** The helper computing Z/N/V/C from a result and operands.

use crate::arch::fpcr::Fpcr;
use crate::arch::fpr::FpRegs;
use crate::arch::gpr::IntRegs;
use crate::arch::ipr::{Ipr, IprFile};
use crate::arch::ps::CcFlags;

/// Register bank containing integer, floating-point, FPCR, and IPR state.
///
/// Exclusively owned by its CPU; never shared across threads.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    ints: IntRegs,
    fps: FpRegs,
    fpcr: Fpcr,
    iprs: IprFile,
}

impl RegisterBank {
    /// Creates a new register bank for the given CPU ordinal.
    pub fn new(cpu_id: usize) -> Self {
        Self {
            ints: IntRegs::new(),
            fps: FpRegs::new(),
            fpcr: Fpcr::new(),
            iprs: IprFile::new(cpu_id),
        }
    }

    /// Reads an integer register. `R31` always returns 0.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        self.ints.read(idx)
    }

    /// Writes an integer register. Writes to `R31` are discarded.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        self.ints.write(idx, val);
    }

    /// Reads a floating-point register as raw bits. `F31` always returns +0.0.
    #[inline(always)]
    pub fn read_f(&self, idx: usize) -> u64 {
        self.fps.read(idx)
    }

    /// Writes a floating-point register from raw bits. Writes to `F31` are discarded.
    #[inline(always)]
    pub fn write_f(&mut self, idx: usize, val: u64) {
        self.fps.write(idx, val);
    }

    /// Returns the floating-point control register.
    #[inline(always)]
    pub fn fpcr(&self) -> Fpcr {
        self.fpcr
    }

    /// Returns a mutable reference to the floating-point control register.
    #[inline(always)]
    pub fn fpcr_mut(&mut self) -> &mut Fpcr {
        &mut self.fpcr
    }

    /// Reads an internal processor register.
    #[inline(always)]
    pub fn ipr(&self, ipr: Ipr) -> u64 {
        self.iprs.read(ipr)
    }

    /// Writes an internal processor register.
    #[inline(always)]
    pub fn set_ipr(&mut self, ipr: Ipr, val: u64) {
        self.iprs.write(ipr, val);
    }

    /// Captures the integer file for an exception frame.
    pub fn int_snapshot(&self) -> [u64; 32] {
        self.ints.snapshot()
    }

    /// Restores the integer file from an exception frame.
    pub fn restore_ints(&mut self, snapshot: &[u64; 32]) {
        self.ints.restore(snapshot);
    }

    /// Brings all register state back to reset values, preserving `Whami`.
    pub fn reset(&mut self) {
        self.ints.reset();
        self.fps.reset();
        self.fpcr = Fpcr::new();
        self.iprs.reset();
    }

    /// Dumps the integer file to stderr for debugging.
    pub fn dump(&self) {
        self.ints.dump();
    }
}

/// Computes condition-code flags from an arithmetic result and its operands.
///
/// Signed overflow uses `((op1 ^ op2) & (op1 ^ result)) < 0` for subtraction
/// and `((op1 ^ result) & (op2 ^ result)) < 0` for addition; carry is the
/// unsigned carry-out (add) or borrow (subtract).
pub fn condition_codes(result: u64, op1: u64, op2: u64, is_subtraction: bool) -> CcFlags {
    let v = if is_subtraction {
        (((op1 ^ op2) & (op1 ^ result)) as i64) < 0
    } else {
        (((op1 ^ result) & (op2 ^ result)) as i64) < 0
    };
    let c = if is_subtraction { op1 < op2 } else { result < op1 };
    CcFlags {
        z: result == 0,
        n: (result as i64) < 0,
        v,
        c,
    }
}
