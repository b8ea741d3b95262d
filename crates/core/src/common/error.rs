//! Fault taxonomy and exception definitions.
//!
//! This module defines the error handling and exception mechanisms of the
//! emulator core. It provides:
//! 1. **Memory Faults:** A tagged sum carrying the faulting address, size, and direction.
//! 2. **Traps:** Arithmetic traps, floating-point exceptions, and machine checks.
//! 3. **Delivery Classes:** The mapping from any exception to its PAL entry-point class.
//!
//! All fault points in the memory system and executors return `Result` values
//! built from these types; the fetch/execute loop matches on them and drives
//! exception delivery explicitly.

use thiserror::Error;

/// Kind discriminant of a memory fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryFaultKind {
    /// No TLB entry exists for the page and PALcode must service the miss.
    TlbMiss,
    /// The page-table entry for the page is marked not-present.
    PageFault,
    /// The address space or privilege level forbids the access outright.
    AccessViolation,
    /// The page's protection bits deny the access.
    ProtectionViolation,
    /// A store was attempted to a page without write permission.
    WriteProtectionFault,
    /// An instruction fetch was attempted from a page without execute permission.
    ExecuteProtectionFault,
    /// The virtual address is not a multiple of the access size.
    AlignmentFault,
    /// The virtual address is malformed (non-canonical or unmapped region).
    InvalidAddress,
    /// A fault occurred while a fault was already being delivered.
    DoubleFault,
    /// The physical address is outside memory and claimed by no device.
    BusError,
}

impl std::fmt::Display for MemoryFaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TlbMiss => "TlbMiss",
            Self::PageFault => "PageFault",
            Self::AccessViolation => "AccessViolation",
            Self::ProtectionViolation => "ProtectionViolation",
            Self::WriteProtectionFault => "WriteProtectionFault",
            Self::ExecuteProtectionFault => "ExecuteProtectionFault",
            Self::AlignmentFault => "AlignmentFault",
            Self::InvalidAddress => "InvalidAddress",
            Self::DoubleFault => "DoubleFault",
            Self::BusError => "BusError",
        };
        write!(f, "{name}")
    }
}

/// A memory fault with the full context needed for PAL delivery.
///
/// Carries the same fields for every kind; dispatch happens on `kind` at the
/// PAL entry-point selector rather than through a type hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind} at {address:#x} (size {size}, write {is_write}, pc {pc:#x})")]
pub struct MemoryFault {
    /// What went wrong.
    pub kind: MemoryFaultKind,
    /// The faulting virtual (or, for bus errors, physical) address.
    pub address: u64,
    /// Access size in bytes.
    pub size: usize,
    /// `true` for store-side faults.
    pub is_write: bool,
    /// Program counter of the faulting instruction.
    pub pc: u64,
}

impl MemoryFault {
    /// Creates a fault record for the given kind and access.
    #[inline]
    pub fn new(kind: MemoryFaultKind, address: u64, size: usize, is_write: bool, pc: u64) -> Self {
        Self {
            kind,
            address,
            size,
            is_write,
            pc,
        }
    }
}

/// Integer arithmetic trap kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticTrap {
    /// A trapping-variant instruction overflowed its destination width.
    IntegerOverflow,
    /// Division by zero.
    DivisionByZero,
}

/// IEEE floating-point exception kinds, matching the FPCR status flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FpException {
    /// Invalid operation (e.g. signaling NaN operand, 0/0).
    Invalid,
    /// Division by zero producing an infinity.
    DivByZero,
    /// Result too large for the destination format.
    Overflow,
    /// Result too small for the destination format.
    Underflow,
    /// Result required rounding.
    Inexact,
}

/// Machine check kinds. `DoubleMachineCheck` is fatal to the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineCheckKind {
    /// Parity error detected in a cache array.
    CacheParity,
    /// Uncorrectable memory ECC error.
    MemoryEcc,
    /// Bus transaction error.
    BusError,
    /// A machine check occurred while one was being handled.
    DoubleMachineCheck,
    /// Thermal emergency.
    Thermal,
    /// Firmware-detected failure.
    Firmware,
}

/// PAL entry-point classes.
///
/// Each exception maps to one class; the PAL vector table (configured per
/// PALcode flavor) maps the class to an offset from SCBB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExceptionClass {
    /// Machine check (hardware failure).
    MachineCheck,
    /// Integer arithmetic trap.
    ArithmeticTrap,
    /// Misaligned memory access.
    AlignmentFault,
    /// Undecodable opcode or function code.
    IllegalInstruction,
    /// Device, timer, or interprocessor interrupt.
    Interrupt,
    /// Asynchronous system trap.
    Ast,
    /// Floating-point exception or FP-disabled fault.
    FpException,
    /// Translation-not-valid fault.
    PageFault,
    /// Access or protection violation.
    AccessViolation,
    /// Any fault without a more specific class.
    Unknown,
}

/// An exception bound for the PAL delivery path.
///
/// Produced at fault points during fetch or execute; the step loop converts
/// it into a stacked exception frame and a jump to the PAL entry point.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Exception {
    /// A fault raised by the memory system.
    #[error("memory fault: {0}")]
    Memory(#[from] MemoryFault),

    /// An integer arithmetic trap from a trapping-variant instruction.
    #[error("arithmetic trap: {0:?}")]
    Arithmetic(ArithmeticTrap),

    /// An enabled IEEE floating-point exception.
    #[error("floating-point exception: {0:?}")]
    FloatingPoint(FpException),

    /// An FP instruction was issued with the FP-enable bit clear.
    #[error("floating-point unit disabled at pc {pc:#x}")]
    FpDisabled {
        /// Program counter of the offending instruction.
        pc: u64,
    },

    /// The instruction word could not be decoded.
    #[error("illegal instruction {instruction:#010x} at pc {pc:#x}")]
    IllegalInstruction {
        /// Program counter of the undecodable word.
        pc: u64,
        /// The raw instruction encoding.
        instruction: u32,
    },

    /// A machine check.
    #[error("machine check: {0:?}")]
    MachineCheck(MachineCheckKind),

    /// An interrupt accepted at an instruction boundary.
    #[error("interrupt vector {vector:#x} at level {level}")]
    Interrupt {
        /// Vector identifying the interrupt source.
        vector: u64,
        /// Priority level (1-7) of the request.
        level: u8,
    },

    /// An asynchronous system trap for the given mode (0 = kernel .. 3 = user).
    #[error("AST for mode {mode}")]
    Ast {
        /// Target processor mode of the AST.
        mode: u8,
    },
}

impl Exception {
    /// Returns the PAL entry-point class this exception is delivered through.
    pub fn class(&self) -> ExceptionClass {
        match self {
            Self::Memory(fault) => match fault.kind {
                MemoryFaultKind::TlbMiss | MemoryFaultKind::PageFault => ExceptionClass::PageFault,
                MemoryFaultKind::AccessViolation
                | MemoryFaultKind::ProtectionViolation
                | MemoryFaultKind::WriteProtectionFault
                | MemoryFaultKind::ExecuteProtectionFault
                | MemoryFaultKind::InvalidAddress => ExceptionClass::AccessViolation,
                MemoryFaultKind::AlignmentFault => ExceptionClass::AlignmentFault,
                MemoryFaultKind::BusError => ExceptionClass::MachineCheck,
                MemoryFaultKind::DoubleFault => ExceptionClass::Unknown,
            },
            Self::Arithmetic(_) => ExceptionClass::ArithmeticTrap,
            Self::FloatingPoint(_) | Self::FpDisabled { .. } => ExceptionClass::FpException,
            Self::IllegalInstruction { .. } => ExceptionClass::IllegalInstruction,
            Self::MachineCheck(_) => ExceptionClass::MachineCheck,
            Self::Interrupt { .. } => ExceptionClass::Interrupt,
            Self::Ast { .. } => ExceptionClass::Ast,
        }
    }

    /// Returns the faulting address for memory faults, zero otherwise.
    ///
    /// Written into the `FaultVa` IPR on delivery so PALcode can inspect it.
    pub fn fault_address(&self) -> u64 {
        match self {
            Self::Memory(fault) => fault.address,
            _ => 0,
        }
    }
}

/// A configuration error detected while constructing the machine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two device mappings overlap; overlap is a hard configuration error.
    #[error("device mapping {name} at {base:#x} (+{size:#x}) overlaps an existing mapping")]
    MappingOverlap {
        /// Name of the device being mapped.
        name: String,
        /// Requested base physical address.
        base: u64,
        /// Requested mapping size in bytes.
        size: u64,
    },

    /// A device mapping with zero size was requested.
    #[error("device mapping {name} has zero size")]
    EmptyMapping {
        /// Name of the device being mapped.
        name: String,
    },

    /// The configured value is outside its legal range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of the rejected value.
        reason: String,
    },
}
