//! Configuration system for the emulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the machine. It provides:
//! 1. **Defaults:** Baseline hardware constants (RAM, caches, TLB, SMP).
//! 2. **Structures:** Hierarchical config for general, memory, cache, SMP,
//!    and PAL sections.
//! 3. **PAL Flavors:** Per-OS entry-point offset tables; the offsets are OS
//!    ABI data supplied by configuration, not invented by the core.
//!
//! Configuration is supplied as JSON (`serde_json`) or built from
//! `Config::default()` for the CLI and tests.

use serde::Deserialize;

use crate::common::error::ExceptionClass;

/// Default configuration constants for the emulator.
mod defaults {
    /// Total size of emulated physical memory (128 MiB).
    pub const RAM_SIZE: usize = 128 * 1024 * 1024;

    /// Reset vector: the PC every CPU starts from after reset.
    pub const RESET_VECTOR: u64 = 0x0;

    /// Number of logical CPUs.
    pub const NUM_CPUS: usize = 1;

    /// Translation buffer entry count per side (instruction and data).
    pub const TLB_ENTRIES: usize = 128;

    /// Default cache line size in bytes.
    pub const CACHE_LINE: usize = 64;

    /// L1 cache size in bytes (8 KiB, split I/D).
    pub const L1_SIZE: usize = 8 * 1024;

    /// L1 associativity (direct-mapped, as on the 21064).
    pub const L1_WAYS: usize = 1;

    /// L2 cache size in bytes (96 KiB).
    pub const L2_SIZE: usize = 96 * 1024;

    /// L2 associativity.
    pub const L2_WAYS: usize = 3;

    /// L3 cache size in bytes (2 MiB board cache).
    pub const L3_SIZE: usize = 2 * 1024 * 1024;

    /// L3 associativity.
    pub const L3_WAYS: usize = 1;

    /// Write-buffer capacity in lines before an implicit drain.
    pub const WRITE_BUFFER_LINES: usize = 8;

    /// Execution count at which a PC is considered hot and its decode cached.
    pub const HOT_THRESHOLD: u32 = 16;

    /// Barrier rendezvous timeout in milliseconds before machine check.
    pub const BARRIER_TIMEOUT_MS: u64 = 5_000;

    /// Priority level of interprocessor interrupts.
    pub const IPI_LEVEL: u8 = 6;

    /// Default system control block base when PALcode has not set SCBB.
    pub const SCBB_BASE: u64 = 0x0;
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Machine-wide settings.
    pub general: GeneralConfig,
    /// Physical memory and TLB settings.
    pub memory: MemoryConfig,
    /// Per-level cache settings.
    pub cache: CacheConfig,
    /// SMP coordination settings.
    pub smp: SmpConfig,
    /// PAL dispatch settings.
    pub pal: PalConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Machine-wide settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Number of logical CPUs.
    pub num_cpus: usize,
    /// PC loaded by reset.
    pub reset_vector: u64,
    /// Execution count after which a PC's decode is cached.
    pub hot_threshold: u32,
    /// Emit a trace event per retired instruction.
    pub trace_instructions: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            num_cpus: defaults::NUM_CPUS,
            reset_vector: defaults::RESET_VECTOR,
            hot_threshold: defaults::HOT_THRESHOLD,
            trace_instructions: false,
        }
    }
}

/// Physical memory and TLB settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Physical memory size in bytes.
    pub ram_size: usize,
    /// TLB entries per side.
    pub tlb_entries: usize,
    /// Write-buffer capacity in lines.
    pub write_buffer_lines: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_size: defaults::RAM_SIZE,
            tlb_entries: defaults::TLB_ENTRIES,
            write_buffer_lines: defaults::WRITE_BUFFER_LINES,
        }
    }
}

/// Geometry of one cache level.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CacheLevelConfig {
    /// Total size in bytes.
    pub size_bytes: usize,
    /// Associativity.
    pub ways: usize,
    /// Line size in bytes.
    pub line_bytes: usize,
    /// When false, lookups at this level always miss.
    pub enabled: bool,
}

impl Default for CacheLevelConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::L1_SIZE,
            ways: defaults::L1_WAYS,
            line_bytes: defaults::CACHE_LINE,
            enabled: true,
        }
    }
}

/// The cache hierarchy settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// L1 instruction cache.
    pub l1_i: CacheLevelConfig,
    /// L1 data cache.
    pub l1_d: CacheLevelConfig,
    /// Unified L2.
    pub l2: CacheLevelConfig,
    /// Unified L3.
    pub l3: CacheLevelConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            l1_i: CacheLevelConfig::default(),
            l1_d: CacheLevelConfig::default(),
            l2: CacheLevelConfig {
                size_bytes: defaults::L2_SIZE,
                ways: defaults::L2_WAYS,
                line_bytes: defaults::CACHE_LINE,
                enabled: true,
            },
            l3: CacheLevelConfig {
                size_bytes: defaults::L3_SIZE,
                ways: defaults::L3_WAYS,
                line_bytes: defaults::CACHE_LINE,
                enabled: true,
            },
        }
    }
}

/// SMP coordination settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SmpConfig {
    /// Rendezvous timeout in milliseconds before machine-check escalation.
    pub barrier_timeout_ms: u64,
    /// Priority level attached to interprocessor interrupts.
    pub ipi_level: u8,
}

impl Default for SmpConfig {
    fn default() -> Self {
        Self {
            barrier_timeout_ms: defaults::BARRIER_TIMEOUT_MS,
            ipi_level: defaults::IPI_LEVEL,
        }
    }
}

/// PALcode flavor selecting the entry-point offset table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PalFlavor {
    /// OpenVMS PALcode offsets.
    Vms,
    /// Tru64 (OSF/1) PALcode offsets.
    #[default]
    #[serde(alias = "Osf")]
    Tru64,
    /// Windows NT PALcode offsets.
    Nt,
}

/// PAL dispatch settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PalConfig {
    /// Which offset table to use.
    pub flavor: PalFlavor,
    /// Initial system control block base (PALcode normally writes SCBB).
    pub scbb: u64,
    /// Explicit entry-point offsets, overriding the flavor table wholesale.
    pub offsets: Option<PalOffsets>,
}

impl Default for PalConfig {
    fn default() -> Self {
        Self {
            flavor: PalFlavor::default(),
            scbb: defaults::SCBB_BASE,
            offsets: None,
        }
    }
}

impl PalConfig {
    /// Resolves the effective offset table for this configuration.
    pub fn resolve_offsets(&self) -> PalOffsets {
        self.offsets
            .unwrap_or_else(|| PalOffsets::for_flavor(self.flavor))
    }
}

/// Entry-point offsets from SCBB, one per exception class.
///
/// The values are part of the OS ABI for the selected PALcode flavor and can
/// be overridden wholesale through configuration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PalOffsets {
    /// Machine check entry.
    pub machine_check: u64,
    /// Integer arithmetic trap entry.
    pub arithmetic_trap: u64,
    /// Alignment fault entry.
    pub alignment_fault: u64,
    /// Illegal instruction entry.
    pub illegal_instruction: u64,
    /// Interrupt entry.
    pub interrupt: u64,
    /// Asynchronous system trap entry.
    pub ast: u64,
    /// Floating-point exception entry.
    pub fp_exception: u64,
    /// Translation-not-valid entry.
    pub page_fault: u64,
    /// Access violation entry.
    pub access_violation: u64,
    /// Catch-all entry for unclassified exceptions.
    pub unknown: u64,
    /// Privileged CALL_PAL family entry.
    pub call_pal_privileged: u64,
    /// Unprivileged CALL_PAL family entry.
    pub call_pal_unprivileged: u64,
}

impl Default for PalOffsets {
    fn default() -> Self {
        Self::for_flavor(PalFlavor::default())
    }
}

impl PalOffsets {
    /// Returns the offset table for the given PALcode flavor.
    pub fn for_flavor(flavor: PalFlavor) -> Self {
        match flavor {
            // Tru64 lays the system control block out in 0x100-byte slots.
            PalFlavor::Tru64 => Self {
                machine_check: 0x0000,
                arithmetic_trap: 0x0100,
                alignment_fault: 0x0200,
                illegal_instruction: 0x0300,
                interrupt: 0x0400,
                ast: 0x0500,
                fp_exception: 0x0600,
                page_fault: 0x0700,
                access_violation: 0x0800,
                unknown: 0x0900,
                call_pal_privileged: 0x0A00,
                call_pal_unprivileged: 0x0B00,
            },
            // OpenVMS uses the denser 0x80-slot SCB layout.
            PalFlavor::Vms => Self {
                machine_check: 0x0000,
                arithmetic_trap: 0x0080,
                alignment_fault: 0x0100,
                illegal_instruction: 0x0180,
                interrupt: 0x0200,
                ast: 0x0280,
                fp_exception: 0x0300,
                page_fault: 0x0380,
                access_violation: 0x0400,
                unknown: 0x0480,
                call_pal_privileged: 0x0500,
                call_pal_unprivileged: 0x0580,
            },
            // NT keeps the Tru64 spacing with a relocated CALL_PAL pair.
            PalFlavor::Nt => Self {
                machine_check: 0x0000,
                arithmetic_trap: 0x0100,
                alignment_fault: 0x0200,
                illegal_instruction: 0x0300,
                interrupt: 0x0400,
                ast: 0x0500,
                fp_exception: 0x0600,
                page_fault: 0x0700,
                access_violation: 0x0800,
                unknown: 0x0900,
                call_pal_privileged: 0x1000,
                call_pal_unprivileged: 0x1100,
            },
        }
    }

    /// Returns the offset for an exception class.
    pub fn offset(&self, class: ExceptionClass) -> u64 {
        match class {
            ExceptionClass::MachineCheck => self.machine_check,
            ExceptionClass::ArithmeticTrap => self.arithmetic_trap,
            ExceptionClass::AlignmentFault => self.alignment_fault,
            ExceptionClass::IllegalInstruction => self.illegal_instruction,
            ExceptionClass::Interrupt => self.interrupt,
            ExceptionClass::Ast => self.ast,
            ExceptionClass::FpException => self.fp_exception,
            ExceptionClass::PageFault => self.page_fault,
            ExceptionClass::AccessViolation => self.access_violation,
            ExceptionClass::Unknown => self.unknown,
        }
    }
}
