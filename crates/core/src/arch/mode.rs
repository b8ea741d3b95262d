//! Alpha AXP Processor Modes.
//!
//! This module defines the four privilege modes of the Alpha architecture.
//! It implements the following:
//! 1. **Mode Classification:** Kernel, Executive, Supervisor, and User modes.
//! 2. **Serialization:** Conversion between numeric representations and enum variants.
//! 3. **Observability:** Human-readable naming and display formatting.

/// Alpha AXP privilege mode levels.
///
/// The architecture defines four modes; kernel is the most privileged and is
/// the only mode PALcode runs in. OpenVMS uses all four; Tru64 and NT use
/// kernel and user only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeMode {
    /// Kernel mode. Most privileged; required for PAL execution.
    Kernel = 0,

    /// Executive mode (OpenVMS record management services).
    Executive = 1,

    /// Supervisor mode (OpenVMS command language interpreter).
    Supervisor = 2,

    /// User mode. Least privileged; application code.
    User = 3,
}

impl PrivilegeMode {
    /// Converts a `u8` value to a privilege mode.
    ///
    /// Values outside 0-3 decode to `User`, the least privileged mode.
    pub fn from_u8(val: u8) -> Self {
        match val {
            0 => Self::Kernel,
            1 => Self::Executive,
            2 => Self::Supervisor,
            _ => Self::User,
        }
    }

    /// Converts a privilege mode to its `u8` representation (0-3).
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` when the mode may execute privileged operations.
    #[inline(always)]
    pub fn is_kernel(self) -> bool {
        matches!(self, Self::Kernel)
    }

    /// Returns the human-readable name of the privilege mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kernel => "Kernel",
            Self::Executive => "Executive",
            Self::Supervisor => "Supervisor",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
