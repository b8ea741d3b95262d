//! System bus for memory-mapped I/O.
//!
//! This module implements the bus that routes physical addresses to device
//! handlers. It provides:
//! 1. **Device registration:** Mappings are added by address range, sorted
//!    for lookup, and overlap is refused as a hard configuration error.
//! 2. **Access routing:** `resolve` finds the claiming mapping; read/write
//!    dispatch through a per-device lock so the bus can be shared by all
//!    CPU threads.
//! 3. **Reset:** Every device can be returned to power-on state.
//!
//! Mappings are read-mostly: registration happens during machine
//! construction while no CPU is running, after which the table is immutable.

use std::sync::Mutex;

use crate::common::error::ConfigError;

use super::devices::Device;

/// A physical address range owned by a device.
pub struct DeviceMapping {
    /// First physical address of the mapping.
    pub base: u64,
    /// Size of the mapping in bytes.
    pub size: u64,
    /// Device name captured at map time for diagnostics.
    pub name: String,
    handler: Mutex<Box<dyn Device>>,
}

impl DeviceMapping {
    /// Returns whether this mapping claims `pa`.
    #[inline(always)]
    fn contains(&self, pa: u64) -> bool {
        pa >= self.base && pa - self.base < self.size
    }

    fn overlaps(&self, base: u64, size: u64) -> bool {
        base < self.base.saturating_add(self.size) && self.base < base.saturating_add(size)
    }
}

impl std::fmt::Debug for DeviceMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceMapping")
            .field("base", &self.base)
            .field("size", &self.size)
            .field("name", &self.name)
            .finish()
    }
}

/// System bus mapping physical address ranges to device handlers.
#[derive(Debug, Default)]
pub struct Bus {
    mappings: Vec<DeviceMapping>,
}

impl Bus {
    /// Creates an empty bus with no mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device at `[base, base + size)`.
    ///
    /// Overlapping an existing mapping is a configuration error, reported
    /// and refused. Mappings are kept sorted by base address.
    pub fn map(&mut self, device: Box<dyn Device>, base: u64, size: u64) -> Result<(), ConfigError> {
        let name = device.name().to_owned();
        if size == 0 {
            return Err(ConfigError::EmptyMapping { name });
        }
        if self.mappings.iter().any(|m| m.overlaps(base, size)) {
            return Err(ConfigError::MappingOverlap { name, base, size });
        }

        tracing::debug!(device = %name, base = format_args!("{base:#x}"), size, "bus map");
        self.mappings.push(DeviceMapping {
            base,
            size,
            name,
            handler: Mutex::new(device),
        });
        self.mappings.sort_by_key(|m| m.base);
        Ok(())
    }

    /// Finds the mapping claiming `pa`, returning it with the device-relative offset.
    pub fn resolve(&self, pa: u64) -> Option<(&DeviceMapping, u64)> {
        self.mappings
            .iter()
            .find(|m| m.contains(pa))
            .map(|m| (m, pa - m.base))
    }

    /// Returns whether any mapping claims `pa`.
    #[inline]
    pub fn is_mmio(&self, pa: u64) -> bool {
        self.mappings.iter().any(|m| m.contains(pa))
    }

    /// Reads a device register at physical address `pa`.
    ///
    /// Returns `None` when no mapping claims the address.
    pub fn read(&self, pa: u64, size: usize) -> Option<u64> {
        let (mapping, offset) = self.resolve(pa)?;
        let mut dev = lock_device(mapping);
        Some(dev.read(offset, size))
    }

    /// Writes a device register at physical address `pa`.
    ///
    /// Returns `None` when no mapping claims the address; `Some(false)` when
    /// the device rejected the access.
    pub fn write(&self, pa: u64, value: u64, size: usize) -> Option<bool> {
        let (mapping, offset) = self.resolve(pa)?;
        let mut dev = lock_device(mapping);
        Some(dev.write(offset, value, size))
    }

    /// Resets every mapped device to power-on state.
    pub fn reset(&self) {
        for mapping in &self.mappings {
            lock_device(mapping).reset();
        }
    }

    /// Runs `f` against the device registered under `name`.
    ///
    /// Used by drivers and tests that need device-specific access (e.g.
    /// draining console output) without widening the bus contract.
    pub fn with_device<R>(&self, name: &str, f: impl FnOnce(&mut dyn Device) -> R) -> Option<R> {
        let mapping = self.mappings.iter().find(|m| m.name == name)?;
        let mut dev = lock_device(mapping);
        Some(f(dev.as_mut()))
    }
}

fn lock_device(mapping: &DeviceMapping) -> std::sync::MutexGuard<'_, Box<dyn Device>> {
    // A poisoned device lock means a device handler panicked on another
    // thread; the register state is still the best available.
    match mapping.handler.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
