//! Binary image loading.
//!
//! Loads a guest image into physical memory. ELF images (Alpha machine,
//! 64-bit little-endian) are placed segment by segment at their physical
//! addresses and the entry point is returned; anything that does not parse
//! as ELF is treated as a flat image copied to the given base address.

use object::read::elf::ElfFile64;
use object::{Endianness, Object, ObjectSegment};
use thiserror::Error;

use crate::soc::phys::PhysicalMemory;

/// The official ELF machine number for Alpha.
const EM_ALPHA: u16 = 41;
/// The historical Linux/Alpha machine number, still emitted by some tools.
const EM_ALPHA_LINUX: u16 = 0x9026;

/// Errors from image loading.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The ELF file targets a machine other than Alpha.
    #[error("ELF machine {0:#x} is not Alpha")]
    WrongMachine(u16),

    /// A segment does not fit in physical memory.
    #[error("segment at {addr:#x} (size {size:#x}) exceeds physical memory")]
    SegmentOutOfRange {
        /// Physical load address of the offending segment.
        addr: u64,
        /// Segment size in bytes.
        size: u64,
    },

    /// A flat image does not fit at the requested base.
    #[error("flat image of {size:#x} bytes does not fit at {base:#x}")]
    ImageOutOfRange {
        /// Requested base physical address.
        base: u64,
        /// Image size in bytes.
        size: u64,
    },

    /// The ELF structure is malformed.
    #[error("malformed ELF image: {0}")]
    Malformed(#[from] object::Error),
}

/// Loads an image, returning the entry PC.
///
/// ELF images load at their segment physical addresses; other content is
/// copied verbatim to `flat_base`.
pub fn load_image(
    phys: &PhysicalMemory,
    bytes: &[u8],
    flat_base: u64,
) -> Result<u64, LoaderError> {
    match ElfFile64::parse(bytes) {
        Ok(elf) => load_elf(phys, &elf),
        Err(_) => load_flat(phys, bytes, flat_base),
    }
}

fn load_elf(
    phys: &PhysicalMemory,
    elf: &ElfFile64<'_, Endianness>,
) -> Result<u64, LoaderError> {
    let endian = elf.endian();
    let machine = elf.elf_header().e_machine.get(endian);
    if machine != EM_ALPHA && machine != EM_ALPHA_LINUX {
        return Err(LoaderError::WrongMachine(machine));
    }

    for segment in elf.segments() {
        let addr = segment.address();
        let size = segment.size();
        if size == 0 {
            continue;
        }
        let data = segment.data()?;
        if !phys.contains(addr, size as usize) {
            return Err(LoaderError::SegmentOutOfRange { addr, size });
        }
        if !data.is_empty() {
            phys.write_bytes(addr, data)
                .map_err(|_| LoaderError::SegmentOutOfRange { addr, size })?;
        }
        tracing::debug!(
            addr = format_args!("{addr:#x}"),
            size,
            filesz = data.len(),
            "loaded ELF segment"
        );
    }

    Ok(elf.entry())
}

fn load_flat(phys: &PhysicalMemory, bytes: &[u8], base: u64) -> Result<u64, LoaderError> {
    phys.write_bytes(base, bytes)
        .map_err(|_| LoaderError::ImageOutOfRange {
            base,
            size: bytes.len() as u64,
        })?;
    tracing::debug!(
        base = format_args!("{base:#x}"),
        size = bytes.len(),
        "loaded flat image"
    );
    Ok(base)
}
