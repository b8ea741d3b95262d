//! Alpha AXP instruction set support.
//!
//! This module covers everything about the 32-bit fixed-width encoding:
//!
//! # Structure
//!
//! - `opcodes`: Major opcodes and per-family function codes.
//! - `instruction`: Bit-level field extraction from raw encodings.
//! - `decode`: The `Decoded` structure and format-aware decoder.
//! - `disasm`: Compact disassembly for tracing and tests.

/// Format-aware instruction decoding.
pub mod decode;

/// Compact disassembler.
pub mod disasm;

/// Bit-level field extraction.
pub mod instruction;

/// Major opcodes and function codes.
pub mod opcodes;
