//! Shift and byte-manipulation executors (opcode 0x12).
//!
//! SLL/SRL/SRA take their shift count from the low six bits of the operand.
//! The extract/insert/mask families treat the operand's low three bits as a
//! byte offset; the low forms produce the bytes that land inside the
//! aligned quadword, the high forms the bytes that spill into its
//! successor. ZAP/ZAPNOT clear bytes selected by an 8-bit lane mask.

use crate::common::error::Exception;
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::ints;

/// Byte-lane masks for word, longword, and quadword fields.
const BYTE: u64 = 0xFF;
const WORD: u64 = 0xFFFF;
const LONG: u64 = 0xFFFF_FFFF;
const QUAD: u64 = u64::MAX;

#[inline(always)]
fn byte_shift(b: u64) -> u32 {
    ((b & 7) * 8) as u32
}

/// Low-form extract: the field shifted down to bit 0.
#[inline(always)]
fn ext_low(a: u64, b: u64, mask: u64) -> u64 {
    (a >> byte_shift(b)) & mask
}

/// High-form extract: the bytes the low form lost to the next quadword.
#[inline(always)]
fn ext_high(a: u64, b: u64, mask: u64) -> u64 {
    let shift = byte_shift(b);
    if shift == 0 { 0 } else { (a << (64 - shift)) & mask }
}

/// Low-form insert: the field positioned at the byte offset.
#[inline(always)]
fn ins_low(a: u64, b: u64, mask: u64) -> u64 {
    (a & mask) << byte_shift(b)
}

/// High-form insert: the bytes that overflow into the next quadword.
#[inline(always)]
fn ins_high(a: u64, b: u64, mask: u64) -> u64 {
    let shift = byte_shift(b);
    if shift == 0 { 0 } else { (a & mask) >> (64 - shift) }
}

/// Low-form mask: clears the field bytes in place.
#[inline(always)]
fn msk_low(a: u64, b: u64, mask: u64) -> u64 {
    a & !(mask << byte_shift(b))
}

/// High-form mask: clears the overflowed field bytes.
#[inline(always)]
fn msk_high(a: u64, b: u64, mask: u64) -> u64 {
    let shift = byte_shift(b);
    if shift == 0 { a } else { a & !(mask >> (64 - shift)) }
}

/// ZAP/ZAPNOT byte clearing from an 8-bit lane mask.
fn byte_zap(a: u64, lanes: u64) -> u64 {
    let mut result = a;
    for i in 0..8 {
        if lanes & (1 << i) != 0 {
            result &= !(0xFFu64 << (i * 8));
        }
    }
    result
}

impl CpuCore {
    pub(crate) fn exec_shift(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let a = self.regs.read(d.ra);
        let b = self.rb_or_lit(d);

        let result = match d.func {
            ints::SLL => a << (b & 0x3F),
            ints::SRL => a >> (b & 0x3F),
            ints::SRA => ((a as i64) >> (b & 0x3F)) as u64,

            ints::ZAP => byte_zap(a, b),
            ints::ZAPNOT => byte_zap(a, !b),

            ints::EXTBL => ext_low(a, b, BYTE),
            ints::EXTWL => ext_low(a, b, WORD),
            ints::EXTLL => ext_low(a, b, LONG),
            ints::EXTQL => ext_low(a, b, QUAD),
            ints::EXTWH => ext_high(a, b, WORD),
            ints::EXTLH => ext_high(a, b, LONG),
            ints::EXTQH => ext_high(a, b, QUAD),

            ints::INSBL => ins_low(a, b, BYTE),
            ints::INSWL => ins_low(a, b, WORD),
            ints::INSLL => ins_low(a, b, LONG),
            ints::INSQL => ins_low(a, b, QUAD),
            ints::INSWH => ins_high(a, b, WORD),
            ints::INSLH => ins_high(a, b, LONG),
            ints::INSQH => ins_high(a, b, QUAD),

            ints::MSKBL => msk_low(a, b, BYTE),
            ints::MSKWL => msk_low(a, b, WORD),
            ints::MSKLL => msk_low(a, b, LONG),
            ints::MSKQL => msk_low(a, b, QUAD),
            ints::MSKWH => msk_high(a, b, WORD),
            ints::MSKLH => msk_high(a, b, LONG),
            ints::MSKQH => msk_high(a, b, QUAD),

            _ => return Err(self.illegal(d)),
        };

        self.regs.write(d.rc, result);
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }
}
