//! Alpha AXP major opcodes and function codes.
//!
//! Major opcodes live in bits 31:26 of every instruction. Operate-format
//! instructions carry a 7-bit function code in bits 11:5; floating-point
//! operates carry an 11-bit function in bits 15:5; the MISC group encodes its
//! function in the 16-bit displacement field.

/// CALL_PAL: trap into the Privileged Architecture Library.
pub const CALL_PAL: u32 = 0x00;

/// LDA: load address (`Ra <- Rb + disp`).
pub const LDA: u32 = 0x08;
/// LDAH: load address high (`Ra <- Rb + (disp << 16)`).
pub const LDAH: u32 = 0x09;
/// LDBU: load zero-extended byte.
pub const LDBU: u32 = 0x0A;
/// LDQ_U: load unaligned quadword.
pub const LDQ_U: u32 = 0x0B;
/// LDWU: load zero-extended word.
pub const LDWU: u32 = 0x0C;
/// STW: store word.
pub const STW: u32 = 0x0D;
/// STB: store byte.
pub const STB: u32 = 0x0E;
/// STQ_U: store unaligned quadword.
pub const STQ_U: u32 = 0x0F;

/// Integer arithmetic operate group.
pub const INTA: u32 = 0x10;
/// Integer logical operate group.
pub const INTL: u32 = 0x11;
/// Integer shift and byte-manipulation group.
pub const INTS: u32 = 0x12;
/// Integer multiply group.
pub const INTM: u32 = 0x13;

/// Integer-to-FP register moves and square roots.
pub const ITFP: u32 = 0x14;
/// VAX floating-point operate group (legacy F/G formats).
pub const FLTV: u32 = 0x15;
/// IEEE floating-point operate group (S/T formats).
pub const FLTI: u32 = 0x16;
/// Floating-point data-movement group (CPYS, FCMOV, FPCR access).
pub const FLTL: u32 = 0x17;

/// Miscellaneous group: barriers, RPCC, prefetch hints.
pub const MISC: u32 = 0x18;

/// HW_MFPR: move from internal processor register (PAL mode only).
pub const HW_MFPR: u32 = 0x19;
/// JMP/JSR/RET/JSR_COROUTINE.
pub const JSR: u32 = 0x1A;
/// HW_LD: physical-mode load (PAL mode only).
pub const HW_LD: u32 = 0x1B;
/// Sign extension, population counts, and other extended integer ops.
pub const FPTI: u32 = 0x1C;
/// HW_MTPR: move to internal processor register (PAL mode only).
pub const HW_MTPR: u32 = 0x1D;
/// HW_REI: return from exception or interrupt (PAL mode only).
pub const HW_REI: u32 = 0x1E;
/// HW_ST: physical-mode store (PAL mode only).
pub const HW_ST: u32 = 0x1F;

/// LDF: load VAX F-format (legacy).
pub const LDF: u32 = 0x20;
/// LDG: load VAX G-format (legacy).
pub const LDG: u32 = 0x21;
/// LDS: load IEEE single.
pub const LDS: u32 = 0x22;
/// LDT: load IEEE double.
pub const LDT: u32 = 0x23;
/// STF: store VAX F-format (legacy).
pub const STF: u32 = 0x24;
/// STG: store VAX G-format (legacy).
pub const STG: u32 = 0x25;
/// STS: store IEEE single.
pub const STS: u32 = 0x26;
/// STT: store IEEE double.
pub const STT: u32 = 0x27;

/// LDL: load sign-extended longword.
pub const LDL: u32 = 0x28;
/// LDQ: load quadword.
pub const LDQ: u32 = 0x29;
/// LDL_L: load longword locked.
pub const LDL_L: u32 = 0x2A;
/// LDQ_L: load quadword locked.
pub const LDQ_L: u32 = 0x2B;
/// STL: store longword.
pub const STL: u32 = 0x2C;
/// STQ: store quadword.
pub const STQ: u32 = 0x2D;
/// STL_C: store longword conditional.
pub const STL_C: u32 = 0x2E;
/// STQ_C: store quadword conditional.
pub const STQ_C: u32 = 0x2F;

/// BR: unconditional branch.
pub const BR: u32 = 0x30;
/// FBEQ: branch if FP register equals zero.
pub const FBEQ: u32 = 0x31;
/// FBLT: branch if FP register less than zero.
pub const FBLT: u32 = 0x32;
/// FBLE: branch if FP register less than or equal to zero.
pub const FBLE: u32 = 0x33;
/// BSR: branch to subroutine.
pub const BSR: u32 = 0x34;
/// FBNE: branch if FP register not equal to zero.
pub const FBNE: u32 = 0x35;
/// FBGE: branch if FP register greater than or equal to zero.
pub const FBGE: u32 = 0x36;
/// FBGT: branch if FP register greater than zero.
pub const FBGT: u32 = 0x37;
/// BLBC: branch if low bit clear.
pub const BLBC: u32 = 0x38;
/// BEQ: branch if register equals zero.
pub const BEQ: u32 = 0x39;
/// BLT: branch if register less than zero.
pub const BLT: u32 = 0x3A;
/// BLE: branch if register less than or equal to zero.
pub const BLE: u32 = 0x3B;
/// BLBS: branch if low bit set.
pub const BLBS: u32 = 0x3C;
/// BNE: branch if register not equal to zero.
pub const BNE: u32 = 0x3D;
/// BGE: branch if register greater than or equal to zero.
pub const BGE: u32 = 0x3E;
/// BGT: branch if register greater than zero.
pub const BGT: u32 = 0x3F;

/// Function codes for the integer arithmetic group (opcode 0x10).
pub mod inta {
    /// Add longword.
    pub const ADDL: u32 = 0x00;
    /// Scaled-by-4 add longword.
    pub const S4ADDL: u32 = 0x02;
    /// Subtract longword.
    pub const SUBL: u32 = 0x09;
    /// Scaled-by-4 subtract longword.
    pub const S4SUBL: u32 = 0x0B;
    /// Compare bytes for greater-or-equal, producing a byte mask.
    pub const CMPBGE: u32 = 0x0F;
    /// Scaled-by-8 add longword.
    pub const S8ADDL: u32 = 0x12;
    /// Scaled-by-8 subtract longword.
    pub const S8SUBL: u32 = 0x1B;
    /// Compare unsigned less-than.
    pub const CMPULT: u32 = 0x1D;
    /// Add quadword.
    pub const ADDQ: u32 = 0x20;
    /// Scaled-by-4 add quadword.
    pub const S4ADDQ: u32 = 0x22;
    /// Subtract quadword.
    pub const SUBQ: u32 = 0x29;
    /// Scaled-by-4 subtract quadword.
    pub const S4SUBQ: u32 = 0x2B;
    /// Compare signed equality.
    pub const CMPEQ: u32 = 0x2D;
    /// Scaled-by-8 add quadword.
    pub const S8ADDQ: u32 = 0x32;
    /// Scaled-by-8 subtract quadword.
    pub const S8SUBQ: u32 = 0x3B;
    /// Compare unsigned less-or-equal.
    pub const CMPULE: u32 = 0x3D;
    /// Add longword, trapping on overflow.
    pub const ADDL_V: u32 = 0x40;
    /// Subtract longword, trapping on overflow.
    pub const SUBL_V: u32 = 0x49;
    /// Compare signed less-than.
    pub const CMPLT: u32 = 0x4D;
    /// Add quadword, trapping on overflow.
    pub const ADDQ_V: u32 = 0x60;
    /// Subtract quadword, trapping on overflow.
    pub const SUBQ_V: u32 = 0x69;
    /// Compare signed less-or-equal.
    pub const CMPLE: u32 = 0x6D;
}

/// Function codes for the integer logical group (opcode 0x11).
pub mod intl {
    /// Bitwise AND.
    pub const AND: u32 = 0x00;
    /// AND with complement (bit clear).
    pub const BIC: u32 = 0x08;
    /// Conditional move if low bit set.
    pub const CMOVLBS: u32 = 0x14;
    /// Conditional move if low bit clear.
    pub const CMOVLBC: u32 = 0x16;
    /// Bitwise OR (bit set).
    pub const BIS: u32 = 0x20;
    /// Conditional move if equal to zero.
    pub const CMOVEQ: u32 = 0x24;
    /// Conditional move if not equal to zero.
    pub const CMOVNE: u32 = 0x26;
    /// OR with complement.
    pub const ORNOT: u32 = 0x28;
    /// Bitwise exclusive OR.
    pub const XOR: u32 = 0x40;
    /// Conditional move if less than zero.
    pub const CMOVLT: u32 = 0x44;
    /// Conditional move if greater than or equal to zero.
    pub const CMOVGE: u32 = 0x46;
    /// Exclusive NOR (equivalence).
    pub const EQV: u32 = 0x48;
    /// Architecture mask: report implemented extensions.
    pub const AMASK: u32 = 0x61;
    /// Conditional move if less than or equal to zero.
    pub const CMOVLE: u32 = 0x64;
    /// Conditional move if greater than zero.
    pub const CMOVGT: u32 = 0x66;
    /// Implementation version.
    pub const IMPLVER: u32 = 0x6C;
}

/// Function codes for the shift and byte-manipulation group (opcode 0x12).
pub mod ints {
    /// Mask byte low.
    pub const MSKBL: u32 = 0x02;
    /// Extract byte low.
    pub const EXTBL: u32 = 0x06;
    /// Insert byte low.
    pub const INSBL: u32 = 0x0B;
    /// Mask word low.
    pub const MSKWL: u32 = 0x12;
    /// Extract word low.
    pub const EXTWL: u32 = 0x16;
    /// Insert word low.
    pub const INSWL: u32 = 0x1B;
    /// Mask longword low.
    pub const MSKLL: u32 = 0x22;
    /// Extract longword low.
    pub const EXTLL: u32 = 0x26;
    /// Insert longword low.
    pub const INSLL: u32 = 0x2B;
    /// Zero bytes selected by mask.
    pub const ZAP: u32 = 0x30;
    /// Zero bytes not selected by mask.
    pub const ZAPNOT: u32 = 0x31;
    /// Mask quadword low.
    pub const MSKQL: u32 = 0x32;
    /// Shift right logical.
    pub const SRL: u32 = 0x34;
    /// Extract quadword low.
    pub const EXTQL: u32 = 0x36;
    /// Shift left logical.
    pub const SLL: u32 = 0x39;
    /// Insert quadword low.
    pub const INSQL: u32 = 0x3B;
    /// Shift right arithmetic.
    pub const SRA: u32 = 0x3C;
    /// Mask word high.
    pub const MSKWH: u32 = 0x52;
    /// Insert word high.
    pub const INSWH: u32 = 0x57;
    /// Extract word high.
    pub const EXTWH: u32 = 0x5A;
    /// Mask longword high.
    pub const MSKLH: u32 = 0x62;
    /// Insert longword high.
    pub const INSLH: u32 = 0x67;
    /// Extract longword high.
    pub const EXTLH: u32 = 0x6A;
    /// Mask quadword high.
    pub const MSKQH: u32 = 0x72;
    /// Insert quadword high.
    pub const INSQH: u32 = 0x77;
    /// Extract quadword high.
    pub const EXTQH: u32 = 0x7A;
}

/// Function codes for the integer multiply group (opcode 0x13).
pub mod intm {
    /// Multiply longword.
    pub const MULL: u32 = 0x00;
    /// Multiply quadword.
    pub const MULQ: u32 = 0x20;
    /// Unsigned multiply quadword high.
    pub const UMULH: u32 = 0x30;
    /// Multiply longword, trapping on overflow.
    pub const MULL_V: u32 = 0x40;
    /// Multiply quadword, trapping on overflow.
    pub const MULQ_V: u32 = 0x60;
}

/// Base operation codes (function bits 5:0) for IEEE operates (opcode 0x16).
///
/// The full 11-bit function field splits into operation (bits 5:0), rounding
/// qualifier (bits 7:6), and trap qualifier (bits 10:8).
pub mod flti {
    /// Add single.
    pub const ADDS: u32 = 0x00;
    /// Subtract single.
    pub const SUBS: u32 = 0x01;
    /// Multiply single.
    pub const MULS: u32 = 0x02;
    /// Divide single.
    pub const DIVS: u32 = 0x03;
    /// Add double.
    pub const ADDT: u32 = 0x20;
    /// Subtract double.
    pub const SUBT: u32 = 0x21;
    /// Multiply double.
    pub const MULT: u32 = 0x22;
    /// Divide double.
    pub const DIVT: u32 = 0x23;
    /// Compare unordered.
    pub const CMPTUN: u32 = 0x24;
    /// Compare equal.
    pub const CMPTEQ: u32 = 0x25;
    /// Compare less-than.
    pub const CMPTLT: u32 = 0x26;
    /// Compare less-or-equal.
    pub const CMPTLE: u32 = 0x27;
    /// Convert double to single.
    pub const CVTTS: u32 = 0x2C;
    /// Convert double to quadword integer.
    pub const CVTTQ: u32 = 0x2F;
    /// Convert quadword integer to single.
    pub const CVTQS: u32 = 0x3C;
    /// Convert quadword integer to double.
    pub const CVTQT: u32 = 0x3E;
}

/// Function codes for FP data movement (opcode 0x17, full 11-bit values).
pub mod fltl {
    /// Convert longword to quadword in an FP register.
    pub const CVTLQ: u32 = 0x010;
    /// Copy sign.
    pub const CPYS: u32 = 0x020;
    /// Copy negated sign.
    pub const CPYSN: u32 = 0x021;
    /// Copy sign and exponent.
    pub const CPYSE: u32 = 0x022;
    /// Move to FPCR.
    pub const MT_FPCR: u32 = 0x024;
    /// Move from FPCR.
    pub const MF_FPCR: u32 = 0x025;
    /// FP conditional move if equal.
    pub const FCMOVEQ: u32 = 0x02A;
    /// FP conditional move if not equal.
    pub const FCMOVNE: u32 = 0x02B;
    /// FP conditional move if less than.
    pub const FCMOVLT: u32 = 0x02C;
    /// FP conditional move if greater or equal.
    pub const FCMOVGE: u32 = 0x02D;
    /// FP conditional move if less or equal.
    pub const FCMOVLE: u32 = 0x02E;
    /// FP conditional move if greater than.
    pub const FCMOVGT: u32 = 0x02F;
    /// Convert quadword to longword in an FP register.
    pub const CVTQL: u32 = 0x030;
}

/// Base operation codes (function bits 5:0) for opcode 0x14 (ITFP).
pub mod itfp {
    /// Move integer register to FP register (single).
    pub const ITOFS: u32 = 0x04;
    /// Move integer register to FP register (F format, legacy).
    pub const ITOFF: u32 = 0x14;
    /// Move integer register to FP register (double).
    pub const ITOFT: u32 = 0x24;
    /// Square root single.
    pub const SQRTS: u32 = 0x0B;
    /// Square root double.
    pub const SQRTT: u32 = 0x2B;
}

/// Function codes for the extended integer group (opcode 0x1C).
pub mod fpti {
    /// Sign-extend byte.
    pub const SEXTB: u32 = 0x00;
    /// Sign-extend word.
    pub const SEXTW: u32 = 0x01;
    /// Count population.
    pub const CTPOP: u32 = 0x30;
    /// Pixel error (sum of absolute byte differences).
    pub const PERR: u32 = 0x31;
    /// Count leading zeros.
    pub const CTLZ: u32 = 0x32;
    /// Count trailing zeros.
    pub const CTTZ: u32 = 0x33;
    /// Move FP register to integer register (double).
    pub const FTOIT: u32 = 0x70;
    /// Move FP register to integer register (single).
    pub const FTOIS: u32 = 0x78;
}

/// Function codes for the MISC group (opcode 0x18, 16-bit field).
pub mod misc {
    /// Trap barrier.
    pub const TRAPB: u32 = 0x0000;
    /// Exception barrier.
    pub const EXCB: u32 = 0x0400;
    /// Memory barrier.
    pub const MB: u32 = 0x4000;
    /// Write memory barrier.
    pub const WMB: u32 = 0x4400;
    /// Prefetch hint.
    pub const FETCH: u32 = 0x8000;
    /// Prefetch hint with modify intent.
    pub const FETCH_M: u32 = 0xA000;
    /// Read processor cycle counter.
    pub const RPCC: u32 = 0xC000;
    /// Read and clear intr_flag.
    pub const RC: u32 = 0xE000;
    /// Evict cache block.
    pub const ECB: u32 = 0xE800;
    /// Read and set intr_flag.
    pub const RS: u32 = 0xF000;
    /// Write hint: 64-byte block will be written entirely.
    pub const WH64: u32 = 0xF800;
}

/// Branch-type hints for opcode 0x1A (bits 15:14 of the displacement field).
pub mod jsr {
    /// JMP: jump without linkage prediction.
    pub const JMP: u32 = 0;
    /// JSR: jump to subroutine, push return prediction.
    pub const JSR: u32 = 1;
    /// RET: return, pop return prediction.
    pub const RET: u32 = 2;
    /// JSR_COROUTINE: pop then push return prediction.
    pub const JSR_COROUTINE: u32 = 3;
}

/// CALL_PAL function codes with fixed core semantics.
pub mod pal {
    /// HALT: stop the processor. Privileged.
    pub const HALT: u32 = 0x0000;
    /// Highest privileged CALL_PAL function.
    pub const PRIVILEGED_MAX: u32 = 0x3F;
    /// Lowest unprivileged CALL_PAL function.
    pub const UNPRIVILEGED_BASE: u32 = 0x80;
    /// Highest unprivileged CALL_PAL function.
    pub const UNPRIVILEGED_MAX: u32 = 0xBF;
}
