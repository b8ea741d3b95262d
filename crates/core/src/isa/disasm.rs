//! Compact disassembler.
//!
//! Produces short mnemonic strings for tracing and tests. Operand formatting
//! follows the conventional assembler layout (`addq r1, r2, r3`;
//! `ldq r4, 16(r5)`; `beq r3, 0x1020`). Unknown encodings render as
//! `.word 0x...` rather than failing.

use super::decode::{Decoded, decode};
use super::opcodes as op;

fn inta_name(func: u32) -> Option<&'static str> {
    Some(match func {
        op::inta::ADDL => "addl",
        op::inta::S4ADDL => "s4addl",
        op::inta::SUBL => "subl",
        op::inta::S4SUBL => "s4subl",
        op::inta::CMPBGE => "cmpbge",
        op::inta::S8ADDL => "s8addl",
        op::inta::S8SUBL => "s8subl",
        op::inta::CMPULT => "cmpult",
        op::inta::ADDQ => "addq",
        op::inta::S4ADDQ => "s4addq",
        op::inta::SUBQ => "subq",
        op::inta::S4SUBQ => "s4subq",
        op::inta::CMPEQ => "cmpeq",
        op::inta::S8ADDQ => "s8addq",
        op::inta::S8SUBQ => "s8subq",
        op::inta::CMPULE => "cmpule",
        op::inta::ADDL_V => "addl/v",
        op::inta::SUBL_V => "subl/v",
        op::inta::CMPLT => "cmplt",
        op::inta::ADDQ_V => "addq/v",
        op::inta::SUBQ_V => "subq/v",
        op::inta::CMPLE => "cmple",
        _ => return None,
    })
}

fn intl_name(func: u32) -> Option<&'static str> {
    Some(match func {
        op::intl::AND => "and",
        op::intl::BIC => "bic",
        op::intl::CMOVLBS => "cmovlbs",
        op::intl::CMOVLBC => "cmovlbc",
        op::intl::BIS => "bis",
        op::intl::CMOVEQ => "cmoveq",
        op::intl::CMOVNE => "cmovne",
        op::intl::ORNOT => "ornot",
        op::intl::XOR => "xor",
        op::intl::CMOVLT => "cmovlt",
        op::intl::CMOVGE => "cmovge",
        op::intl::EQV => "eqv",
        op::intl::AMASK => "amask",
        op::intl::CMOVLE => "cmovle",
        op::intl::CMOVGT => "cmovgt",
        op::intl::IMPLVER => "implver",
        _ => return None,
    })
}

fn ints_name(func: u32) -> Option<&'static str> {
    Some(match func {
        op::ints::MSKBL => "mskbl",
        op::ints::EXTBL => "extbl",
        op::ints::INSBL => "insbl",
        op::ints::MSKWL => "mskwl",
        op::ints::EXTWL => "extwl",
        op::ints::INSWL => "inswl",
        op::ints::MSKLL => "mskll",
        op::ints::EXTLL => "extll",
        op::ints::INSLL => "insll",
        op::ints::ZAP => "zap",
        op::ints::ZAPNOT => "zapnot",
        op::ints::MSKQL => "mskql",
        op::ints::SRL => "srl",
        op::ints::EXTQL => "extql",
        op::ints::SLL => "sll",
        op::ints::INSQL => "insql",
        op::ints::SRA => "sra",
        op::ints::MSKWH => "mskwh",
        op::ints::INSWH => "inswh",
        op::ints::EXTWH => "extwh",
        op::ints::MSKLH => "msklh",
        op::ints::INSLH => "inslh",
        op::ints::EXTLH => "extlh",
        op::ints::MSKQH => "mskqh",
        op::ints::INSQH => "insqh",
        op::ints::EXTQH => "extqh",
        _ => return None,
    })
}

fn intm_name(func: u32) -> Option<&'static str> {
    Some(match func {
        op::intm::MULL => "mull",
        op::intm::MULQ => "mulq",
        op::intm::UMULH => "umulh",
        op::intm::MULL_V => "mull/v",
        op::intm::MULQ_V => "mulq/v",
        _ => return None,
    })
}

fn memory_name(opcode: u32) -> Option<&'static str> {
    Some(match opcode {
        op::LDA => "lda",
        op::LDAH => "ldah",
        op::LDBU => "ldbu",
        op::LDQ_U => "ldq_u",
        op::LDWU => "ldwu",
        op::STW => "stw",
        op::STB => "stb",
        op::STQ_U => "stq_u",
        op::LDS => "lds",
        op::LDT => "ldt",
        op::STS => "sts",
        op::STT => "stt",
        op::LDL => "ldl",
        op::LDQ => "ldq",
        op::LDL_L => "ldl_l",
        op::LDQ_L => "ldq_l",
        op::STL => "stl",
        op::STQ => "stq",
        op::STL_C => "stl_c",
        op::STQ_C => "stq_c",
        _ => return None,
    })
}

fn branch_name(opcode: u32) -> Option<&'static str> {
    Some(match opcode {
        op::BR => "br",
        op::FBEQ => "fbeq",
        op::FBLT => "fblt",
        op::FBLE => "fble",
        op::BSR => "bsr",
        op::FBNE => "fbne",
        op::FBGE => "fbge",
        op::FBGT => "fbgt",
        op::BLBC => "blbc",
        op::BEQ => "beq",
        op::BLT => "blt",
        op::BLE => "ble",
        op::BLBS => "blbs",
        op::BNE => "bne",
        op::BGE => "bge",
        op::BGT => "bgt",
        _ => return None,
    })
}

fn operate(d: &Decoded, name: &str) -> String {
    if d.is_literal {
        format!("{} r{}, #{}, r{}", name, d.ra, d.literal, d.rc)
    } else {
        format!("{} r{}, r{}, r{}", name, d.ra, d.rb, d.rc)
    }
}

/// Disassembles a raw encoding fetched at `pc` into a short string.
pub fn disassemble(raw: u32, pc: u64) -> String {
    let d = decode(raw);
    match d.opcode {
        op::CALL_PAL => format!("call_pal {:#x}", d.pal_func),
        op::INTA => inta_name(d.func).map_or_else(|| unknown(raw), |n| operate(&d, n)),
        op::INTL => intl_name(d.func).map_or_else(|| unknown(raw), |n| operate(&d, n)),
        op::INTS => ints_name(d.func).map_or_else(|| unknown(raw), |n| operate(&d, n)),
        op::INTM => intm_name(d.func).map_or_else(|| unknown(raw), |n| operate(&d, n)),
        op::MISC => misc_str(&d).map_or_else(|| unknown(raw), str::to_owned),
        op::JSR => {
            let kind = match (d.raw >> 14) & 0x3 {
                op::jsr::JMP => "jmp",
                op::jsr::JSR => "jsr",
                op::jsr::RET => "ret",
                _ => "jsr_coroutine",
            };
            format!("{} r{}, (r{})", kind, d.ra, d.rb)
        }
        op::HW_REI => "hw_rei".to_owned(),
        op::HW_MFPR => format!("hw_mfpr r{}, ipr{}", d.ra, d.raw & 0xFFFF),
        op::HW_MTPR => format!("hw_mtpr r{}, ipr{}", d.ra, d.raw & 0xFFFF),
        op::HW_LD => format!("hw_ld r{}, {}(r{})", d.ra, d.mem_disp, d.rb),
        op::HW_ST => format!("hw_st r{}, {}(r{})", d.ra, d.mem_disp, d.rb),
        op::FLTI | op::FLTL | op::FLTV | op::ITFP => {
            format!(
                "fop.{:#05x} f{}, f{}, f{}",
                d.fp_func, d.ra, d.rb, d.rc
            )
        }
        op::FPTI => format!("iop.{:#04x} r{}, r{}, r{}", d.func, d.ra, d.rb, d.rc),
        _ => {
            if let Some(name) = memory_name(d.opcode) {
                format!("{} r{}, {}(r{})", name, d.ra, d.mem_disp, d.rb)
            } else if let Some(name) = branch_name(d.opcode) {
                format!("{} r{}, {:#x}", name, d.ra, d.branch_target(pc))
            } else {
                unknown(raw)
            }
        }
    }
}

fn misc_str(d: &Decoded) -> Option<&'static str> {
    Some(match (d.raw & 0xFFFF) as u32 {
        op::misc::TRAPB => "trapb",
        op::misc::EXCB => "excb",
        op::misc::MB => "mb",
        op::misc::WMB => "wmb",
        op::misc::FETCH => "fetch",
        op::misc::FETCH_M => "fetch_m",
        op::misc::RPCC => "rpcc",
        op::misc::RC => "rc",
        op::misc::RS => "rs",
        op::misc::ECB => "ecb",
        op::misc::WH64 => "wh64",
        _ => return None,
    })
}

fn unknown(raw: u32) -> String {
    format!(".word {raw:#010x}")
}
