//! Integer logical executors (opcode 0x11) and the extended integer group
//! (opcode 0x1C: sign extension, population counts, PERR, FP register moves).

use crate::common::error::Exception;
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::{fpti, intl};

/// AMASK value: BWX (bit 0) and CIX (bit 2) are implemented.
const AMASK_SUPPORTED: u64 = 0b101;

/// IMPLVER value: EV6-generation implementation.
const IMPLVER_VALUE: u64 = 2;

impl CpuCore {
    pub(crate) fn exec_logical(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let a = self.regs.read(d.ra);
        let b = self.rb_or_lit(d);

        let result = match d.func {
            intl::AND => a & b,
            intl::BIC => a & !b,
            intl::BIS => a | b,
            intl::ORNOT => a | !b,
            intl::XOR => a ^ b,
            intl::EQV => a ^ !b,
            intl::AMASK => b & !AMASK_SUPPORTED,
            intl::IMPLVER => IMPLVER_VALUE,

            // Conditional moves test Ra and transfer Rb; Rc is untouched
            // when the condition fails.
            intl::CMOVEQ => return self.cmov(d, a == 0, b),
            intl::CMOVNE => return self.cmov(d, a != 0, b),
            intl::CMOVLT => return self.cmov(d, (a as i64) < 0, b),
            intl::CMOVGE => return self.cmov(d, (a as i64) >= 0, b),
            intl::CMOVLE => return self.cmov(d, (a as i64) <= 0, b),
            intl::CMOVGT => return self.cmov(d, (a as i64) > 0, b),
            intl::CMOVLBS => return self.cmov(d, a & 1 != 0, b),
            intl::CMOVLBC => return self.cmov(d, a & 1 == 0, b),

            _ => return Err(self.illegal(d)),
        };

        self.regs.write(d.rc, result);
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }

    fn cmov(&mut self, d: &Decoded, cond: bool, val: u64) -> Result<Flow, Exception> {
        if cond {
            self.regs.write(d.rc, val);
        }
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }

    pub(crate) fn exec_extended(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        let b = self.rb_or_lit(d);

        let result = match d.func {
            fpti::SEXTB => b as u8 as i8 as i64 as u64,
            fpti::SEXTW => b as u16 as i16 as i64 as u64,
            fpti::CTPOP => u64::from(b.count_ones()),
            fpti::CTLZ => u64::from(b.leading_zeros()),
            fpti::CTTZ => u64::from(b.trailing_zeros()),
            fpti::PERR => perr(self.regs.read(d.ra), b),
            fpti::FTOIT => {
                self.check_fp_enabled()?;
                self.regs.read_f(d.ra)
            }
            fpti::FTOIS => {
                self.check_fp_enabled()?;
                let single = f64::from_bits(self.regs.read_f(d.ra)) as f32;
                single.to_bits() as i32 as i64 as u64
            }
            _ => return Err(self.illegal(d)),
        };

        self.regs.write(d.rc, result);
        self.stats.inst_alu += 1;
        Ok(Flow::Next)
    }
}

/// PERR: sum of absolute differences of the eight byte lanes.
fn perr(a: u64, b: u64) -> u64 {
    let mut sum = 0u64;
    for i in 0..8 {
        let ab = (a >> (i * 8)) & 0xFF;
        let bb = (b >> (i * 8)) & 0xFF;
        sum += ab.abs_diff(bb);
    }
    sum
}
