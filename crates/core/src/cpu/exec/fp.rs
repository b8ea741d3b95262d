//! Floating-point executors (opcodes 0x14, 0x16, 0x17).
//!
//! IEEE S (single) and T (double) arithmetic with FPCR rounding modes and
//! sticky status flags. S values live in registers widened to T format, the
//! usual software convention. Exception flags are detected through the host
//! FPU environment; an exception whose FPCR trap enable is set is delivered
//! through the PAL path, otherwise the sticky flag records it and execution
//! continues.
//!
//! VAX F/G arithmetic (opcode 0x15) is outside the supported profile and
//! decodes as an illegal instruction.

use crate::arch::fpcr::RoundingMode;
use crate::common::error::{Exception, FpException};
use crate::cpu::{CpuCore, Flow};
use crate::isa::decode::Decoded;
use crate::isa::opcodes::{flti, fltl, itfp};

// Host FPU exception flag bits from <fenv.h> — used to detect inexact,
// overflow, underflow, divide-by-zero, and invalid. These are the POSIX
// standard values shared by x86_64 and aarch64 Linux.
const FE_INEXACT: i32 = 0x20;
const FE_UNDERFLOW: i32 = 0x10;
const FE_OVERFLOW: i32 = 0x08;
const FE_DIVBYZERO: i32 = 0x04;
const FE_INVALID: i32 = 0x01;
const FE_ALL_EXCEPT: i32 = FE_INEXACT | FE_UNDERFLOW | FE_OVERFLOW | FE_DIVBYZERO | FE_INVALID;

unsafe extern "C" {
    fn feclearexcept(excepts: i32) -> i32;
    fn fetestexcept(excepts: i32) -> i32;
}

/// Exceptions raised by one operation, in delivery priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FpFlagSet {
    invalid: bool,
    div_zero: bool,
    overflow: bool,
    underflow: bool,
    inexact: bool,
}

impl FpFlagSet {
    fn raised(self) -> impl Iterator<Item = FpException> {
        [
            self.invalid.then_some(FpException::Invalid),
            self.div_zero.then_some(FpException::DivByZero),
            self.overflow.then_some(FpException::Overflow),
            self.underflow.then_some(FpException::Underflow),
            self.inexact.then_some(FpException::Inexact),
        ]
        .into_iter()
        .flatten()
    }
}

fn clear_host_flags() {
    // SAFETY: feclearexcept only mutates the calling thread's FP environment.
    unsafe {
        let _ = feclearexcept(FE_ALL_EXCEPT);
    }
}

fn read_host_flags() -> FpFlagSet {
    // SAFETY: fetestexcept only reads the calling thread's FP environment.
    let host = unsafe { fetestexcept(FE_ALL_EXCEPT) };
    FpFlagSet {
        invalid: host & FE_INVALID != 0,
        div_zero: host & FE_DIVBYZERO != 0,
        overflow: host & FE_OVERFLOW != 0,
        underflow: host & FE_UNDERFLOW != 0,
        inexact: host & FE_INEXACT != 0,
    }
}

/// Rounds an exact f64 intermediate to f32 under the given mode.
///
/// The host cast rounds to nearest even; the directed modes adjust by one
/// ULP when the cast went the wrong way.
fn round_to_f32(exact: f64, rm: RoundingMode) -> f32 {
    if exact.is_nan() || exact.is_infinite() {
        return exact as f32;
    }
    let nearest = exact as f32;
    match rm {
        RoundingMode::Normal => nearest,
        RoundingMode::Chopped => {
            if (exact > 0.0 && f64::from(nearest) > exact)
                || (exact < 0.0 && f64::from(nearest) < exact)
            {
                f32::from_bits(nearest.to_bits().wrapping_sub(1))
            } else {
                nearest
            }
        }
        RoundingMode::MinusInfinity => {
            if f64::from(nearest) > exact {
                if nearest > 0.0 {
                    f32::from_bits(nearest.to_bits().wrapping_sub(1))
                } else {
                    f32::from_bits(nearest.to_bits() + 1)
                }
            } else {
                nearest
            }
        }
        RoundingMode::PlusInfinity => {
            if f64::from(nearest) < exact {
                if nearest >= 0.0 {
                    f32::from_bits(nearest.to_bits() + 1)
                } else {
                    f32::from_bits(nearest.to_bits().wrapping_sub(1))
                }
            } else {
                nearest
            }
        }
    }
}

/// Rounds a f64 value to an integral f64 under the given mode.
fn round_to_integral(val: f64, rm: RoundingMode) -> f64 {
    match rm {
        RoundingMode::Chopped => val.trunc(),
        RoundingMode::MinusInfinity => val.floor(),
        RoundingMode::PlusInfinity => val.ceil(),
        RoundingMode::Normal => {
            // Ties to even, which `round` does not provide directly.
            let floor = val.floor();
            let diff = val - floor;
            if diff > 0.5 {
                floor + 1.0
            } else if diff < 0.5 {
                floor
            } else if floor % 2.0 == 0.0 {
                floor
            } else {
                floor + 1.0
            }
        }
    }
}

/// FP compare results: true is 2.0, false is +0.0.
const CMP_TRUE: u64 = 0x4000_0000_0000_0000;

impl CpuCore {
    /// Raises an FP-disabled fault when the PS FEN bit is clear.
    pub(crate) fn check_fp_enabled(&self) -> Result<(), Exception> {
        if self.ps.fp_enabled() {
            Ok(())
        } else {
            Err(Exception::FpDisabled { pc: self.pc() })
        }
    }

    /// Resolves the instruction's rounding qualifier against the FPCR.
    fn rounding(&self, d: &Decoded) -> RoundingMode {
        match d.fp_rounding() {
            0 => RoundingMode::Chopped,
            1 => RoundingMode::MinusInfinity,
            2 => RoundingMode::Normal,
            _ => self.regs.fpcr().dynamic_rounding(),
        }
    }

    /// Records raised flags; delivers the highest-priority enabled trap.
    fn finish_fp(&mut self, flags: FpFlagSet) -> Result<(), Exception> {
        let mut deliver = None;
        for exc in flags.raised() {
            self.regs.fpcr_mut().set_status(exc);
            if deliver.is_none() && self.regs.fpcr().trap_enabled(exc) {
                deliver = Some(exc);
            }
        }
        match deliver {
            Some(exc) => Err(Exception::FloatingPoint(exc)),
            None => Ok(()),
        }
    }

    /// Integer-to-FP moves and square roots (opcode 0x14).
    pub(crate) fn exec_itfp(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.check_fp_enabled()?;
        let rm = self.rounding(d);

        let (result, flags) = match d.fp_op() {
            itfp::ITOFS => {
                let bits = self.regs.read(d.ra) as u32;
                (f64::from(f32::from_bits(bits)).to_bits(), FpFlagSet::default())
            }
            itfp::ITOFT => (self.regs.read(d.ra), FpFlagSet::default()),
            itfp::SQRTS => {
                let b = f64::from_bits(self.regs.read_f(d.rb));
                clear_host_flags();
                let exact = b.sqrt();
                let flags = read_host_flags();
                (f64::from(round_to_f32(exact, rm)).to_bits(), flags)
            }
            itfp::SQRTT => {
                let b = f64::from_bits(self.regs.read_f(d.rb));
                clear_host_flags();
                let result = b.sqrt();
                (result.to_bits(), read_host_flags())
            }
            _ => return Err(self.illegal(d)),
        };

        self.finish_fp(flags)?;
        self.regs.write_f(d.rc, result);
        self.stats.inst_fp += 1;
        Ok(Flow::Next)
    }

    /// IEEE arithmetic, compares, and conversions (opcode 0x16).
    pub(crate) fn exec_flti(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.check_fp_enabled()?;
        let rm = self.rounding(d);
        let fa = f64::from_bits(self.regs.read_f(d.ra));
        let fb = f64::from_bits(self.regs.read_f(d.rb));

        let (result, flags) = match d.fp_op() {
            // Single precision: compute in f64 for the extra bits, then
            // round once to S format.
            flti::ADDS => single_arith(fa, fb, rm, |x, y| x + y),
            flti::SUBS => single_arith(fa, fb, rm, |x, y| x - y),
            flti::MULS => single_arith(fa, fb, rm, |x, y| x * y),
            flti::DIVS => single_arith(fa, fb, rm, |x, y| x / y),

            // Double precision: host arithmetic rounds to nearest; the
            // directed modes are approximated by the host result.
            flti::ADDT => double_arith(fa, fb, |x, y| x + y),
            flti::SUBT => double_arith(fa, fb, |x, y| x - y),
            flti::MULT => double_arith(fa, fb, |x, y| x * y),
            flti::DIVT => double_arith(fa, fb, |x, y| x / y),

            flti::CMPTUN => (
                if fa.is_nan() || fb.is_nan() { CMP_TRUE } else { 0 },
                FpFlagSet::default(),
            ),
            flti::CMPTEQ => compare(fa, fb, fa == fb),
            flti::CMPTLT => compare(fa, fb, fa < fb),
            flti::CMPTLE => compare(fa, fb, fa <= fb),

            flti::CVTTS => {
                clear_host_flags();
                let rounded = round_to_f32(fb, rm);
                let mut flags = read_host_flags();
                flags.inexact |= f64::from(rounded) != fb && !fb.is_nan();
                (f64::from(rounded).to_bits(), flags)
            }
            flti::CVTTQ => convert_to_quad(fb, rm),
            flti::CVTQS => {
                let int = self.regs.read_f(d.rb) as i64;
                let exact = int as f64;
                let rounded = round_to_f32(exact, rm);
                let flags = FpFlagSet {
                    inexact: f64::from(rounded) != exact,
                    ..FpFlagSet::default()
                };
                (f64::from(rounded).to_bits(), flags)
            }
            flti::CVTQT => {
                let int = self.regs.read_f(d.rb) as i64;
                let result = int as f64;
                let flags = FpFlagSet {
                    inexact: result as i64 != int,
                    ..FpFlagSet::default()
                };
                (result.to_bits(), flags)
            }

            _ => return Err(self.illegal(d)),
        };

        self.finish_fp(flags)?;
        self.regs.write_f(d.rc, result);
        self.stats.inst_fp += 1;
        Ok(Flow::Next)
    }

    /// FP data movement: sign copies, FCMOV, FPCR access (opcode 0x17).
    pub(crate) fn exec_fltl(&mut self, d: &Decoded) -> Result<Flow, Exception> {
        self.check_fp_enabled()?;
        let a_raw = self.regs.read_f(d.ra);
        let b_raw = self.regs.read_f(d.rb);
        let fa = f64::from_bits(a_raw);

        const SIGN: u64 = 0x8000_0000_0000_0000;
        const EXP: u64 = 0x7FF0_0000_0000_0000;

        let result = match d.fp_func {
            fltl::CPYS => (a_raw & SIGN) | (b_raw & !SIGN),
            fltl::CPYSN => ((a_raw & SIGN) ^ SIGN) | (b_raw & !SIGN),
            fltl::CPYSE => (a_raw & (SIGN | EXP)) | (b_raw & !(SIGN | EXP)),

            fltl::MT_FPCR => {
                *self.regs.fpcr_mut() = crate::arch::fpcr::Fpcr::from_raw(a_raw);
                self.stats.inst_fp += 1;
                return Ok(Flow::Next);
            }
            fltl::MF_FPCR => self.regs.fpcr().raw(),

            // Register-file integer format conversions: the longword is the
            // sign-extended low half of the quadword.
            fltl::CVTLQ => b_raw as u32 as i32 as i64 as u64,
            fltl::CVTQL => b_raw & 0xFFFF_FFFF,

            fltl::FCMOVEQ => return self.fcmov(d, fa == 0.0, b_raw),
            fltl::FCMOVNE => return self.fcmov(d, fa != 0.0, b_raw),
            fltl::FCMOVLT => return self.fcmov(d, fa < 0.0, b_raw),
            fltl::FCMOVGE => return self.fcmov(d, fa >= 0.0, b_raw),
            fltl::FCMOVLE => return self.fcmov(d, fa <= 0.0, b_raw),
            fltl::FCMOVGT => return self.fcmov(d, fa > 0.0, b_raw),

            _ => return Err(self.illegal(d)),
        };

        self.regs.write_f(d.rc, result);
        self.stats.inst_fp += 1;
        Ok(Flow::Next)
    }

    fn fcmov(&mut self, d: &Decoded, cond: bool, val: u64) -> Result<Flow, Exception> {
        if cond {
            self.regs.write_f(d.rc, val);
        }
        self.stats.inst_fp += 1;
        Ok(Flow::Next)
    }
}

fn single_arith(fa: f64, fb: f64, rm: RoundingMode, op: impl Fn(f64, f64) -> f64) -> (u64, FpFlagSet) {
    let a = fa as f32;
    let b = fb as f32;
    clear_host_flags();
    let exact = op(f64::from(a), f64::from(b));
    let mut flags = read_host_flags();
    let rounded = round_to_f32(exact, rm);
    if !exact.is_nan() && f64::from(rounded) != exact {
        flags.inexact = true;
    }
    if rounded.is_infinite() && exact.is_finite() {
        flags.overflow = true;
        flags.inexact = true;
    }
    (f64::from(rounded).to_bits(), flags)
}

fn double_arith(fa: f64, fb: f64, op: impl Fn(f64, f64) -> f64) -> (u64, FpFlagSet) {
    clear_host_flags();
    let result = op(fa, fb);
    (result.to_bits(), read_host_flags())
}

fn compare(fa: f64, fb: f64, cond: bool) -> (u64, FpFlagSet) {
    let flags = FpFlagSet {
        invalid: fa.is_nan() || fb.is_nan(),
        ..FpFlagSet::default()
    };
    (if cond { CMP_TRUE } else { 0 }, flags)
}

fn convert_to_quad(fb: f64, rm: RoundingMode) -> (u64, FpFlagSet) {
    if fb.is_nan() || fb.is_infinite() {
        return (
            0,
            FpFlagSet {
                invalid: true,
                ..FpFlagSet::default()
            },
        );
    }
    let rounded = round_to_integral(fb, rm);
    let mut flags = FpFlagSet::default();
    if rounded != fb {
        flags.inexact = true;
    }
    // Out-of-range conversions truncate like the hardware's integer
    // overflow behavior and record invalid.
    if rounded >= 9_223_372_036_854_775_808.0 || rounded < -9_223_372_036_854_775_808.0 {
        flags.invalid = true;
    }
    (rounded as i64 as u64, flags)
}
