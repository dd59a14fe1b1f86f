//! Defines the arithmetic/logic unit.
//!
//! The ALU is stateless: it is given the values of two registers and returns what should happen
//! to them. Writing the result back into the register file (or into the flags register, for
//! `CMP`) is the job of the caller.

use std::cmp::Ordering;

use crate::error::Error;
use crate::instr::AluOp;

/// The outcome of an ALU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluResult {
    /// The value must be written back into the first operand register.
    Write(u8),
    /// The operation was a comparison. No register is modified, but the flags register must be
    /// updated accordingly.
    Compare(Ordering),
}

/// Applies `op` to the values `a` and `b`.
///
/// Every arithmetic operation wraps around at 8 bits. Operations that only take one operand
/// (`INC`, `DEC` and `NOT`) ignore `b`.
///
/// # Errors
///
/// `DIV` and `MOD` fail with [`Error::DivideByZero`] when `b` is zero.
pub fn apply(op: AluOp, a: u8, b: u8) -> Result<AluResult, Error> {
    let value = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a.checked_div(b).ok_or(Error::DivideByZero)?,
        AluOp::Mod => a.checked_rem(b).ok_or(Error::DivideByZero)?,
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Not => !a,
        // Shifting every bit out leaves zero, rather than the shift amount being masked.
        AluOp::Shl => a.checked_shl(u32::from(b)).unwrap_or(0),
        AluOp::Shr => a.checked_shr(u32::from(b)).unwrap_or(0),
        AluOp::Cmp => return Ok(AluResult::Compare(a.cmp(&b))),
    };

    Ok(AluResult::Write(value))
}
