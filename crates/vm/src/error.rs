//! Defines the [`Error`] type of the crate.

use thiserror::Error;

/// An error that might occur when executing an LS-8 program.
///
/// Every one of these errors is fatal: the machine that produced it is halted and will refuse
/// to execute further instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The instruction byte referenced by the **Program Counter** is not bound to any
    /// instruction handler.
    ///
    /// This usually means that the program is malformed, or that it is using one of the reserved
    /// interrupt instructions.
    #[error("unsupported instruction {0:#010b}")]
    UnsupportedInstruction(u8),
    /// The instruction byte has its ALU bit set, but the ALU does not know about the operation.
    #[error("unsupported ALU operation {0:#010b}")]
    UnsupportedAluOperation(u8),
    /// A `DIV` or `MOD` instruction was executed with a zero divisor.
    #[error("cannot divide by zero")]
    DivideByZero,
    /// An operand that should have named a register was outside of `R0..=R7`.
    #[error("register R{0} does not exist")]
    InvalidRegister(u8),
    /// Attempted to load a program image that does not fit in memory.
    #[error("program of {0} bytes does not fit in memory")]
    ProgramTooLarge(usize),
    /// The [`Console`](crate::console::Console) failed to emit the value of a `PRN`
    /// instruction.
    #[error("cannot write to the console: {0}")]
    Console(std::io::ErrorKind),

    /// The machine has already been halted, either by a `HLT` instruction or by a previous
    /// fatal error.
    #[error("the machine is halted")]
    Halted,
    /// A bounded run executed its whole budget of instructions without halting.
    #[error("no halt after {0} instructions")]
    StepLimit(u64),
}
