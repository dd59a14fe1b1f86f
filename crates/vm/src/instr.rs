//! Defines the [`Instruction`] type, responsible for representing a single LS-8 instruction
//! byte, as well as the opcodes it may be bound to.
//!
//! # Layout
//!
//! Every instruction byte follows the `AABCDDDD` layout:
//!
//! - `AA`: the number of operand bytes following the instruction (0 to 2).
//! - `B`: whether the instruction is handled by the ALU.
//! - `C`: whether the instruction repositions the **Program Counter** itself.
//! - `DDDD`: the identifier of the instruction within its class.

use std::fmt;

/// A single LS-8 instruction byte.
///
/// Decoding never fails: every byte has *some* fields, even though the resulting instruction
/// might not be bound to any handler. That is only discovered when dispatching it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction(pub u8);

impl Instruction {
    /// Returns the number of operand bytes following the instruction.
    #[inline(always)]
    pub const fn operand_count(self) -> u8 {
        (self.0 >> 6) & 0b11
    }

    /// Returns whether the instruction is an ALU operation.
    #[inline(always)]
    pub const fn is_alu(self) -> bool {
        self.0 & 0b0010_0000 != 0
    }

    /// Returns whether the instruction sets the **Program Counter** itself, in which case the
    /// execution loop must not advance it.
    #[inline(always)]
    pub const fn sets_pc(self) -> bool {
        self.0 & 0b0001_0000 != 0
    }

    /// Returns the identifier of the instruction within its class.
    #[inline(always)]
    pub const fn id(self) -> u8 {
        self.0 & 0b1111
    }

    /// Returns the size of the instruction in memory cells, including its operands.
    #[inline(always)]
    pub const fn size(self) -> u8 {
        1 + self.operand_count()
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("byte", &format_args!("{:#010b}", self.0))
            .field("operand_count", &self.operand_count())
            .field("is_alu", &self.is_alu())
            .field("sets_pc", &self.sets_pc())
            .field("id", &self.id())
            .finish()
    }
}

/// An instruction handled outside of the ALU.
///
/// The discriminant of each variant is the full instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Halts the machine.
    Hlt = 0b0000_0001,
    /// Sets a register to an immediate value.
    Ldi = 0b1000_0010,
    /// Loads a register with the memory cell addressed by another register.
    Ld = 0b1000_0011,
    /// Stores a register into the memory cell addressed by another register.
    St = 0b1000_0100,
    /// Prints the decimal value of a register.
    Prn = 0b0100_0111,
    /// Pushes a register onto the stack.
    Push = 0b0100_0101,
    /// Pops the top of the stack into a register.
    Pop = 0b0100_0110,
    /// Calls the subroutine whose address is held in a register.
    Call = 0b0101_0000,
    /// Returns from a subroutine.
    Ret = 0b0001_0001,
    /// Unconditionally jumps to the address held in a register.
    Jmp = 0b0101_0100,
    /// Jumps if the **Equal** flag is set.
    Jeq = 0b0101_0101,
    /// Jumps if the **Equal** flag is clear.
    Jne = 0b0101_0110,
    /// Jumps if the **Greater** flag is set.
    Jgt = 0b0101_0111,
    /// Jumps if the **Less** flag is set.
    Jlt = 0b0101_1000,
    /// Jumps if the **Less** or the **Equal** flag is set.
    Jle = 0b0101_1001,
    /// Jumps if the **Greater** or the **Equal** flag is set.
    Jge = 0b0101_1010,
}

impl OpCode {
    /// Returns the [`OpCode`] bound to the provided instruction byte, if any.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0b0000_0001 => Self::Hlt,
            0b1000_0010 => Self::Ldi,
            0b1000_0011 => Self::Ld,
            0b1000_0100 => Self::St,
            0b0100_0111 => Self::Prn,
            0b0100_0101 => Self::Push,
            0b0100_0110 => Self::Pop,
            0b0101_0000 => Self::Call,
            0b0001_0001 => Self::Ret,
            0b0101_0100 => Self::Jmp,
            0b0101_0101 => Self::Jeq,
            0b0101_0110 => Self::Jne,
            0b0101_0111 => Self::Jgt,
            0b0101_1000 => Self::Jlt,
            0b0101_1001 => Self::Jle,
            0b0101_1010 => Self::Jge,
            _ => return None,
        })
    }

    /// Returns the mnemonic of the opcode.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Hlt => "HLT",
            Self::Ldi => "LDI",
            Self::Ld => "LD",
            Self::St => "ST",
            Self::Prn => "PRN",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Call => "CALL",
            Self::Ret => "RET",
            Self::Jmp => "JMP",
            Self::Jeq => "JEQ",
            Self::Jne => "JNE",
            Self::Jgt => "JGT",
            Self::Jlt => "JLT",
            Self::Jle => "JLE",
            Self::Jge => "JGE",
        }
    }
}

/// An operation performed by the ALU.
///
/// The discriminant of each variant is the full instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AluOp {
    /// `a = a + b`
    Add = 0b1010_0000,
    /// `a = a - b`
    Sub = 0b1010_0001,
    /// `a = a * b`
    Mul = 0b1010_0010,
    /// `a = a / b`
    Div = 0b1010_0011,
    /// `a = a % b`
    Mod = 0b1010_0100,
    /// `a = a + 1`
    Inc = 0b0110_0101,
    /// `a = a - 1`
    Dec = 0b0110_0110,
    /// Compares `a` with `b`, updating the flags register.
    Cmp = 0b1010_0111,
    /// `a = a & b`
    And = 0b1010_1000,
    /// `a = !a`
    Not = 0b0110_1001,
    /// `a = a | b`
    Or = 0b1010_1010,
    /// `a = a ^ b`
    Xor = 0b1010_1011,
    /// `a = a << b`
    Shl = 0b1010_1100,
    /// `a = a >> b`
    Shr = 0b1010_1101,
}

impl AluOp {
    /// Returns the [`AluOp`] bound to the provided instruction byte, if any.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0b1010_0000 => Self::Add,
            0b1010_0001 => Self::Sub,
            0b1010_0010 => Self::Mul,
            0b1010_0011 => Self::Div,
            0b1010_0100 => Self::Mod,
            0b0110_0101 => Self::Inc,
            0b0110_0110 => Self::Dec,
            0b1010_0111 => Self::Cmp,
            0b1010_1000 => Self::And,
            0b0110_1001 => Self::Not,
            0b1010_1010 => Self::Or,
            0b1010_1011 => Self::Xor,
            0b1010_1100 => Self::Shl,
            0b1010_1101 => Self::Shr,
            _ => return None,
        })
    }
}
