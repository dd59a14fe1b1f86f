//! Defines the [`Cpu`] type, responsible for describing the state of the CPU.
//!
//! More information in the documentation for [`Cpu`].

use std::cmp::Ordering;
use std::fmt;

use bitflags::bitflags;

use crate::error::Error;

/// The number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// The index of the register reserved as the **Stack Pointer**.
pub const SP: u8 = 7;

/// The initial value of the **Stack Pointer**.
///
/// The stack grows downward from there, towards the program.
pub const STACK_START: u8 = 0xF4;

bitflags! {
    /// The flags register, written by `CMP` and read by the conditional jumps.
    ///
    /// After a comparison, exactly one of the flags is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        /// The compared values were equal.
        const EQUAL = 1 << 0;
        /// The first compared value was greater than the second.
        const GREATER = 1 << 1;
        /// The first compared value was less than the second.
        const LESS = 1 << 2;
    }
}

impl Flags {
    /// Returns the flags describing the result of a comparison.
    #[inline]
    pub const fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::LESS,
            Ordering::Equal => Self::EQUAL,
            Ordering::Greater => Self::GREATER,
        }
    }
}

/// The general-purpose register file of the CPU.
///
/// Every register holds a single byte. Register `R7` is the **Stack Pointer** and starts at
/// [`STACK_START`] rather than zero.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Registers([u8; REGISTER_COUNT]);

impl Default for Registers {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Creates a new register file in its power-on state.
    pub const fn new() -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = STACK_START;
        Self(regs)
    }

    /// Returns the value of the register at `index`.
    #[inline]
    pub fn get(&self, index: u8) -> Result<u8, Error> {
        self.0
            .get(index as usize)
            .copied()
            .ok_or(Error::InvalidRegister(index))
    }

    /// Sets the value of the register at `index`.
    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), Error> {
        let slot = self
            .0
            .get_mut(index as usize)
            .ok_or(Error::InvalidRegister(index))?;
        *slot = value;
        Ok(())
    }

    /// Returns the value of the **Stack Pointer**.
    #[inline(always)]
    pub const fn sp(&self) -> u8 {
        self.0[SP as usize]
    }

    /// Sets the value of the **Stack Pointer**.
    #[inline(always)]
    pub fn set_sp(&mut self, value: u8) {
        self.0[SP as usize] = value;
    }

    /// Returns the values of all registers, from `R0` to `R7`.
    #[inline(always)]
    pub const fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.0
    }
}

impl fmt::Debug for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Registers(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value:02X}")?;
        }
        f.write_str(")")
    }
}

/// The Central Processing Unit (CPU) responsible for executing LS-8 instructions.
///
/// By itself, a [`Cpu`] is not enough to execute a program. In order to do anything useful, it
/// has to be connected to a [`Memory`](crate::memory::Memory).
#[derive(Debug, Clone)]
pub struct Cpu {
    /// The Program Counter of the CPU, pointing to the opcode byte of the next instruction to be
    /// fetched from memory.
    ///
    /// # Invariants
    ///
    /// After each step, **PC** is the address of the previous instruction plus its size, unless
    /// the instruction explicitly repositioned it.
    pub pc: u8,
    /// The eight general-purpose registers, including the **Stack Pointer**.
    pub registers: Registers,
    /// The flags register, only ever written by `CMP`.
    pub flags: Flags,
}

impl Default for Cpu {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a new [`Cpu`] in its power-on state.
    pub const fn new() -> Self {
        Self {
            pc: 0,
            registers: Registers::new(),
            flags: Flags::empty(),
        }
    }
}
