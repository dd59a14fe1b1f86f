//! Defines the [`Memory`] type, responsible for representing the memory of an LS-8 machine.
//!
//! # Layout
//!
//! The memory is a flat array of 256 bytes, addressed by a single byte. Programs are loaded at
//! address `0`, while the stack lives at the high end of memory and grows downward from
//! [`STACK_START`](crate::cpu::STACK_START).
//!
//! Because addresses are bytes, every address is in range and memory accesses can never fail.

use std::fmt;

use crate::error::Error;

/// The number of cells in the memory.
pub const MEMORY_SIZE: usize = 256;

/// Represents the memory of an LS-8 machine.
///
/// More information on memory can be found in [module-level documentation](self).
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    /// The memory cells, zero-filled on creation.
    cells: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Creates a new zero-filled [`Memory`].
    pub const fn new() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }

    /// Reads the memory cell at `addr`.
    #[inline(always)]
    pub const fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    /// Writes `value` to the memory cell at `addr`.
    #[inline(always)]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Reads the instruction byte at `addr` along with the two bytes following it.
    ///
    /// All three bytes are always read, regardless of how many operands the instruction
    /// actually has. Addresses past the end of memory wrap around to `0`.
    #[inline]
    pub const fn fetch(&self, addr: u8) -> [u8; 3] {
        [
            self.read(addr),
            self.read(addr.wrapping_add(1)),
            self.read(addr.wrapping_add(2)),
        ]
    }

    /// Copies `program` into memory, starting at address `0`.
    ///
    /// Cells past the end of the program are left untouched.
    pub fn load(&mut self, program: &[u8]) -> Result<(), Error> {
        let dst = self
            .cells
            .get_mut(..program.len())
            .ok_or(Error::ProgramTooLarge(program.len()))?;
        dst.copy_from_slice(program);
        Ok(())
    }

    /// Returns the content of the whole memory.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.cells.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Memory")
            .field("non_zero_cells", &used)
            .finish_non_exhaustive()
    }
}
