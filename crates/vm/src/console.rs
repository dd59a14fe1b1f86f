//! Defines the [`Console`] trait, the device `PRN` writes to.

use std::io::{self, Write};

/// An output device attached to the machine.
pub trait Console {
    /// Emits the value of a register, as printed by a `PRN` instruction.
    ///
    /// A failure is fatal to the machine executing the `PRN`.
    fn print(&mut self, value: u8) -> io::Result<()>;
}

/// A [`Console`] that prints every value in decimal on its own line of the standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&mut self, value: u8) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{value}")
    }
}

/// Collects printed values, in order.
impl Console for Vec<u8> {
    #[inline]
    fn print(&mut self, value: u8) -> io::Result<()> {
        self.push(value);
        Ok(())
    }
}
