//! Defines the [`Trace`] trait, used to gather information about the execution of an LS-8
//! program within the virtual machine.

use std::io;

use crate::cpu::Registers;

/// A collection of callbacks to be called during the execution of an LS-8 program.
#[allow(unused_variables)]
pub trait Trace {
    /// Called once per step, after the instruction has been fetched and before it is executed.
    ///
    /// `fetched` holds the instruction byte followed by the two bytes after it, whether or not
    /// the instruction actually uses them as operands.
    fn instruction(&mut self, pc: u8, fetched: [u8; 3], registers: &Registers) {}
}

/// An implementation of [`Trace`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;
impl Trace for NoopTrace {}

/// An implementation of [`Trace`] that writes one line of hexadecimal per executed instruction.
///
/// Each line looks like this:
///
/// ```text
/// TRACE: 03 | 47 00 01 | 08 00 00 00 00 00 00 F4
/// ```
///
/// That is, the **Program Counter**, the three fetched bytes and the registers `R0` to `R7`.
#[derive(Debug)]
pub struct HexTrace<W> {
    out: W,
}

impl<W: io::Write> HexTrace<W> {
    /// Creates a new [`HexTrace`] writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: io::Write> Trace for HexTrace<W> {
    fn instruction(&mut self, pc: u8, fetched: [u8; 3], registers: &Registers) {
        let [ir, a, b] = fetched;
        let r = registers.as_array();

        // Trace output is diagnostic only, a failing writer must not stop the machine.
        let _ = writeln!(
            self.out,
            "TRACE: {pc:02X} | {ir:02X} {a:02X} {b:02X} | \
             {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X}",
            r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7],
        );
    }
}
