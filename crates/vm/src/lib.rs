//! # LS-8
//!
//! An emulator for the LS-8, a minimal 8-bit von Neumann computer.
//!
//! The machine has 256 bytes of memory, eight 8-bit general-purpose registers (`R7` doubling as
//! the **Stack Pointer**), a **Program Counter** and a flags register. It executes a small
//! instruction set through a fetch-decode-execute loop until it encounters a `HLT` instruction
//! or a fatal error.
//!
//! ```
//! use ls8_vm::{Ls8VM, Program, trace::NoopTrace};
//!
//! let mut vm = Ls8VM::with_program(&Program::default()).unwrap();
//! let mut printed: Vec<u8> = Vec::new();
//! vm.run(&mut printed, &mut NoopTrace).unwrap();
//! assert_eq!(printed, [8]);
//! ```

#![warn(missing_docs, missing_debug_implementations)]

use tracing::{debug, error, info};

use alu::AluResult;
use console::Console;
use cpu::{Cpu, Flags};
use error::Error;
use instr::{AluOp, Instruction, OpCode};
use memory::Memory;
use trace::Trace;

pub use program::{ImageError, Program};

pub mod alu;
pub mod console;
pub mod cpu;
pub mod error;
pub mod instr;
pub mod memory;
pub mod program;
pub mod trace;

/// The execution state of an [`Ls8VM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// The machine will execute the next instruction when stepped.
    Running,
    /// The machine executed a `HLT` instruction or encountered a fatal error. This state is
    /// terminal.
    Halted,
}

/// How the **Program Counter** must be updated once an instruction has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Move past the instruction by adding the provided size to the **Program Counter**.
    AdvanceBy(u8),
    /// The instruction repositioned the **Program Counter** to this address.
    Jump(u8),
    /// Stop the machine.
    Halt,
}

/// Contains the full state of an LS-8 machine.
///
/// # Components
///
/// The [`Ls8VM`] is composed of two main components:
///
/// - [`Cpu`]: The central processing unit of the machine, holding the registers, the
///   **Program Counter** and the flags.
///
/// - [`Memory`]: The memory associated with the machine. The program and the stack are both
///   stored here.
///
/// Every machine exclusively owns its state, so independent instances may run concurrently
/// without any synchronization.
#[derive(Debug, Clone)]
pub struct Ls8VM {
    /// The central processing unit of the machine.
    cpu: Cpu,
    /// The memory associated with the machine.
    memory: Memory,
    /// Whether the machine is still running.
    state: State,
    /// The number of instructions executed so far.
    steps: u64,
}

impl Default for Ls8VM {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Ls8VM {
    /// Creates a new [`Ls8VM`] with zero-filled memory, ready to execute from address `0`.
    pub const fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            memory: Memory::new(),
            state: State::Running,
            steps: 0,
        }
    }

    /// Creates a new [`Ls8VM`] with `program` loaded at address `0`.
    pub fn with_program(program: &Program) -> Result<Self, Error> {
        let mut vm = Self::new();
        vm.memory.load(program.as_bytes())?;
        Ok(vm)
    }

    /// Returns the current state of the [`Cpu`].
    #[inline(always)]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Returns the current state of the [`Cpu`], mutably.
    #[inline(always)]
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Returns the current state of the [`Memory`].
    #[inline(always)]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Returns the current state of the [`Memory`], mutably.
    #[inline(always)]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Returns the execution state of the machine.
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns whether the machine is halted.
    #[inline(always)]
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Returns the number of instructions executed so far.
    #[inline(always)]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advances the machine by a single instruction, printing to the provided [`Console`] and
    /// tracing events using the provided [`Trace`] implementation.
    ///
    /// # Errors
    ///
    /// Any error is fatal: the machine is halted before the error is returned, and the faulting
    /// instruction has no effect. Stepping a halted machine fails with [`Error::Halted`].
    pub fn step<C, T>(&mut self, console: &mut C, trace: &mut T) -> Result<State, Error>
    where
        C: ?Sized + Console,
        T: ?Sized + Trace,
    {
        if self.is_halted() {
            return Err(Error::Halted);
        }

        let pc = self.cpu.pc;
        let fetched = self.memory.fetch(pc);
        trace.instruction(pc, fetched, &self.cpu.registers);

        let instr = Instruction(fetched[0]);
        let operands = [fetched[1], fetched[2]];
        tracing::trace!(pc, instr = fetched[0], "executing instruction");

        let result = if instr.is_alu() {
            execute_alu(instr, operands, &mut self.cpu)
        } else {
            execute_instruction(instr, operands, &mut self.cpu, &mut self.memory, console)
        };

        let transition = match result {
            Ok(transition) => transition,
            Err(err) => {
                error!(pc, instr = fetched[0], %err, "fatal error, halting");
                self.state = State::Halted;
                return Err(err);
            }
        };

        debug_assert!(
            instr.sets_pc() || !matches!(transition, Transition::Jump(_)),
            "{instr:?} jumped without declaring it",
        );

        self.steps += 1;

        match transition {
            Transition::AdvanceBy(size) => self.cpu.pc = pc.wrapping_add(size),
            Transition::Jump(target) => self.cpu.pc = target,
            Transition::Halt => {
                info!(pc, steps = self.steps, "halted");
                self.state = State::Halted;
            }
        }

        Ok(self.state)
    }

    /// Runs the machine until it halts.
    ///
    /// A program that never executes `HLT` makes this function loop forever; see
    /// [`run_limited`](Self::run_limited) for a bounded alternative.
    pub fn run<C, T>(&mut self, console: &mut C, trace: &mut T) -> Result<(), Error>
    where
        C: ?Sized + Console,
        T: ?Sized + Trace,
    {
        while self.step(console, trace)? == State::Running {}
        Ok(())
    }

    /// Runs the machine until it halts, executing at most `max_steps` instructions.
    ///
    /// # Returns
    ///
    /// The number of instructions executed by this call.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::StepLimit`] if the machine is still running after `max_steps`
    /// instructions. In that case, the machine is left running and may be resumed. Like
    /// [`step`](Self::step), fails with [`Error::Halted`] if the machine is already halted.
    pub fn run_limited<C, T>(
        &mut self,
        console: &mut C,
        trace: &mut T,
        max_steps: u64,
    ) -> Result<u64, Error>
    where
        C: ?Sized + Console,
        T: ?Sized + Trace,
    {
        if self.is_halted() {
            return Err(Error::Halted);
        }

        let start = self.steps;
        while self.steps - start < max_steps {
            if self.step(console, trace)? == State::Halted {
                return Ok(self.steps - start);
            }
        }
        Err(Error::StepLimit(max_steps))
    }
}

/// Executes an ALU instruction.
///
/// ALU instructions only ever touch the register file and the flags; they never move the
/// **Program Counter** by themselves.
fn execute_alu(instr: Instruction, [a, b]: [u8; 2], cpu: &mut Cpu) -> Result<Transition, Error> {
    let op = AluOp::from_byte(instr.0).ok_or(Error::UnsupportedAluOperation(instr.0))?;

    let lhs = cpu.registers.get(a)?;
    // Single-operand operations ignore their second operand, which belongs to the next
    // instruction and need not name a register.
    let rhs = if instr.operand_count() == 2 {
        cpu.registers.get(b)?
    } else {
        0
    };

    match alu::apply(op, lhs, rhs)? {
        AluResult::Write(value) => cpu.registers.set(a, value)?,
        AluResult::Compare(ordering) => cpu.flags = Flags::from_ordering(ordering),
    }

    Ok(Transition::AdvanceBy(instr.size()))
}

/// Executes an instruction handled outside of the ALU.
fn execute_instruction<C>(
    instr: Instruction,
    [a, b]: [u8; 2],
    cpu: &mut Cpu,
    memory: &mut Memory,
    console: &mut C,
) -> Result<Transition, Error>
where
    C: ?Sized + Console,
{
    let op = OpCode::from_byte(instr.0).ok_or(Error::UnsupportedInstruction(instr.0))?;
    let next = Transition::AdvanceBy(instr.size());

    match op {
        OpCode::Hlt => return Ok(Transition::Halt),
        OpCode::Ldi => cpu.registers.set(a, b)?,
        OpCode::Ld => {
            let addr = cpu.registers.get(b)?;
            cpu.registers.set(a, memory.read(addr))?;
        }
        OpCode::St => {
            let addr = cpu.registers.get(a)?;
            memory.write(addr, cpu.registers.get(b)?);
        }
        OpCode::Prn => console
            .print(cpu.registers.get(a)?)
            .map_err(|err| Error::Console(err.kind()))?,
        OpCode::Push => {
            let value = cpu.registers.get(a)?;
            push(cpu, memory, value);
        }
        OpCode::Pop => {
            // Validate the register before touching the stack.
            cpu.registers.get(a)?;
            let value = pop(cpu, memory);
            cpu.registers.set(a, value)?;
        }
        OpCode::Call => {
            let target = cpu.registers.get(a)?;
            let ret = cpu.pc.wrapping_add(instr.size());
            push(cpu, memory, ret);
            debug!(from = cpu.pc, to = target, "call");
            return Ok(Transition::Jump(target));
        }
        OpCode::Ret => {
            let target = pop(cpu, memory);
            debug!(from = cpu.pc, to = target, "return");
            return Ok(Transition::Jump(target));
        }
        OpCode::Jmp
        | OpCode::Jeq
        | OpCode::Jne
        | OpCode::Jgt
        | OpCode::Jlt
        | OpCode::Jle
        | OpCode::Jge => {
            let target = cpu.registers.get(a)?;
            if jump_taken(op, cpu.flags) {
                debug!(from = cpu.pc, to = target, op = op.mnemonic(), "jump");
                return Ok(Transition::Jump(target));
            }
        }
    }

    Ok(next)
}

/// Returns whether the provided jump instruction is taken given the current flags.
///
/// # Panics
///
/// Panics if `op` is not a jump instruction.
fn jump_taken(op: OpCode, flags: Flags) -> bool {
    match op {
        OpCode::Jmp => true,
        OpCode::Jeq => flags.contains(Flags::EQUAL),
        OpCode::Jne => !flags.contains(Flags::EQUAL),
        OpCode::Jgt => flags.contains(Flags::GREATER),
        OpCode::Jlt => flags.contains(Flags::LESS),
        OpCode::Jle => flags.intersects(Flags::LESS | Flags::EQUAL),
        OpCode::Jge => flags.intersects(Flags::GREATER | Flags::EQUAL),
        OpCode::Hlt
        | OpCode::Ldi
        | OpCode::Ld
        | OpCode::St
        | OpCode::Prn
        | OpCode::Push
        | OpCode::Pop
        | OpCode::Call
        | OpCode::Ret => unreachable!("{} is not a jump", op.mnemonic()),
    }
}

/// Decrements the **Stack Pointer**, then writes `value` at its new location.
#[inline]
fn push(cpu: &mut Cpu, memory: &mut Memory, value: u8) {
    let sp = cpu.registers.sp().wrapping_sub(1);
    cpu.registers.set_sp(sp);
    memory.write(sp, value);
}

/// Reads the value at the **Stack Pointer**, then increments it.
///
/// There is no underflow guard: popping more than was pushed reads whatever lies above the
/// stack.
#[inline]
fn pop(cpu: &mut Cpu, memory: &Memory) -> u8 {
    let sp = cpu.registers.sp();
    cpu.registers.set_sp(sp.wrapping_add(1));
    memory.read(sp)
}
