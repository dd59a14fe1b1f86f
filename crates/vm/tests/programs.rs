//! End-to-end tests running whole programs on the machine.

use std::io;
use std::path::PathBuf;

use ls8_vm::console::Console;
use ls8_vm::cpu::{Flags, STACK_START};
use ls8_vm::error::Error;
use ls8_vm::instr::{AluOp, OpCode};
use ls8_vm::trace::{HexTrace, NoopTrace};
use ls8_vm::{Ls8VM, Program, State};

const LDI: u8 = OpCode::Ldi as u8;
const PRN: u8 = OpCode::Prn as u8;
const HLT: u8 = OpCode::Hlt as u8;
const PUSH: u8 = OpCode::Push as u8;
const POP: u8 = OpCode::Pop as u8;
const CALL: u8 = OpCode::Call as u8;
const RET: u8 = OpCode::Ret as u8;
const JEQ: u8 = OpCode::Jeq as u8;
const JNE: u8 = OpCode::Jne as u8;
const JGT: u8 = OpCode::Jgt as u8;
const JLT: u8 = OpCode::Jlt as u8;
const JLE: u8 = OpCode::Jle as u8;
const JGE: u8 = OpCode::Jge as u8;
const ADD: u8 = AluOp::Add as u8;
const DIV: u8 = AluOp::Div as u8;
const CMP: u8 = AluOp::Cmp as u8;

fn machine(bytes: &[u8]) -> Ls8VM {
    let program = Program::from_bytes(bytes.to_vec()).unwrap();
    Ls8VM::with_program(&program).unwrap()
}

/// Runs `bytes` to completion, returning the printed values.
fn run(bytes: &[u8]) -> (Ls8VM, Result<u64, Error>, Vec<u8>) {
    let mut vm = machine(bytes);
    let mut printed: Vec<u8> = Vec::new();
    let result = vm.run_limited(&mut printed, &mut NoopTrace, 1_000);
    (vm, result, printed)
}

fn demo(name: &str) -> Program {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "..", "..", "demos", name]
        .iter()
        .collect();
    Program::from_file(path).unwrap()
}

#[test]
#[rustfmt::skip]
fn print_eight() {
    let (vm, result, printed) = run(&[
        LDI, 0, 8,
        PRN, 0,
        HLT,
    ]);
    assert_eq!(result, Ok(3));
    assert_eq!(printed, [8]);
    assert_eq!(vm.state(), State::Halted);
}

#[test]
#[rustfmt::skip]
fn add_two_registers() {
    let (_, result, printed) = run(&[
        LDI, 0, 5,
        LDI, 1, 3,
        ADD, 0, 1,
        PRN, 0,
        HLT,
    ]);
    assert_eq!(result, Ok(5));
    assert_eq!(printed, [8]);
}

#[test]
#[rustfmt::skip]
fn add_wraps_around() {
    let (_, result, printed) = run(&[
        LDI, 0, 200,
        LDI, 1, 100,
        ADD, 0, 1,
        PRN, 0,
        HLT,
    ]);
    assert!(result.is_ok());
    assert_eq!(printed, [44]);
}

#[test]
#[rustfmt::skip]
fn divide_by_zero_is_fatal() {
    let (vm, result, printed) = run(&[
        LDI, 0, 9,
        LDI, 1, 0,
        DIV, 0, 1,
        PRN, 0,
        HLT,
    ]);
    assert_eq!(result, Err(Error::DivideByZero));
    assert!(vm.is_halted());
    assert!(printed.is_empty());
    assert_eq!(vm.cpu().registers.get(0), Ok(9));
    assert_eq!(vm.cpu().pc, 6);
    assert_eq!(vm.steps(), 2);
}

#[test]
#[rustfmt::skip]
fn call_returns_after_call_site() {
    let mut vm = machine(&[
        LDI, 1, 10,  // 0
        CALL, 1,     // 3
        PRN, 0,      // 5
        HLT,         // 7
        0, 0,        // 8
        LDI, 0, 42,  // 10
        PUSH, 0,     // 13
        POP, 0,      // 15
        RET,         // 17
    ]);
    let mut printed: Vec<u8> = Vec::new();

    vm.step(&mut printed, &mut NoopTrace).unwrap();
    let sp_before_call = vm.cpu().registers.sp();
    assert_eq!(sp_before_call, STACK_START);

    vm.step(&mut printed, &mut NoopTrace).unwrap();
    assert_eq!(vm.cpu().pc, 10);
    assert_eq!(vm.cpu().registers.sp(), STACK_START - 1);
    assert_eq!(vm.memory().read(STACK_START - 1), 5);

    for _ in 0..4 {
        vm.step(&mut printed, &mut NoopTrace).unwrap();
    }
    assert_eq!(vm.cpu().pc, 5);
    assert_eq!(vm.cpu().registers.sp(), sp_before_call);

    vm.run(&mut printed, &mut NoopTrace).unwrap();
    assert_eq!(printed, [42]);
}

#[test]
#[rustfmt::skip]
fn jeq_taken_on_equal_values() {
    let (vm, result, printed) = run(&[
        LDI, 0, 5,   // 0
        LDI, 1, 5,   // 3
        LDI, 2, 16,  // 6
        CMP, 0, 1,   // 9
        JEQ, 2,      // 12
        HLT,         // 14
        HLT,         // 15
        PRN, 0,      // 16
        HLT,         // 18
    ]);
    assert!(result.is_ok());
    assert_eq!(printed, [5]);
    assert_eq!(vm.cpu().flags, Flags::EQUAL);
    assert_eq!(vm.cpu().pc, 18);
}

#[test]
#[rustfmt::skip]
fn jeq_not_taken_on_different_values() {
    let (vm, result, printed) = run(&[
        LDI, 0, 5,
        LDI, 1, 6,
        LDI, 2, 16,
        CMP, 0, 1,
        JEQ, 2,
        HLT,
    ]);
    assert_eq!(result, Ok(6));
    assert!(printed.is_empty());
    assert_eq!(vm.cpu().flags, Flags::LESS);
    assert_eq!(vm.cpu().pc, 14);
}

#[test]
#[rustfmt::skip]
fn conditional_jumps_through_the_loop() {
    // (jump, a, b, flags after `CMP a,b`, taken)
    let cases = [
        (JNE, 5, 5, Flags::EQUAL, false),
        (JNE, 5, 6, Flags::LESS, true),
        (JGT, 3, 5, Flags::LESS, false),
        (JGT, 5, 5, Flags::EQUAL, false),
        (JGT, 6, 5, Flags::GREATER, true),
        (JLT, 5, 3, Flags::GREATER, false),
        (JLT, 5, 5, Flags::EQUAL, false),
        (JLT, 3, 5, Flags::LESS, true),
        (JLE, 5, 3, Flags::GREATER, false),
        (JLE, 5, 5, Flags::EQUAL, true),
        (JGE, 3, 5, Flags::LESS, false),
        (JGE, 5, 5, Flags::EQUAL, true),
    ];

    for (jump, a, b, flags, taken) in cases {
        let (vm, result, printed) = run(&[
            LDI, 0, a,      // 0
            LDI, 1, b,      // 3
            LDI, 2, 24,     // 6
            CMP, 0, 1,      // 9
            ADD, 3, 4,      // 12
            jump, 2,        // 15
            HLT,            // 17
            0, 0, 0, 0, 0, 0,
            PRN, 0,         // 24
            HLT,            // 26
        ]);
        let name = format!("{jump:#010b} after CMP {a},{b}");

        assert_eq!(vm.cpu().flags, flags, "{name}");
        assert!(vm.is_halted(), "{name}");
        assert_eq!(result, Ok(if taken { 8 } else { 7 }), "{name}");
        if taken {
            assert_eq!(printed, [a], "{name}");
            assert_eq!(vm.cpu().pc, 26, "{name}");
        } else {
            assert!(printed.is_empty(), "{name}");
            assert_eq!(vm.cpu().pc, 17, "{name}");
        }
    }
}

#[test]
fn unbalanced_return_corrupts_pc() {
    let mut vm = machine(&[RET]);
    let mut printed: Vec<u8> = Vec::new();

    // The empty stack above 0xF4 is zeroed, so every return lands back on the `RET` at 0.
    for popped in 1..=12u8 {
        vm.step(&mut printed, &mut NoopTrace).unwrap();
        assert_eq!(vm.cpu().pc, 0);
        assert_eq!(vm.cpu().registers.sp(), STACK_START.wrapping_add(popped));
    }
    assert_eq!(vm.cpu().registers.sp(), 0);

    // Once SP wraps around, the next return pops the `RET` opcode itself as an address.
    vm.step(&mut printed, &mut NoopTrace).unwrap();
    assert_eq!(vm.cpu().pc, RET);
    assert_eq!(vm.cpu().registers.sp(), 1);

    assert_eq!(
        vm.step(&mut printed, &mut NoopTrace),
        Err(Error::UnsupportedInstruction(0))
    );
    assert!(vm.is_halted());
    assert_eq!(vm.steps(), 13);
    assert_eq!(vm.cpu().pc, RET);
}

/// A console whose output has been closed, like a pipe whose reader exited.
struct ClosedConsole;

impl Console for ClosedConsole {
    fn print(&mut self, _: u8) -> io::Result<()> {
        Err(io::ErrorKind::BrokenPipe.into())
    }
}

#[test]
#[rustfmt::skip]
fn console_failure_is_fatal() {
    let mut vm = machine(&[
        LDI, 0, 8,
        PRN, 0,
        PRN, 0,
        HLT,
    ]);
    let result = vm.run(&mut ClosedConsole, &mut NoopTrace);
    assert_eq!(result, Err(Error::Console(io::ErrorKind::BrokenPipe)));
    assert!(vm.is_halted());
    assert_eq!(vm.cpu().pc, 3);
    assert_eq!(vm.steps(), 1);
}

#[test]
fn trace_lines() {
    let mut vm = Ls8VM::with_program(&Program::default()).unwrap();
    let mut trace = HexTrace::new(Vec::new());
    vm.run(&mut Vec::<u8>::new(), &mut trace).unwrap();

    let out = String::from_utf8(trace.into_inner()).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(
        lines,
        [
            "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4",
            "TRACE: 03 | 47 00 01 | 08 00 00 00 00 00 00 F4",
            "TRACE: 05 | 01 00 00 | 08 00 00 00 00 00 00 F4",
        ]
    );
}

#[test]
fn independent_machines_in_parallel() {
    let handles: Vec<_> = (0..4u8)
        .map(|n| {
            std::thread::spawn(move || {
                let (_, result, printed) = run(&[LDI, 0, n, PRN, 0, HLT]);
                result.unwrap();
                printed
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), [n as u8]);
    }
}

#[test]
fn demo_programs() {
    let cases: [(&str, &[u8]); 5] = [
        ("print8.ls8", &[8]),
        ("mult.ls8", &[72]),
        ("stack.ls8", &[2, 4, 1]),
        ("call.ls8", &[20, 30, 36]),
        ("countdown.ls8", &[5, 4, 3, 2, 1]),
    ];

    for (name, expected) in cases {
        let mut vm = Ls8VM::with_program(&demo(name)).unwrap();
        let mut printed: Vec<u8> = Vec::new();
        vm.run_limited(&mut printed, &mut NoopTrace, 1_000)
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        assert_eq!(printed, expected, "{name}");
        assert_eq!(vm.cpu().registers.sp(), STACK_START, "{name}");
    }
}
