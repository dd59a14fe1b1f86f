//! Command line runner for LS-8 program images.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ls8_vm::console::StdoutConsole;
use ls8_vm::trace::{HexTrace, NoopTrace, Trace};
use ls8_vm::{Ls8VM, Program};
use tracing::{info, Level};

/// Runs an LS-8 program image until it halts.
#[derive(Debug, Parser)]
#[command(name = "ls8", version, about)]
struct Cli {
    /// The program image to run. The built-in `print8` program is used when omitted or when the
    /// file cannot be read.
    program: Option<PathBuf>,

    /// Write a line of hexadecimal CPU state to stderr before each instruction.
    #[arg(long)]
    trace: bool,

    /// Stop with an error if the program has not halted after this many instructions.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let program = match &cli.program {
        Some(path) => Program::load_or_default(path)
            .with_context(|| format!("cannot load `{}`", path.display()))?,
        None => {
            info!("no program given, using the default program");
            Program::default()
        }
    };

    let mut vm = Ls8VM::with_program(&program)?;
    let mut trace: Box<dyn Trace> = if cli.trace {
        Box::new(HexTrace::new(io::stderr()))
    } else {
        Box::new(NoopTrace)
    };

    match cli.max_steps {
        Some(max_steps) => {
            vm.run_limited(&mut StdoutConsole, trace.as_mut(), max_steps)?;
        }
        None => vm.run(&mut StdoutConsole, trace.as_mut())?,
    }

    info!(steps = vm.steps(), "program halted");
    Ok(())
}

fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_writer(io::stderr)
        .with_max_level(level)
        .try_init();
}
