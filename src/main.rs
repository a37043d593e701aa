use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use braid::{error, lex, Interpreter, StepStatus};
use braid::{DEFAULT_MEMORY_CELLS, PC_CELL, REMAINDER_CELL};

/// Braid is an assembler and interpreter for a tiny three-mode register machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a program to run with default settings
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a program and run it to completion
    Run {
        /// Program file to run
        name: PathBuf,
        /// Number of memory cells to allocate
        #[arg(short, long, default_value_t = DEFAULT_MEMORY_CELLS)]
        memory: usize,
        /// Stop after this many steps (runaway loop guard)
        #[arg(short, long)]
        limit: Option<u64>,
        /// Sleep between steps, in milliseconds
        #[arg(short, long)]
        tick: Option<u64>,
    },
    /// Assemble a program without running it
    Check {
        /// File to check
        name: PathBuf,
    },
}

fn main() -> Result<()> {
    use MsgColor::*;
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .context_lines(braid::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    match args.command {
        Some(Command::Run {
            name,
            memory,
            limit,
            tick,
        }) => run(&name, memory, limit, tick),
        Some(Command::Check { name }) => check(&name),
        None => match args.path {
            Some(path) => run(&path, DEFAULT_MEMORY_CELLS, None, None),
            None => {
                message(Cyan, "Braid", "an interpreter for a tiny register machine");
                message(Cyan, "Help", "try `braid run <file>` or `braid --help`");
                Ok(())
            }
        },
    }
}

fn run(name: &Path, memory: usize, limit: Option<u64>, tick: Option<u64>) -> Result<()> {
    use MsgColor::*;
    file_message(Green, "Assembling", name);
    let src = fs::read_to_string(name).into_diagnostic()?;
    let program = match lex(&src) {
        Ok(program) => program,
        Err(e) => return Err(error::lex_failure(src, &e)),
    };

    let mut vm = Interpreter::new(memory);
    vm.load_program(program);
    message(Green, "Running", "program loaded");

    let mut steps: u64 = 0;
    loop {
        if limit.is_some_and(|max| steps >= max) {
            message(Cyan, "Stopped", "step limit reached");
            break;
        }
        match vm.step() {
            StepStatus::Success => {}
            // Running off the end is how a program halts.
            StepStatus::PointerOutOfCode => {
                message(Green, "Halted", &format!("after {steps} steps"));
                break;
            }
            StepStatus::Error | StepStatus::UnknownInstruction => {
                dump_memory(&vm);
                let pc = vm.get_memory(PC_CELL as i64).unwrap_or(-1);
                return Err(error::exec_failure(src, pc));
            }
        }
        steps += 1;
        if let Some(ms) = tick {
            sleep(Duration::from_millis(ms));
        }
    }

    dump_memory(&vm);
    Ok(())
}

fn check(name: &Path) -> Result<()> {
    use MsgColor::*;
    file_message(Green, "Checking", name);
    let src = fs::read_to_string(name).into_diagnostic()?;
    match lex(&src) {
        Ok(program) => {
            message(
                Green,
                "Success",
                &format!("{} instructions, no errors found!", program.len()),
            );
            Ok(())
        }
        Err(e) => Err(error::lex_failure(src, &e)),
    }
}

/// Memory grid in the spirit of the usual front panel: cell 0 is the program
/// counter, cell 1 the remainder register.
fn dump_memory(vm: &Interpreter) {
    println!("\n------- Memory --------");
    for cell in 0..vm.memory_size() {
        let value = vm.get_memory(cell as i64).unwrap_or(0);
        let label = format!("[{cell:03}]");
        let label = match cell {
            PC_CELL => label.cyan(),
            REMAINDER_CELL => label.yellow(),
            _ => label.normal(),
        };
        println!("{label} {value:.>18}");
    }
    println!("-----------------------");
}

enum MsgColor {
    Green,
    Cyan,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
    };
    println!("{left:>12} {right}");
}
