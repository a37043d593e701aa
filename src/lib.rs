// Assembling
mod lexer;
pub use lexer::{lex, LexError, LexErrorKind};
mod ops;
pub use ops::{AddrMode, Instruction, Operand, Operator};

// Running
mod runtime;
pub use runtime::{Interpreter, StepStatus, PC_CELL, REMAINDER_CELL};

pub mod error;

/// Memory cells allocated when the caller does not ask for a size.
pub const DEFAULT_MEMORY_CELLS: usize = 16;

/// Amount of lines to show as context around a diagnostic's focus line.
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;
