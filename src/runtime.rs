use std::cmp::Ordering;

use crate::ops::{AddrMode, Instruction, Operand, Operator};

/// The program counter lives in cell 0.
pub const PC_CELL: usize = 0;
/// Division writes the fractional digits of its quotient to cell 1.
pub const REMAINDER_CELL: usize = 1;

/// Outcome of executing a single instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepStatus {
    Success,
    /// Malformed or semantically invalid instruction: bad operand
    /// resolution, division by zero, missing jump target.
    Error,
    /// PC points outside the loaded program. This is also how a program
    /// signals normal termination, so drivers stop their run loop on it.
    PointerOutOfCode,
    /// Declared for parity with the status set; dispatch never produces it.
    UnknownInstruction,
}

/// Tri-state flag set by `CMP` and consumed by the conditional jumps.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Comparison {
    Equal,
    Greater,
    Less,
}

/// The virtual machine: a fixed-size memory array, an optionally loaded
/// program and the comparison flag. Memory is allocated once and never
/// resized; cells are mutated in place for the machine's entire lifetime.
pub struct Interpreter {
    mem: Vec<i64>,
    program: Option<Vec<Instruction>>,
    flag: Comparison,
}

impl Interpreter {
    /// A machine with `memory_size` zeroed cells and no program loaded.
    pub fn new(memory_size: usize) -> Self {
        Interpreter {
            mem: vec![0; memory_size],
            program: None,
            flag: Comparison::Equal,
        }
    }

    pub fn memory_size(&self) -> usize {
        self.mem.len()
    }

    /// Replaces any previously loaded program wholesale.
    pub fn load_program(&mut self, program: Vec<Instruction>) {
        self.program = Some(program);
    }

    /// Bounds-checked cell read. Cell values double as indices at runtime,
    /// so the index is signed; anything outside `[0, memory_size)` is a
    /// failure rather than a sentinel value.
    pub fn get_memory(&self, cell: i64) -> Option<i64> {
        let cell = usize::try_from(cell).ok()?;
        self.mem.get(cell).copied()
    }

    /// Bounds-checked cell write. Returns whether the write landed.
    pub fn set_memory(&mut self, cell: i64, value: i64) -> bool {
        match usize::try_from(cell).ok().and_then(|c| self.mem.get_mut(c)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Executes exactly one instruction. Repeated invocation is the
    /// driver's job; the machine itself has no notion of a running state.
    pub fn step(&mut self) -> StepStatus {
        let instr = match &self.program {
            // Idle machine.
            None => return StepStatus::Success,
            Some(program) => {
                let Some(pc) = self.mem.first().copied() else {
                    return StepStatus::Error;
                };
                // A negative PC is out of code, same as running off the end.
                match usize::try_from(pc).ok().and_then(|pc| program.get(pc)) {
                    Some(instr) => *instr,
                    None => return StepStatus::PointerOutOfCode,
                }
            }
        };

        match instr.op {
            Operator::Nop | Operator::Label => self.advance(),
            Operator::Jump
            | Operator::JumpIfLess
            | Operator::JumpIfGreater
            | Operator::JumpIfEqual => self.exec_jump(instr),
            Operator::Compare => self.exec_compare(instr),
            Operator::Assign
            | Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Divide => self.exec_store(instr),
            // No semantics wired up; the lexer already rejects it.
            Operator::JumpIfNotEqual => StepStatus::Error,
        }
    }

    /// PC bump shared by every fall-through instruction.
    fn advance(&mut self) -> StepStatus {
        self.mem[PC_CELL] += 1;
        StepStatus::Success
    }

    fn exec_jump(&mut self, instr: Instruction) -> StepStatus {
        let taken = match instr.op {
            Operator::Jump => true,
            Operator::JumpIfLess => self.flag == Comparison::Less,
            Operator::JumpIfGreater => self.flag == Comparison::Greater,
            Operator::JumpIfEqual => self.flag == Comparison::Equal,
            _ => false,
        };
        if !taken {
            return self.advance();
        }

        let Some(target) = instr.fst.and_then(|op| self.resolve_value(op)) else {
            return StepStatus::Error;
        };
        match self.find_label(target) {
            Some(addr) if self.set_memory(PC_CELL as i64, addr as i64) => StepStatus::Success,
            _ => StepStatus::Error,
        }
    }

    /// Address of the first `LBL` in program order whose resolved operand
    /// equals `target`. Labels whose operand fails to resolve never match.
    fn find_label(&self, target: i64) -> Option<usize> {
        let program = self.program.as_deref()?;
        program.iter().position(|instr| {
            instr.op == Operator::Label
                && instr.fst.and_then(|op| self.resolve_value(op)) == Some(target)
        })
    }

    fn exec_compare(&mut self, instr: Instruction) -> StepStatus {
        let (Some(lhs), Some(rhs)) = (
            instr.fst.and_then(|op| self.resolve_value(op)),
            instr.snd.and_then(|op| self.resolve_value(op)),
        ) else {
            return StepStatus::Error;
        };
        self.flag = match lhs.cmp(&rhs) {
            Ordering::Less => Comparison::Less,
            Ordering::Equal => Comparison::Equal,
            Ordering::Greater => Comparison::Greater,
        };
        self.advance()
    }

    /// `SET`, `ADD`, `SUB`, `MUL` and `DIV`: resolve the destination cell
    /// and both current values, then write the result through the first
    /// operand. Failure leaves the instruction's own writes unapplied,
    /// except for division's committed quotient (see below).
    fn exec_store(&mut self, instr: Instruction) -> StepStatus {
        let (Some(dst), Some(src)) = (instr.fst, instr.snd) else {
            return StepStatus::Error;
        };
        let Some(dest) = self.resolve_address(dst) else {
            return StepStatus::Error;
        };
        let (Some(v1), Some(v2)) = (self.resolve_value(dst), self.resolve_value(src)) else {
            return StepStatus::Error;
        };

        let result = match instr.op {
            Operator::Assign => v2,
            Operator::Add => v1.wrapping_add(v2),
            Operator::Subtract => v1.wrapping_sub(v2),
            Operator::Multiply => v1.wrapping_mul(v2),
            Operator::Divide => {
                if v2 == 0 {
                    return StepStatus::Error;
                }
                let quotient = v1 as f64 / v2 as f64;
                if !self.set_memory(dest, quotient.trunc() as i64) {
                    return StepStatus::Error;
                }
                // The quotient is already committed when this write fails;
                // division is the one knowingly non-atomic instruction.
                if !self.set_memory(REMAINDER_CELL as i64, fraction_digits(quotient)) {
                    return StepStatus::Error;
                }
                return self.advance();
            }
            _ => return StepStatus::Error,
        };

        if !self.set_memory(dest, result) {
            return StepStatus::Error;
        }
        self.advance()
    }

    /// Resolves an operand to a value: immediates are themselves, direct
    /// operands read one cell, indirect operands read two.
    fn resolve_value(&self, operand: Operand) -> Option<i64> {
        match operand.mode {
            AddrMode::Immediate => Some(operand.raw),
            AddrMode::Direct => self.get_memory(operand.raw),
            AddrMode::Indirect => self
                .get_memory(operand.raw)
                .and_then(|cell| self.get_memory(cell)),
        }
    }

    /// Resolves an operand to a destination cell: direct operands name it
    /// outright, indirect ones read it from memory. Immediates cannot be
    /// written to.
    fn resolve_address(&self, operand: Operand) -> Option<i64> {
        match operand.mode {
            AddrMode::Immediate => None,
            AddrMode::Direct => Some(operand.raw),
            AddrMode::Indirect => self.get_memory(operand.raw),
        }
    }
}

/// First four decimal digits after the point of the quotient's shortest
/// decimal rendering, read off the string as the original machine did.
/// `1/3` gives 3333, `5/2` gives 5, an exact quotient gives 0.
fn fraction_digits(quotient: f64) -> i64 {
    let rendered = quotient.to_string();
    match rendered.split_once('.') {
        Some((_, frac)) => {
            let digits = &frac[..frac.len().min(4)];
            digits.parse().unwrap_or(0)
        }
        None => 0,
    }
}
