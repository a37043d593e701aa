use std::ops::Range;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::lexer::{LexError, LexErrorKind};

/// Builds a labeled diagnostic for an assembly failure, pointing at the
/// offending source line.
pub fn lex_failure(src: String, err: &LexError) -> Report {
    let span = line_span(&src, err.line);
    let (code, help, msg) = match err.kind {
        LexErrorKind::UnknownMnemonic => (
            "lex::mnemonic",
            "mnemonics are case-sensitive: NON LBL JMP JLT JGT JET CMP SET ADD SUB MUL DIV",
            "Unknown mnemonic.",
        ),
        LexErrorKind::BadOperand => (
            "lex::operand",
            "operands are unsigned integers, optionally prefixed with # (direct) or ># (indirect)",
            "Malformed operand.",
        ),
        LexErrorKind::WrongArity => (
            "lex::arity",
            "NON takes no operands, LBL and the jumps take one, the rest take two",
            "Wrong number of operands.",
        ),
        LexErrorKind::ImmediateDestination => (
            "lex::dest",
            "the first operand is written to and must be #n or >#n",
            "Immediate operand used as a write destination.",
        ),
        LexErrorKind::UnsupportedMnemonic => (
            "lex::jne",
            "JNE is declared by the machine but has no execution semantics",
            "JNE cannot be assembled.",
        ),
    };
    miette!(
        severity = Severity::Error,
        code = code,
        help = help,
        labels = vec![LabeledSpan::at(span, "offending line")],
        "{msg}",
    )
    .with_source_code(src)
}

/// Builds a diagnostic for a program that stopped with a runtime error.
/// The PC doubles as the failing source line.
pub fn exec_failure(src: String, pc: i64) -> Report {
    let labels = match usize::try_from(pc) {
        Ok(line) => vec![LabeledSpan::at(line_span(&src, line), "failing instruction")],
        Err(_) => Vec::new(),
    };
    miette!(
        severity = Severity::Error,
        code = "run::fault",
        help = "bad operand resolution, division by zero or a missing jump target",
        labels = labels,
        "Program faulted at line {pc}.",
    )
    .with_source_code(src)
}

/// Byte range of a 0-based source line, without its terminator.
fn line_span(src: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (idx, text) in src.split_inclusive('\n').enumerate() {
        if idx == line {
            let len = text.trim_end_matches(['\n', '\r']).len();
            return start..start + len;
        }
        start += text.len();
    }
    start..start
}
