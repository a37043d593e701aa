use crate::ops::{AddrMode, Instruction, Operand, Operator};

/// Machine-readable reason a line failed to assemble.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LexErrorKind {
    /// First token is not one of the thirteen mnemonics.
    UnknownMnemonic,
    /// Operand token is not `digits`, `#digits` or `>#digits`.
    BadOperand,
    /// Operand count does not match the mnemonic.
    WrongArity,
    /// Write destination given as an immediate.
    ImmediateDestination,
    /// `JNE` parses but accepts no operand list at all.
    UnsupportedMnemonic,
}

/// Assembly failure. Fatal for the whole load attempt; no partial program
/// is produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LexError {
    /// 0-based source line the failure was detected on.
    pub line: usize,
    pub kind: LexErrorKind,
}

/// Assembles source text into an instruction sequence.
///
/// Every source line becomes exactly one instruction (blank lines become
/// `NON`), so instruction address *i* is always source line *i*.
pub fn lex(src: &str) -> Result<Vec<Instruction>, LexError> {
    src.lines()
        .enumerate()
        .map(|(i, line)| lex_line(line).map_err(|kind| LexError { line: i, kind }))
        .collect()
}

fn lex_line(line: &str) -> Result<Instruction, LexErrorKind> {
    let mut tokens = strip_comment(line).split_whitespace();

    let op: Operator = match tokens.next() {
        None => return Ok(Instruction::nullary(Operator::Nop)),
        Some(tok) => tok.parse().map_err(|()| LexErrorKind::UnknownMnemonic)?,
    };

    let operands = tokens
        .map(decode_operand)
        .collect::<Result<Vec<Operand>, LexErrorKind>>()?;

    let arity = op.arity().ok_or(LexErrorKind::UnsupportedMnemonic)?;
    if operands.len() != arity {
        return Err(LexErrorKind::WrongArity);
    }
    if op.writes_first_operand() && operands[0].mode == AddrMode::Immediate {
        return Err(LexErrorKind::ImmediateDestination);
    }

    Ok(Instruction::new(
        op,
        operands.first().copied(),
        operands.get(1).copied(),
    ))
}

/// Truncates a line at its `//` marker. The character immediately before the
/// marker is stripped as well, a quirk kept from the original grammar.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => {
            let kept = &line[..idx];
            match kept.char_indices().next_back() {
                Some((last, _)) => &kept[..last],
                None => "",
            }
        }
        None => line,
    }
}

/// Decodes one operand token: bare digits are immediate, `#` marks a direct
/// memory reference, `>#` an indirect one. `>` without `#` is invalid, as is
/// anything but an unsigned integer literal after the prefixes.
fn decode_operand(tok: &str) -> Result<Operand, LexErrorKind> {
    let (tok, indirect) = match tok.strip_prefix('>') {
        Some(rest) => (rest, true),
        None => (tok, false),
    };
    let (tok, memory) = match tok.strip_prefix('#') {
        Some(rest) => (rest, true),
        None => (tok, false),
    };
    if indirect && !memory {
        return Err(LexErrorKind::BadOperand);
    }
    if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LexErrorKind::BadOperand);
    }
    let raw: i64 = tok.parse().map_err(|_| LexErrorKind::BadOperand)?;

    let mode = if indirect {
        AddrMode::Indirect
    } else if memory {
        AddrMode::Direct
    } else {
        AddrMode::Immediate
    };
    Ok(Operand::new(mode, raw))
}

#[cfg(test)]
mod test {
    use super::*;

    fn imm(raw: i64) -> Option<Operand> {
        Some(Operand::new(AddrMode::Immediate, raw))
    }

    fn direct(raw: i64) -> Option<Operand> {
        Some(Operand::new(AddrMode::Direct, raw))
    }

    fn indirect(raw: i64) -> Option<Operand> {
        Some(Operand::new(AddrMode::Indirect, raw))
    }

    #[test]
    fn assembles_one_instruction_per_line() {
        let program = lex("SET #2 5\n\nADD #2 >#3\nJMP 0").unwrap();
        assert_eq!(
            program,
            vec![
                Instruction::new(Operator::Assign, direct(2), imm(5)),
                Instruction::nullary(Operator::Nop),
                Instruction::new(Operator::Add, direct(2), indirect(3)),
                Instruction::new(Operator::Jump, imm(0), None),
            ]
        );
    }

    #[test]
    fn blank_and_comment_only_lines_become_nop() {
        let program = lex("   \n//whole line\nNON").unwrap();
        assert!(program
            .iter()
            .all(|i| *i == Instruction::nullary(Operator::Nop)));
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn comment_eats_one_preceding_character() {
        // The quirk swallows the last real character before `//`.
        let program = lex("ADD #2 1 // incr").unwrap();
        assert_eq!(
            program[0],
            Instruction::new(Operator::Add, direct(2), imm(1))
        );

        // Without the space the operand itself is consumed.
        let err = lex("ADD #2 1// incr").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::WrongArity);
    }

    #[test]
    fn indirect_requires_memory_marker() {
        // `>` without `#` is invalid.
        let err = lex("SET #2 >5").unwrap_err();
        assert_eq!(
            err,
            LexError {
                line: 0,
                kind: LexErrorKind::BadOperand
            }
        );
    }

    #[test]
    fn rejects_signed_and_fractional_literals() {
        assert_eq!(lex("SET #2 -5").unwrap_err().kind, LexErrorKind::BadOperand);
        assert_eq!(
            lex("SET #2 1.5").unwrap_err().kind,
            LexErrorKind::BadOperand
        );
        assert_eq!(lex("SET ## 1").unwrap_err().kind, LexErrorKind::BadOperand);
    }

    #[test]
    fn arity_is_exact() {
        assert_eq!(lex("JMP").unwrap_err().kind, LexErrorKind::WrongArity);
        assert_eq!(lex("NON 1").unwrap_err().kind, LexErrorKind::WrongArity);
        assert_eq!(lex("SET #2 1 2").unwrap_err().kind, LexErrorKind::WrongArity);
        assert_eq!(lex("CMP #2").unwrap_err().kind, LexErrorKind::WrongArity);
    }

    #[test]
    fn write_destination_must_be_a_memory_cell() {
        let err = lex("SET 2 5").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::ImmediateDestination);
        // Reading is fine either way.
        assert!(lex("CMP 2 5").is_ok());
    }

    #[test]
    fn mnemonics_are_case_sensitive() {
        let err = lex("set #2 5").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnknownMnemonic);
    }

    #[test]
    fn jne_is_rejected_at_assembly_time() {
        assert_eq!(
            lex("JNE 0").unwrap_err().kind,
            LexErrorKind::UnsupportedMnemonic
        );
        assert_eq!(
            lex("JNE").unwrap_err().kind,
            LexErrorKind::UnsupportedMnemonic
        );
    }

    #[test]
    fn failure_reports_the_offending_line() {
        let err = lex("SET #2 5\nCMP #2 1\nOOPS").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
