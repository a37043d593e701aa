use std::str::FromStr;

/// Closed operator set for the machine. Mnemonics are case-sensitive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operator {
    /// Does nothing. Also what blank lines assemble to.
    Nop,
    /// Jump target, matched by resolved operand value rather than by address.
    Label,
    Jump,
    JumpIfLess,
    JumpIfGreater,
    JumpIfEqual,
    /// Declared in the instruction set but never given execution semantics.
    /// Lexing rejects it and the runtime treats it as an error.
    JumpIfNotEqual,
    /// Sets the comparison flag from its two operands.
    Compare,
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Exact operand count accepted for this operator. `None` means no
    /// operand list is valid and the line always fails to assemble.
    pub fn arity(self) -> Option<usize> {
        match self {
            Operator::Nop => Some(0),
            Operator::Label
            | Operator::Jump
            | Operator::JumpIfLess
            | Operator::JumpIfGreater
            | Operator::JumpIfEqual => Some(1),
            Operator::Compare
            | Operator::Assign
            | Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Divide => Some(2),
            Operator::JumpIfNotEqual => None,
        }
    }

    /// True for operators that write their result through the first operand,
    /// which must therefore name a memory cell.
    pub fn writes_first_operand(self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
        )
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NON" => Ok(Operator::Nop),
            "LBL" => Ok(Operator::Label),
            "JMP" => Ok(Operator::Jump),
            "JLT" => Ok(Operator::JumpIfLess),
            "JGT" => Ok(Operator::JumpIfGreater),
            "JET" => Ok(Operator::JumpIfEqual),
            "JNE" => Ok(Operator::JumpIfNotEqual),
            "CMP" => Ok(Operator::Compare),
            "SET" => Ok(Operator::Assign),
            "ADD" => Ok(Operator::Add),
            "SUB" => Ok(Operator::Subtract),
            "MUL" => Ok(Operator::Multiply),
            "DIV" => Ok(Operator::Divide),
            _ => Err(()),
        }
    }
}

/// How an operand's raw literal is interpreted at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddrMode {
    /// The literal itself is the value. Never a valid write destination.
    Immediate,
    /// The literal is a memory index.
    Direct,
    /// The literal is a memory index holding another memory index.
    Indirect,
}

/// A raw operand as parsed from source. The literal is always non-negative;
/// it is widened to i64 so resolution can mix it freely with cell values.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Operand {
    pub mode: AddrMode,
    pub raw: i64,
}

impl Operand {
    pub fn new(mode: AddrMode, raw: i64) -> Self {
        Operand { mode, raw }
    }
}

/// Single assembled instruction. An instruction's address is its index in
/// the assembled sequence, which always lines up with its source line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub op: Operator,
    pub fst: Option<Operand>,
    pub snd: Option<Operand>,
}

impl Instruction {
    pub fn new(op: Operator, fst: Option<Operand>, snd: Option<Operand>) -> Self {
        Instruction { op, fst, snd }
    }

    pub fn nullary(op: Operator) -> Self {
        Instruction::new(op, None, None)
    }
}
