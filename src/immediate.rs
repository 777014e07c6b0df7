// immediate.rs
//
// Immediate values as they come out of the assembler: possibly-unresolved
// symbol references, relocation-modified halves, and flat add/sub chains.
// The linker's evaluator collapses all of these to concrete 32-bit values
// once section addresses are final.

use std::fmt;

/// Relocation operators applied to an inner immediate.
///
/// `Hi`/`Lo` split an absolute 32-bit value into the `lui`+`addi` pair;
/// `PcrelHi`/`PcrelLo` do the same for a PC-relative displacement anchored
/// at the `auipc` instruction of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Hi,
    Lo,
    PcrelHi,
    PcrelLo,
}

/// Operator preceding a term in a flat immediate chain. The first term of
/// a chain always carries `Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOp {
    Add,
    Sub,
}

/// An immediate operand, resolved at link time.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediate {
    /// A literal value.
    Int(i32),
    /// An unresolved symbol reference. The name `.` stands for the address
    /// of the instruction or data item holding this immediate.
    Sym(String),
    /// A relocation operator applied to an inner immediate.
    Rel(RelOp, Box<Immediate>),
    /// A left-to-right fold of add/sub over sub-immediates.
    Tree(Vec<(TreeOp, Immediate)>),
}

impl Immediate {
    pub fn sym(name: impl Into<String>) -> Self {
        Immediate::Sym(name.into())
    }

    pub fn hi(inner: Immediate) -> Self {
        Immediate::Rel(RelOp::Hi, Box::new(inner))
    }

    pub fn lo(inner: Immediate) -> Self {
        Immediate::Rel(RelOp::Lo, Box::new(inner))
    }

    pub fn pcrel_hi(inner: Immediate) -> Self {
        Immediate::Rel(RelOp::PcrelHi, Box::new(inner))
    }

    pub fn pcrel_lo(inner: Immediate) -> Self {
        Immediate::Rel(RelOp::PcrelLo, Box::new(inner))
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Hi => "%hi",
            RelOp::Lo => "%lo",
            RelOp::PcrelHi => "%pcrel_hi",
            RelOp::PcrelLo => "%pcrel_lo",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Int(n) => write!(f, "{}", n),
            Immediate::Sym(s) => write!(f, "{}", s),
            Immediate::Rel(op, inner) => write!(f, "{}({})", op, inner),
            Immediate::Tree(terms) => {
                for (i, (op, imm)) in terms.iter().enumerate() {
                    match (i, op) {
                        (0, TreeOp::Add) => write!(f, "{}", imm)?,
                        (0, TreeOp::Sub) => write!(f, "-{}", imm)?,
                        (_, TreeOp::Add) => write!(f, " + {}", imm)?,
                        (_, TreeOp::Sub) => write!(f, " - {}", imm)?,
                    }
                }
                Ok(())
            }
        }
    }
}
