//! The VM-side fault taxonomy (spec.md §7). A fault is fatal for the
//! current execution: the run loop stops, the fault is recorded, and
//! execution does not continue.

use crate::word::Word;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VmFault {
    #[error("stack overflow")]
    StackOverflow,

    #[error("stack underflow")]
    StackUnderflow,

    #[error("illegal assignment to a literal operand")]
    IllegalAssignmentToLiteral,

    #[error("address {address} out of bounds (limit {limit})")]
    OutOfBounds { address: Word, limit: Word },

    #[error("division by zero")]
    DivideByZero,

    #[error("unknown opcode value {0}")]
    UnknownOpcode(u64),

    #[error("program of {word_count} words does not fit in memory at IP {ip}")]
    ProgramTooLarge { ip: usize, word_count: usize },

    /// Not one of the spec's named fault kinds by itself: spec.md §9
    /// requires ambiguous addressing-mode combinations to be rejected
    /// "at decode time (assertion or fault)" without naming a category
    /// for it, so decode failures surface here.
    #[error("malformed instruction: {0}")]
    InvalidInstruction(String),
}
