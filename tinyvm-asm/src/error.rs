//! Assembler-side error taxonomy (spec.md §7). Unlike a VM fault, these are
//! recoverable at line granularity: a malformed line becomes a
//! [`crate::parser::ParsedElement::Error`] and the caller decides whether
//! to keep going.

use thiserror::Error;

use crate::aggregator::HLTokenType;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum AsmError {
    #[error("unexpected {0:?} token")]
    InvalidToken(HLTokenType),

    #[error("expected ']' to close an indirection")]
    ExpectedIndirectionEnd,

    #[error("number \"{0}\" does not fit in an unsigned 64-bit word")]
    NumberOverflow(String),
}
