//! The per-line `parse_element` contract (spec.md §6): turns one line's
//! worth of `HLToken`s into a `ParsedElement`. Only the shape is
//! specified; cross-line label resolution is left to a downstream
//! linker, so `OperandKind::Label` is returned unresolved.

use std::str::FromStr;

use tinyvm::RegisterId;

use crate::aggregator::{HLToken, HLTokenType};
use crate::error::AsmError;

#[derive(Clone, PartialEq, Debug)]
pub enum OperandKind {
    Literal(u64),
    Register(RegisterId),
    Memory(u64),
    Label(String),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Operand {
    pub indirect: bool,
    pub kind: OperandKind,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ParsedInstruction {
    pub mnemonic: String,
    pub operands: Vec<Operand>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ParsedSpecifier {
    pub name: String,
    pub operand: u64,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ParseError {
    pub error: AsmError,
    pub token: HLToken,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ParsedElement {
    Label(String),
    Specifier(ParsedSpecifier),
    Instruction(ParsedInstruction),
    Error(ParseError),
}

/// Parse one already-collected line (a [`crate::line_reader::TokenBuffer`])
/// into a single [`ParsedElement`]. The whole buffer is consumed — a line
/// reader only ever yields one logical element per line in this grammar.
pub fn parse_element(tokens: &[HLToken]) -> ParsedElement {
    match tokens.first() {
        None => ParsedElement::Error(ParseError {
            error: AsmError::InvalidToken(HLTokenType::Eof),
            token: HLToken {
                token_type: HLTokenType::Eof,
                position: Default::default(),
                numeric: None,
                text: String::new(),
            },
        }),
        Some(first) => match first.token_type {
            HLTokenType::Label => ParsedElement::Label(first.text.clone()),
            HLTokenType::Specifier => parse_specifier(first, &tokens[1..]),
            HLTokenType::Identifier => parse_instruction(first, &tokens[1..]),
            _ => error_at(first, AsmError::InvalidToken(first.token_type)),
        },
    }
}

fn error_at(token: &HLToken, error: AsmError) -> ParsedElement {
    ParsedElement::Error(ParseError {
        error,
        token: token.clone(),
    })
}

fn parse_specifier(specifier: &HLToken, rest: &[HLToken]) -> ParsedElement {
    match rest.first() {
        Some(number) if number.token_type == HLTokenType::Number => ParsedElement::Specifier(ParsedSpecifier {
            name: specifier.text.clone(),
            operand: number.numeric.expect("aggregator stamps Number tokens with their parsed value"),
        }),
        Some(bad) => error_at(bad, AsmError::InvalidToken(bad.token_type)),
        None => error_at(specifier, AsmError::InvalidToken(HLTokenType::Eof)),
    }
}

fn parse_instruction(mnemonic: &HLToken, rest: &[HLToken]) -> ParsedElement {
    let mut operands = Vec::new();
    let mut cursor = 0;

    while cursor < rest.len() {
        match parse_operand(rest, &mut cursor) {
            Ok(operand) => operands.push(operand),
            Err(e) => return ParsedElement::Error(e),
        }
    }

    ParsedElement::Instruction(ParsedInstruction {
        mnemonic: mnemonic.text.clone(),
        operands,
    })
}

fn parse_operand(tokens: &[HLToken], cursor: &mut usize) -> Result<Operand, ParseError> {
    let token = &tokens[*cursor];
    *cursor += 1;

    if token.token_type == HLTokenType::IndirectionStart {
        let mut inner = parse_operand(tokens, cursor)?;
        match tokens.get(*cursor) {
            Some(close) if close.token_type == HLTokenType::IndirectionEnd => {
                *cursor += 1;
                inner.indirect = true;
                return Ok(inner);
            }
            Some(other) => {
                return Err(ParseError {
                    error: AsmError::ExpectedIndirectionEnd,
                    token: other.clone(),
                })
            }
            None => {
                return Err(ParseError {
                    error: AsmError::ExpectedIndirectionEnd,
                    token: token.clone(),
                })
            }
        }
    }

    let kind = match token.token_type {
        HLTokenType::Literal => OperandKind::Literal(token.numeric.expect("Literal carries numeric")),
        HLTokenType::Number => OperandKind::Memory(token.numeric.expect("Number carries numeric")),
        HLTokenType::Identifier => match RegisterId::from_str(&token.text) {
            Ok(id) => OperandKind::Register(id),
            Err(_) => OperandKind::Label(token.text.clone()),
        },
        other => {
            return Err(ParseError {
                error: AsmError::InvalidToken(other),
                token: token.clone(),
            })
        }
    };

    Ok(Operand {
        indirect: false,
        kind,
    })
}
