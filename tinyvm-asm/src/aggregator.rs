//! Primitive tokens → higher-level tokens, with one-token push-back
//! (spec.md §4.8).

use crate::error::AsmError;
use crate::position::Position;
use crate::scanner::{Scanner, Token, TokenType};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HLTokenType {
    Invalid,
    Eof,
    Newline,
    Specifier,
    Label,
    Identifier,
    Number,
    Literal,
    IndirectionStart,
    IndirectionEnd,
}

#[derive(Clone, PartialEq, Debug)]
pub struct HLToken {
    pub token_type: HLTokenType,
    pub position: Position,
    pub numeric: Option<u64>,
    pub text: String,
}

impl HLToken {
    fn new(token_type: HLTokenType, position: Position, numeric: Option<u64>, text: impl Into<String>) -> HLToken {
        HLToken {
            token_type,
            position,
            numeric,
            text: text.into(),
        }
    }
}

fn parse_decimal(value: &str) -> Result<u64, AsmError> {
    value.parse::<u64>().map_err(|_| AsmError::NumberOverflow(value.to_string()))
}

/// Wraps a [`Scanner`], turning its primitive `Token`s into `HLToken`s.
/// Holds at most one primitive token of look-ahead, used by the `.`,
/// identifier, and `#` rules below to decide what to emit.
pub struct TokenAggregator<'a> {
    scanner: Scanner<'a>,
    pushback: Option<Token>,
}

impl<'a> TokenAggregator<'a> {
    pub fn new(scanner: Scanner<'a>) -> TokenAggregator<'a> {
        TokenAggregator {
            scanner,
            pushback: None,
        }
    }

    fn next_primitive(&mut self) -> Token {
        match self.pushback.take() {
            Some(token) => token,
            None => self.scanner.next_token(),
        }
    }

    fn push_back(&mut self, token: Token) {
        debug_assert!(self.pushback.is_none(), "aggregator supports only one-token push-back");
        self.pushback = Some(token);
    }

    /// Pull the next high-level token.
    pub fn next(&mut self) -> Result<HLToken, AsmError> {
        let token = self.next_primitive();

        match token.token_type {
            TokenType::Invalid => Ok(HLToken::new(HLTokenType::Invalid, token.position, None, token.value)),
            TokenType::Eof => Ok(HLToken::new(HLTokenType::Eof, token.position, None, "")),
            TokenType::Newline => Ok(HLToken::new(HLTokenType::Newline, token.position, None, "")),
            TokenType::LBracket => Ok(HLToken::new(HLTokenType::IndirectionStart, token.position, None, "")),
            TokenType::RBracket => Ok(HLToken::new(HLTokenType::IndirectionEnd, token.position, None, "")),
            TokenType::Number => {
                let numeric = parse_decimal(&token.value)?;
                Ok(HLToken::new(HLTokenType::Number, token.position, Some(numeric), token.value))
            }
            TokenType::Comment => self.next(),
            TokenType::Dot => {
                let look_ahead = self.next_primitive();
                if look_ahead.token_type == TokenType::Identifier {
                    Ok(HLToken::new(HLTokenType::Specifier, token.position, None, look_ahead.value))
                } else {
                    self.push_back(look_ahead);
                    Ok(HLToken::new(HLTokenType::Invalid, token.position, None, "."))
                }
            }
            TokenType::Identifier => {
                let look_ahead = self.next_primitive();
                if look_ahead.token_type == TokenType::Colon {
                    Ok(HLToken::new(HLTokenType::Label, token.position, None, token.value))
                } else {
                    self.push_back(look_ahead);
                    Ok(HLToken::new(HLTokenType::Identifier, token.position, None, token.value))
                }
            }
            TokenType::Pound => {
                let look_ahead = self.next_primitive();
                if look_ahead.token_type == TokenType::Number {
                    let numeric = parse_decimal(&look_ahead.value)?;
                    Ok(HLToken::new(HLTokenType::Literal, token.position, Some(numeric), ""))
                } else {
                    self.push_back(look_ahead);
                    Ok(HLToken::new(HLTokenType::Invalid, token.position, None, "#"))
                }
            }
            TokenType::Colon => Ok(HLToken::new(HLTokenType::Invalid, token.position, None, token.value)),
        }
    }
}
