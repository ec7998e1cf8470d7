//! Collects aggregated tokens up to an end-of-line boundary into a
//! refcounted buffer for the parser (spec.md §4.9).

use std::rc::Rc;

use crate::aggregator::{HLToken, HLTokenType, TokenAggregator};
use crate::error::AsmError;

/// Shared, immutable token buffer for one source line. Cloning bumps a
/// reference count rather than copying the tokens.
pub type TokenBuffer = Rc<[HLToken]>;

pub struct LineReader<'a, 'b> {
    aggregator: &'a mut TokenAggregator<'b>,
}

impl<'a, 'b> LineReader<'a, 'b> {
    pub fn new(aggregator: &'a mut TokenAggregator<'b>) -> LineReader<'a, 'b> {
        LineReader { aggregator }
    }

    /// Read one line's worth of tokens. Returns `Ok(None)` once the stream
    /// is exhausted (an empty line followed immediately by `EOF`); empty
    /// lines in the middle of the input are skipped silently.
    pub fn read_line(&mut self) -> Result<Option<TokenBuffer>, AsmError> {
        loop {
            let mut buffer = Vec::new();
            loop {
                let token = self.aggregator.next()?;
                match token.token_type {
                    HLTokenType::Newline => {
                        if buffer.is_empty() {
                            break;
                        }
                        return Ok(Some(Rc::from(buffer)));
                    }
                    HLTokenType::Eof => {
                        if buffer.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some(Rc::from(buffer)));
                    }
                    _ => buffer.push(token),
                }
            }
        }
    }
}
