//! Character stream → primitive token stream (spec.md §4.7).

use crate::position::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenType {
    Invalid,
    Eof,
    Dot,
    Colon,
    Pound,
    Comment,
    Identifier,
    Number,
    LBracket,
    RBracket,
    Newline,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: Position,
}

impl Token {
    fn new(token_type: TokenType, value: impl Into<String>, position: Position) -> Token {
        Token {
            token_type,
            value: value.into(),
            position,
        }
    }
}

fn is_newline_byte(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Scans a read-only byte range into [`Token`]s, never panicking: garbage
/// input becomes `Invalid` tokens rather than an error.
pub struct Scanner<'a> {
    bytes: &'a [u8],
    cursor: usize,
    position: Position,
}

impl<'a> Scanner<'a> {
    pub fn new(bytes: &'a [u8]) -> Scanner<'a> {
        Scanner {
            bytes,
            cursor: 0,
            position: Position::START,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    fn get(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.cursor += 1;
        self.position.advance_column();
        Some(byte)
    }

    fn consume_newline(&mut self) {
        let first = self.get().expect("caller only calls this when peek() saw a newline byte");
        if let Some(next) = self.peek() {
            let paired = (first == b'\r' && next == b'\n') || (first == b'\n' && next == b'\r');
            if paired {
                self.get();
            }
        }
        self.position.advance_line();
    }

    /// Pull the next token, skipping non-newline whitespace first.
    pub fn next_token(&mut self) -> Token {
        loop {
            match self.peek() {
                None => return Token::new(TokenType::Eof, "", self.position),
                Some(b) if is_newline_byte(b) => {
                    let start = self.position;
                    self.consume_newline();
                    return Token::new(TokenType::Newline, "", start);
                }
                Some(b) if (b as char).is_whitespace() => {
                    self.get();
                }
                Some(_) => break,
            }
        }

        let start = self.position;
        let c = self.get().expect("just peeked a byte");

        match c {
            b'[' => Token::new(TokenType::LBracket, "", start),
            b']' => Token::new(TokenType::RBracket, "", start),
            b':' => Token::new(TokenType::Colon, "", start),
            b'.' => Token::new(TokenType::Dot, "", start),
            b'#' => Token::new(TokenType::Pound, "", start),
            b';' => {
                let mut value = String::new();
                while let Some(b) = self.peek() {
                    if is_newline_byte(b) {
                        break;
                    }
                    value.push(b as char);
                    self.get();
                }
                Token::new(TokenType::Comment, value, start)
            }
            c if c.is_ascii_digit() => {
                let mut value = String::new();
                value.push(c as char);
                while let Some(b) = self.peek() {
                    if !b.is_ascii_digit() {
                        break;
                    }
                    value.push(b as char);
                    self.get();
                }
                Token::new(TokenType::Number, value, start)
            }
            c if c.is_ascii_alphabetic() => {
                let mut value = String::new();
                value.push(c as char);
                while let Some(b) = self.peek() {
                    if !b.is_ascii_alphanumeric() {
                        break;
                    }
                    value.push(b as char);
                    self.get();
                }
                Token::new(TokenType::Identifier, value, start)
            }
            other => Token::new(TokenType::Invalid, (other as char).to_string(), start),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
