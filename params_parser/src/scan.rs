//! Character scanner shared by the directive grammars.

use thiserror::Error;

/// Errors produced while parsing a directive string.
///
/// Callers treat these leniently: a malformed derive pipeline yields an
/// empty pipeline and a malformed domain clause is skipped, so parse errors
/// never surface from the authoring API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unexpected character at a byte position
    #[error("unexpected character '{found}' at position {at}")]
    Unexpected { found: char, at: usize },

    /// Input ended mid-construct
    #[error("unexpected end of input (expected {expected})")]
    Eof { expected: &'static str },

    /// A literal failed to parse
    #[error("invalid {kind} literal '{text}'")]
    BadLiteral { kind: &'static str, text: String },
}

/// Result type for parse operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

pub(crate) struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Scanner {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    pub fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    pub fn expect(&mut self, wanted: char) -> ParseResult<()> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(c) => Err(ParseError::Unexpected {
                found: c,
                at: self.pos - 1,
            }),
            None => Err(ParseError::Eof {
                expected: "punctuation",
            }),
        }
    }

    /// Reads an identifier: letters, digits, `_` and `-`.
    pub fn ident(&mut self) -> ParseResult<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-') {
            self.pos += 1;
        }
        if self.pos == start {
            match self.peek() {
                Some(c) => Err(ParseError::Unexpected {
                    found: c,
                    at: self.pos,
                }),
                None => Err(ParseError::Eof {
                    expected: "identifier",
                }),
            }
        } else {
            Ok(self.chars[start..self.pos].iter().collect())
        }
    }

    /// Reads a quoted string: the opening quote has already been peeked.
    pub fn quoted(&mut self) -> ParseResult<String> {
        let quote = self.bump().ok_or(ParseError::Eof { expected: "quote" })?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let text: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(ParseError::Eof {
            expected: "closing quote",
        })
    }

    /// Reads an integer literal.
    pub fn integer(&mut self) -> ParseResult<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse().map_err(|_| ParseError::BadLiteral {
            kind: "integer",
            text,
        })
    }
}
