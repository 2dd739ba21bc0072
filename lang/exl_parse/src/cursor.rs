//! Token cursor: peek/read/expect primitives over a token producer.
//!
//! Grammar-specific parsers build on this. Every expectation violation
//! raises immediately with the producer's positional context; there is no
//! recovery path.

use exl_scan::{LexerState, ScanError, Scanner, Token, TokenType};
use tracing::trace;

use crate::error::ParseError;

/// A producer of tokens with positional reporting.
///
/// [`Scanner`] implements this; anything else that can hand out tokens
/// one at a time (a replay buffer, a filter) can too.
pub trait TokenSource<T: TokenType> {
    /// The next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token<T>>, ScanError>;

    /// Positional context for error messages.
    fn location(&self) -> String;

    /// Current read position (byte offset into the subject).
    fn offset(&self) -> usize;

    /// Start offset of the most recently produced token.
    fn previous_token_offset(&self) -> usize;
}

impl<T: TokenType, S: LexerState> TokenSource<T> for Scanner<T, S> {
    fn next_token(&mut self) -> Result<Option<Token<T>>, ScanError> {
        self.produce()
    }

    fn location(&self) -> String {
        self.to_string()
    }

    fn offset(&self) -> usize {
        Scanner::offset(self)
    }

    fn previous_token_offset(&self) -> usize {
        Scanner::previous_token_offset(self)
    }
}

/// Single-token-lookahead cursor over a [`TokenSource`].
pub struct TokenCursor<T: TokenType, P: TokenSource<T>> {
    source: P,
    lookahead: Option<Token<T>>,
    /// Token types silently dropped between grammar tokens (whitespace).
    skip: Vec<T>,
}

impl<T: TokenType, P: TokenSource<T>> TokenCursor<T, P> {
    pub fn new(source: P) -> Self {
        TokenCursor {
            source,
            lookahead: None,
            skip: Vec::new(),
        }
    }

    /// Drop tokens of the given type between reads.
    pub fn skipping(mut self, token_type: T) -> Self {
        self.skip.push(token_type);
        self
    }

    /// Positional context of the token source.
    pub fn location(&self) -> String {
        self.source.location()
    }

    /// Offset of the first input byte not consumed by the grammar: the
    /// buffered lookahead token's start if one is buffered, otherwise the
    /// source's read position. Supports `parse_part`-style incremental
    /// use.
    pub fn unconsumed_offset(&self) -> usize {
        if self.lookahead.is_some() {
            self.source.previous_token_offset()
        } else {
            self.source.offset()
        }
    }

    fn fill(&mut self) -> Result<(), ParseError> {
        if self.lookahead.is_some() {
            return Ok(());
        }
        loop {
            match self.source.next_token()? {
                Some(t) if self.skip.contains(&t.token_type) => {}
                other => {
                    self.lookahead = other;
                    return Ok(());
                }
            }
        }
    }

    /// Non-consuming lookahead at the next token.
    pub fn peek(&mut self) -> Result<Option<&Token<T>>, ParseError> {
        self.fill()?;
        Ok(self.lookahead.as_ref())
    }

    /// Index of the next token's type within `types`, without consuming.
    pub fn peek_in(&mut self, types: &[T]) -> Result<Option<usize>, ParseError> {
        self.fill()?;
        Ok(self
            .lookahead
            .as_ref()
            .and_then(|t| types.iter().position(|c| *c == t.token_type)))
    }

    /// Index of the next token's text within `texts`, without consuming.
    pub fn peek_text(&mut self, texts: &[&str]) -> Result<Option<usize>, ParseError> {
        self.fill()?;
        Ok(self
            .lookahead
            .as_ref()
            .and_then(|t| texts.iter().position(|c| *c == t.text)))
    }

    /// Consume and return the next token; end of input is an error.
    pub fn read(&mut self) -> Result<Token<T>, ParseError> {
        self.fill()?;
        let token = self
            .lookahead
            .take()
            .ok_or_else(|| ParseError::syntax("unexpected end of input", self.location()))?;
        trace!(token = %token, "read");
        Ok(token)
    }

    /// Consume the next token, which must have one of the given types;
    /// returns its index within `types`.
    pub fn read_in(&mut self, types: &[T]) -> Result<usize, ParseError> {
        if let Some(index) = self.peek_in(types)? {
            self.read()?;
            return Ok(index);
        }
        let expected: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        let found = match self.peek()? {
            Some(t) => t.to_string(),
            None => "end of input".to_owned(),
        };
        Err(ParseError::syntax(
            format!("expected one of [{}], found {found}", expected.join(", ")),
            self.location(),
        ))
    }

    /// Consume the next token, which must have the given type.
    pub fn expect(&mut self, token_type: T) -> Result<Token<T>, ParseError> {
        self.fill()?;
        match &self.lookahead {
            Some(t) if t.token_type == token_type => self.read(),
            Some(t) => Err(ParseError::syntax(
                format!("expected {token_type}, found {t}"),
                self.location(),
            )),
            None => Err(ParseError::syntax(
                format!("expected {token_type}, found end of input"),
                self.location(),
            )),
        }
    }

    /// Consume the next token, which must have the given text.
    pub fn expect_text(&mut self, text: &str) -> Result<Token<T>, ParseError> {
        self.fill()?;
        match &self.lookahead {
            Some(t) if t.text == text => self.read(),
            Some(t) => Err(ParseError::syntax(
                format!("expected {text:?}, found {t}"),
                self.location(),
            )),
            None => Err(ParseError::syntax(
                format!("expected {text:?}, found end of input"),
                self.location(),
            )),
        }
    }

    /// Consume the next token only if it has the given type.
    pub fn peek_read(&mut self, token_type: T) -> Result<Option<Token<T>>, ParseError> {
        self.fill()?;
        match &self.lookahead {
            Some(t) if t.token_type == token_type => Ok(Some(self.read()?)),
            _ => Ok(None),
        }
    }

    /// Consume the next token only if it has the given text.
    pub fn peek_read_text(&mut self, text: &str) -> Result<bool, ParseError> {
        self.fill()?;
        match &self.lookahead {
            Some(t) if t.text == text => {
                self.read()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Assert that no tokens remain.
    pub fn eoi(&mut self) -> Result<(), ParseError> {
        self.fill()?;
        match &self.lookahead {
            None => Ok(()),
            Some(t) => Err(ParseError::syntax(
                format!("expected end of input, found {t}"),
                self.location(),
            )),
        }
    }
}
