//! The token model: what a scanner emits.

use std::fmt;
use std::hash::Hash;

/// Marker for scanner-specific token type enums.
///
/// Blanket-implemented; an ordinary `#[derive(Clone, Copy, Debug,
/// PartialEq, Eq, Hash)]` enum with a `Display` impl qualifies. `Display`
/// is what shows up in "expected one of {...}" scan errors, so keep it
/// short (usually the variant name).
pub trait TokenType: Copy + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> TokenType for T where T: Copy + Eq + Hash + fmt::Debug + fmt::Display {}

/// One classified lexical unit.
///
/// Immutable: created by [`Scanner::produce`](crate::Scanner::produce),
/// consumed and discarded by a parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<T: TokenType> {
    /// The token's type, per the rule that matched.
    pub token_type: T,
    /// The exact matched substring.
    pub text: String,
    /// Captured sub-group strings, one entry per capture group of the
    /// matching rule's pattern. `None` for groups that did not participate
    /// in the match.
    captured: Vec<Option<String>>,
}

impl<T: TokenType> Token<T> {
    /// Create a token. Normally only the scanner does this.
    pub fn new(token_type: T, text: impl Into<String>, captured: Vec<Option<String>>) -> Self {
        Token {
            token_type,
            text: text.into(),
            captured,
        }
    }

    /// The `index`th captured sub-group (zero-based; group 0 of the
    /// pattern is the whole match and lives in `text`, not here).
    pub fn captured(&self, index: usize) -> Option<&str> {
        self.captured.get(index).and_then(|c| c.as_deref())
    }

    /// Number of capture groups the matching rule's pattern declared.
    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }
}

impl<T: TokenType> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.token_type, self.text)
    }
}
