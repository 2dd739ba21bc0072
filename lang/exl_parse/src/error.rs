//! Parse error types.

use exl_scan::ScanError;
use thiserror::Error;

/// Failure while parsing a token stream.
///
/// Fatal to the enclosing `parse()`/`parse_part()` call: there is no
/// recovery and no partial result.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
    /// The token stream violates the grammar, or a semantic action failed.
    /// Carries the token source's positional context.
    #[error("{message} (at {location})")]
    Syntax {
        /// Human-readable description, typically expected-vs-actual.
        message: String,
        /// The token source's positional `Display` output.
        location: String,
    },

    /// A semantic-action error raised without positional context; the
    /// grammar attaches the position as it propagates (see
    /// [`ParseError::locate`]).
    #[error("{message}")]
    Semantic { message: String },

    /// The scanner could not tokenize the input.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, location: impl Into<String>) -> Self {
        ParseError::Syntax {
            message: message.into(),
            location: location.into(),
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        ParseError::Semantic {
            message: message.into(),
        }
    }

    /// Attach positional context to a location-less semantic error;
    /// errors that already carry a position pass through unchanged.
    pub fn locate(self, location: &str) -> Self {
        match self {
            ParseError::Semantic { message } => ParseError::Syntax {
                message,
                location: location.to_owned(),
            },
            other => other,
        }
    }
}
