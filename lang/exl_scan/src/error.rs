//! Scan error types.

use thiserror::Error;

/// Failure while building rules or scanning input.
///
/// Both variants are fatal to the call that raised them; the scanner never
/// retries internally.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ScanError {
    /// A rule pattern failed to compile.
    #[error("invalid rule pattern {pattern:?}: {message}")]
    Pattern {
        /// The pattern as registered (without the `\A` anchor wrapper).
        pattern: String,
        /// The regex engine's explanation.
        message: String,
    },

    /// No rule of the current state matched at the current offset.
    #[error(
        "unexpected character {character:?} at offset {offset} of {input:?}; \
         expected one of [{}]",
        expected.join(", ")
    )]
    UnexpectedCharacter {
        /// The character at the offset the scanner could not get past.
        character: char,
        /// Byte offset into the subject.
        offset: usize,
        /// The full subject string.
        input: String,
        /// Display names of the token types legal in the current state,
        /// in rule registration order, deduplicated.
        expected: Vec<String>,
    },
}
