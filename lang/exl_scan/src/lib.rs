//! Regex-driven scanners for EXL.
//!
//! Two layers:
//! - [`RuleSet`] — an immutable, compiled table of `(pattern, token type,
//!   next state)` rules, ordered by registration. First match wins, never
//!   longest match.
//! - [`Scanner`] — a scan session over one subject string: cursor, current
//!   state, [`Scanner::produce`]. Any number of sessions can share one
//!   `RuleSet` (see [`Scanner::fork`]).
//!
//! Stateless scanning is the same machinery instantiated with the
//! uninhabited [`Stateless`] state, so only the default rule list exists.

mod error;
mod rules;
mod scanner;
mod token;

pub use error::ScanError;
pub use rules::{LexerState, NextState, RuleSet, RuleSetBuilder, Stateless};
pub use scanner::{Scanner, StatelessScanner};
pub use token::{Token, TokenType};
