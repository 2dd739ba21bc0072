//! Recursive descent parsing for EXL.
//!
//! Layers, bottom up:
//! - [`TokenCursor`] — peek/read/expect primitives over any
//!   [`TokenSource`], for grammar-specific parsers to build on.
//! - [`ExprToken`] and [`expression_rules`] — the expression language's
//!   lexical definition, built on `exl_scan`.
//! - [`ExpressionParser`] — the full operator-precedence grammar. Parsing
//!   and semantic-action invocation are fused: there is no separate AST
//!   pass here. Each production calls into a [`Semantics`] implementation
//!   and yields an [`Atom`], which defers the value/type/package
//!   disambiguation that the token stream alone cannot make.

mod atom;
mod cursor;
mod error;
mod extensions;
mod grammar;
mod lexer;
mod literal;
mod ops;

#[cfg(test)]
mod tests;

pub use atom::Atom;
pub use cursor::{TokenCursor, TokenSource};
pub use error::ParseError;
pub use extensions::Extensions;
pub use grammar::{ExpressionParser, Semantics};
pub use lexer::{expression_rules, ExprToken};
pub use literal::{decode_float, decode_integer, unescape, Literal, LiteralError};
pub use ops::{BinaryOp, UnaryOp};
