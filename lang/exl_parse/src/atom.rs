//! The value/type/package disambiguator.
//!
//! At the token level the grammar is genuinely ambiguous: `a.b.c` can be
//! a value (field chain), a class name, or a package prefix. Each
//! production therefore yields an `Atom` and the *enclosing* production
//! forces the interpretation once the next token resolves it.

use crate::error::ParseError;

/// A deferred-disambiguation parse result.
///
/// Exactly one branch is active; forcing the wrong branch fails
/// instead of panicking. Instances are short-lived: created by a
/// primary/selector production, consumed by the enclosing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Atom<V, T> {
    /// An expression value (whatever the semantics' value type is).
    Value(V),
    /// A resolved type reference.
    Type(T),
    /// A package-name prefix, possibly to be extended by further
    /// `.identifier` selectors.
    Package(String),
}

impl<V, T> Atom<V, T> {
    /// Force the value interpretation.
    pub fn into_value(self, location: &str) -> Result<V, ParseError> {
        match self {
            Atom::Value(v) => Ok(v),
            Atom::Type(_) => Err(ParseError::syntax(
                "type used where a value is required",
                location,
            )),
            Atom::Package(name) => Err(ParseError::syntax(
                format!("{name:?} is not a known variable, type, or package member"),
                location,
            )),
        }
    }
}
