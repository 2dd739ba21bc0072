//! Lexical definition of the expression language.
//!
//! Built on `exl_scan`'s stateless scanner. Rule order is significant:
//! first match wins, so float literals come before integer literals
//! (`1.5` must not lex as `1` `.` `5`) and multi-character operators come
//! before their single-character prefixes inside the operator
//! alternation.

use std::fmt;
use std::sync::{Arc, OnceLock};

use exl_scan::{RuleSet, RuleSetBuilder, ScanError, Stateless};

/// Token types of the expression language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprToken {
    /// Identifier or textual keyword (`new`, `instanceof`, `true`, ...).
    /// Keywords are distinguished by text in the parser, not here.
    Ident,
    IntLit,
    FloatLit,
    CharLit,
    StrLit,
    /// Operator or punctuation.
    Punct,
    Space,
}

impl fmt::Display for ExprToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExprToken::Ident => "identifier",
            ExprToken::IntLit => "integer literal",
            ExprToken::FloatLit => "floating-point literal",
            ExprToken::CharLit => "character literal",
            ExprToken::StrLit => "string literal",
            ExprToken::Punct => "operator",
            ExprToken::Space => "whitespace",
        };
        f.write_str(name)
    }
}

/// String and character literal rules capture the body (without quotes)
/// as group 1, so the parser can decode escapes without re-slicing.
const FLOAT: &str =
    r"(?:\d+\.\d*|\.\d+)(?:[eE][+\-]?\d+)?[fFdD]?|\d+[eE][+\-]?\d+[fFdD]?|\d+[fFdD]";
const INT: &str = r"0[xX][0-9a-fA-F]+[lL]?|[0-9]+[lL]?";
const CHAR: &str = r"'((?:[^'\\\r\n]|\\.)+)'";
const STR: &str = r#""((?:[^"\\\r\n]|\\.)*)""#;
const IDENT: &str = r"[A-Za-z_$][A-Za-z0-9_$]*";
const PUNCT: &str = r">>>|<<|>>|==|!=|<=|>=|&&|\|\||=\*|=~|[+\-*/%~!<>?:.,()\[\]&^|]";

fn build_rules() -> Result<Arc<RuleSet<ExprToken, Stateless>>, ScanError> {
    let mut builder = RuleSetBuilder::new();
    builder.rule(r"\s+", ExprToken::Space)?;
    builder.rule(FLOAT, ExprToken::FloatLit)?;
    builder.rule(INT, ExprToken::IntLit)?;
    builder.rule(CHAR, ExprToken::CharLit)?;
    builder.rule(STR, ExprToken::StrLit)?;
    builder.rule(IDENT, ExprToken::Ident)?;
    builder.rule(PUNCT, ExprToken::Punct)?;
    Ok(builder.build())
}

/// The compiled expression rule set, built once per process.
pub fn expression_rules() -> Result<Arc<RuleSet<ExprToken, Stateless>>, ScanError> {
    static RULES: OnceLock<Arc<RuleSet<ExprToken, Stateless>>> = OnceLock::new();
    if let Some(rules) = RULES.get() {
        return Ok(Arc::clone(rules));
    }
    let built = build_rules()?;
    Ok(Arc::clone(RULES.get_or_init(|| built)))
}
