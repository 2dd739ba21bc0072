//! The compiled expression tree.
//!
//! Parsing produces an [`Expr`] tree with all names resolved: variables
//! checked against the declared set, types bound to registry entries.
//! Evaluation walks the tree against a set of bindings and never
//! mutates it, so one [`Expression`] can be evaluated any number of
//! times.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use exl_parse::{BinaryOp, UnaryOp};

use crate::errors::EvalResult;
use crate::interp;
use crate::types::{ClassDef, TypeHandle, TypeRegistry};
use crate::value::Value;

/// Variable values by name.
pub type Bindings = FxHashMap<String, Value>;

/// One node of a compiled expression.
#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Value),
    Variable(String),
    Conditional {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    InstanceOf {
        subject: Box<Expr>,
        ty: TypeHandle,
    },
    Cast {
        ty: TypeHandle,
        operand: Box<Expr>,
    },
    Field {
        target: Box<Expr>,
        name: String,
    },
    StaticMember {
        class: Rc<ClassDef>,
        name: String,
    },
    MethodCall {
        target: Box<Expr>,
        name: String,
        arguments: Vec<Expr>,
    },
    StaticCall {
        class: Rc<ClassDef>,
        name: String,
        arguments: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    NewInstance {
        class: Rc<ClassDef>,
        arguments: Vec<Expr>,
    },
    NewArray {
        element: TypeHandle,
        dimensions: Vec<Expr>,
        extra_rank: usize,
    },
}

/// A parsed, resolved expression ready to evaluate.
pub struct Expression {
    pub(crate) root: Expr,
    pub(crate) registry: Rc<TypeRegistry>,
}

impl Expression {
    /// Evaluate against the given variable bindings. Side effects aside,
    /// repeated calls yield the same result.
    pub fn evaluate(&self, bindings: &Bindings) -> EvalResult {
        interp::evaluate(&self.root, bindings, &self.registry)
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Str(s) => {
            f.write_str("\"")?;
            for c in s.chars() {
                write_escaped(f, c, '"')?;
            }
            f.write_str("\"")
        }
        Value::Char(c) => {
            f.write_str("'")?;
            write_escaped(f, *c, '\'')?;
            f.write_str("'")
        }
        Value::Long(v) => write!(f, "{v}L"),
        Value::Float(v) => write!(f, "{v:?}f"),
        other => write!(f, "{other}"),
    }
}

/// Escapes the quote, backslash, and control characters with the
/// expression language's own escape syntax, so rendered literals
/// re-lex.
fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, quote: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        c if c == quote => write!(f, "\\{quote}"),
        c if c.is_control() => write!(f, "\\u{:04x}", c as u32),
        c => write!(f, "{c}"),
    }
}

fn write_arguments(f: &mut fmt::Formatter<'_>, arguments: &[Expr]) -> fmt::Result {
    f.write_str("(")?;
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{argument}")?;
    }
    f.write_str(")")
}

/// Re-serializes the tree. Binary and conditional nodes are always
/// parenthesized, so the output re-parses to the same shape.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write_literal(f, value),
            Expr::Variable(name) => f.write_str(name),
            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => write!(f, "({condition} ? {if_true} : {if_false})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expr::InstanceOf { subject, ty } => {
                write!(f, "({subject} instanceof {})", ty.name())
            }
            Expr::Cast { ty, operand } => write!(f, "(({}) {operand})", ty.name()),
            Expr::Field { target, name } => write!(f, "{target}.{name}"),
            Expr::StaticMember { class, name } => write!(f, "{}.{name}", class.name),
            Expr::MethodCall {
                target,
                name,
                arguments,
            } => {
                write!(f, "{target}.{name}")?;
                write_arguments(f, arguments)
            }
            Expr::StaticCall {
                class,
                name,
                arguments,
            } => {
                write!(f, "{}.{name}", class.name)?;
                write_arguments(f, arguments)
            }
            Expr::Index { target, index } => write!(f, "{target}[{index}]"),
            Expr::NewInstance { class, arguments } => {
                write!(f, "new {}", class.name)?;
                write_arguments(f, arguments)
            }
            Expr::NewArray {
                element,
                dimensions,
                extra_rank,
            } => {
                write!(f, "new {}", element.name())?;
                for dimension in dimensions {
                    write!(f, "[{dimension}]")?;
                }
                for _ in 0..*extra_rank {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}
