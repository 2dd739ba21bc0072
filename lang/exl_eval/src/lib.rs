//! EXL Eval - runtime for the EXL expression language.
//!
//! Builds on `exl_parse`: the grammar's semantic actions assemble an
//! [`Expr`] tree with all types and variables resolved, and the
//! interpreter walks that tree against per-call [`Bindings`].
//!
//! # Architecture
//!
//! - [`Evaluator`]: configuration (variables, imports, extensions) and
//!   the parse entry points
//! - [`Expression`]: a parsed tree, evaluated any number of times
//! - [`TypeRegistry`] and [`ClassDef`]: classes visible to expressions,
//!   with native method bodies and cost-based overload resolution
//! - `ops`: direct enum-based operator dispatch with numeric promotion
//! - `matcher`: the `=*` glob and `=~` regex operators
//! - `builtins`: the `lang` package (`String`, `Integer`, `Math`, ...)

mod builder;
mod builtins;
mod errors;
mod evaluator;
mod expr;
mod imports;
mod interp;
mod matcher;
mod ops;
mod types;
mod value;

#[cfg(test)]
mod tests;

pub use errors::{EvalError, EvalResult};
pub use evaluator::{Error, Evaluator};
pub use expr::{Bindings, Expr, Expression};
pub use imports::Imports;
pub use types::{
    ClassDef, ConstructorDef, ConstructorFn, MethodDef, NativeFn, ParamType, Primitive,
    TypeHandle, TypeRegistry,
};
pub use value::{Instance, Value};

// The grammar types callers need alongside the evaluator.
pub use exl_parse::{Extensions, ParseError};
