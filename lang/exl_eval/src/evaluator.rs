//! The one-stop entry point.
//!
//! An [`Evaluator`] owns the configuration a parse needs: declared
//! variable names, imports, grammar extensions, and the type registry
//! with the `lang` package preinstalled. It hands out reusable
//! [`Expression`]s, or parses and evaluates in one step.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use exl_parse::{expression_rules, ExpressionParser, Extensions, ParseError};
use exl_scan::StatelessScanner;

use crate::builder::ExprBuilder;
use crate::builtins;
use crate::errors::EvalError;
use crate::expr::{Bindings, Expression};
use crate::imports::Imports;
use crate::types::{ClassDef, TypeRegistry};
use crate::value::Value;

/// Any failure between source text and result value.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub struct Evaluator {
    registry: Rc<TypeRegistry>,
    imports: Imports,
    variables: FxHashSet<String>,
    extensions: Extensions,
}

impl Evaluator {
    /// An evaluator that knows the given variable names. Only declared
    /// names parse as variables; anything else is tried as a type or
    /// package.
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = TypeRegistry::new();
        builtins::install(&registry);
        Evaluator {
            registry: Rc::new(registry),
            imports: Imports::new(),
            variables: variables.into_iter().map(Into::into).collect(),
            extensions: Extensions::default(),
        }
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn declare_variable(&mut self, name: impl Into<String>) {
        self.variables.insert(name.into());
    }

    /// Import one class by qualified name.
    pub fn add_import(&mut self, qualified_name: &str) {
        self.imports.add_single(qualified_name);
    }

    /// Import a whole package.
    pub fn add_on_demand_import(&mut self, package: &str) {
        self.imports.add_on_demand(package);
    }

    /// Make a class visible to expressions under its qualified name.
    pub fn register_class(&self, class: ClassDef) -> Rc<ClassDef> {
        self.registry.register(class)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Parse an expression, requiring the whole input.
    pub fn parse(&self, input: &str) -> Result<Expression, ParseError> {
        debug!(input, "parse expression");
        let mut scanner = StatelessScanner::new(expression_rules()?);
        scanner.set_input(input);
        let mut builder = ExprBuilder::new(&self.registry, &self.imports, &self.variables);
        let root = ExpressionParser::new(scanner, &mut builder)
            .with_extensions(self.extensions)
            .parse()?;
        Ok(Expression {
            root,
            registry: Rc::clone(&self.registry),
        })
    }

    /// Parse one expression off the front of the input. Returns the
    /// expression and the offset of the first unconsumed byte.
    pub fn parse_part(&self, input: &str) -> Result<(Expression, usize), ParseError> {
        debug!(input, "parse leading expression");
        let mut scanner = StatelessScanner::new(expression_rules()?);
        scanner.set_input(input);
        let mut builder = ExprBuilder::new(&self.registry, &self.imports, &self.variables);
        let mut parser =
            ExpressionParser::new(scanner, &mut builder).with_extensions(self.extensions);
        let root = parser.parse_part()?;
        let offset = parser.unconsumed_offset();
        Ok((
            Expression {
                root,
                registry: Rc::clone(&self.registry),
            },
            offset,
        ))
    }

    /// Parse and evaluate in one step.
    pub fn evaluate(&self, input: &str, bindings: &Bindings) -> Result<Value, Error> {
        let expression = self.parse(input)?;
        Ok(expression.evaluate(bindings)?)
    }
}
