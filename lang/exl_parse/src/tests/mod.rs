//! Grammar tests against a rendering semantics.
//!
//! The mock semantics prints each production as an s-expression, which
//! pins down precedence, associativity, and the Atom disambiguation
//! without involving any runtime.


use crate::{Literal, ParseError, Semantics};

/// Renders productions as s-expressions. Types render as their name.
pub(crate) struct Render;

const VARIABLES: [&str; 3] = ["x", "y", "len"];
const IMPORTED: [&str; 2] = ["String", "Integer"];
const LOADABLE: [&str; 2] = ["a.b.C", "util.List"];
const PRIMITIVES: [&str; 8] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

impl Semantics for Render {
    type Value = String;
    type Type = String;

    fn literal(&mut self, literal: Literal) -> Result<String, ParseError> {
        Ok(match literal {
            Literal::Null => "null".into(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Long(i) => format!("{i}L"),
            Literal::Float(v) => format!("{v}f"),
            Literal::Double(v) => v.to_string(),
            Literal::Char(c) => format!("'{c}'"),
            Literal::Str(s) => format!("{s:?}"),
        })
    }

    fn conditional(
        &mut self,
        condition: String,
        if_true: String,
        if_false: String,
    ) -> Result<String, ParseError> {
        Ok(format!("(?: {condition} {if_true} {if_false})"))
    }

    fn binary(
        &mut self,
        op: crate::BinaryOp,
        lhs: String,
        rhs: String,
    ) -> Result<String, ParseError> {
        Ok(format!("({op} {lhs} {rhs})"))
    }

    fn unary(&mut self, op: crate::UnaryOp, operand: String) -> Result<String, ParseError> {
        Ok(format!("({op} {operand})"))
    }

    fn instance_of(&mut self, subject: String, ty: String) -> Result<String, ParseError> {
        Ok(format!("(instanceof {subject} {ty})"))
    }

    fn cast(&mut self, ty: String, operand: String) -> Result<String, ParseError> {
        Ok(format!("(cast {ty} {operand})"))
    }

    fn variable(&mut self, name: &str) -> Result<Option<String>, ParseError> {
        Ok(VARIABLES.contains(&name).then(|| name.to_owned()))
    }

    fn imported_type(&mut self, simple_name: &str) -> Option<String> {
        IMPORTED.contains(&simple_name).then(|| simple_name.to_owned())
    }

    fn load_type(&mut self, qualified_name: &str) -> Option<String> {
        LOADABLE
            .contains(&qualified_name)
            .then(|| qualified_name.to_owned())
    }

    fn primitive_type(&mut self, name: &str) -> Option<String> {
        PRIMITIVES.contains(&name).then(|| name.to_owned())
    }

    fn nested_type(&mut self, outer: &String, name: &str) -> Option<String> {
        // Only a.b.C has a nested type D.
        (outer == "a.b.C" && name == "D").then(|| format!("{outer}.{name}"))
    }

    fn field_access(&mut self, target: String, name: &str) -> Result<String, ParseError> {
        Ok(format!("(. {target} {name})"))
    }

    fn static_member(&mut self, ty: String, name: &str) -> Result<String, ParseError> {
        Ok(format!("(static {ty} {name})"))
    }

    fn method_call(
        &mut self,
        target: String,
        name: &str,
        arguments: Vec<String>,
    ) -> Result<String, ParseError> {
        Ok(format!("(call {target} {name} [{}])", arguments.join(", ")))
    }

    fn static_call(
        &mut self,
        ty: String,
        name: &str,
        arguments: Vec<String>,
    ) -> Result<String, ParseError> {
        Ok(format!("(scall {ty} {name} [{}])", arguments.join(", ")))
    }

    fn index(&mut self, target: String, index: String) -> Result<String, ParseError> {
        Ok(format!("([] {target} {index})"))
    }

    fn new_instance(&mut self, ty: String, arguments: Vec<String>) -> Result<String, ParseError> {
        Ok(format!("(new {ty} [{}])", arguments.join(", ")))
    }

    fn new_array(
        &mut self,
        element: String,
        dimensions: Vec<String>,
        extra_rank: usize,
    ) -> Result<String, ParseError> {
        Ok(format!(
            "(newarray {element} [{}] +{extra_rank})",
            dimensions.join(", ")
        ))
    }
}
