//! Bridges the grammar to the expression tree.
//!
//! [`ExprBuilder`] is the semantic action set handed to the parser: it
//! resolves names against the declared variables, the imports, and the
//! type registry, and assembles [`Expr`] nodes. Anything that cannot be
//! resolved at parse time is a parse-time error, so evaluation never
//! sees an unresolved type.

use rustc_hash::FxHashSet;

use exl_parse::{BinaryOp, Literal, ParseError, Semantics, UnaryOp};

use crate::expr::Expr;
use crate::imports::Imports;
use crate::types::{Primitive, TypeHandle, TypeRegistry};
use crate::value::Value;

pub(crate) struct ExprBuilder<'a> {
    registry: &'a TypeRegistry,
    imports: &'a Imports,
    variables: &'a FxHashSet<String>,
}

impl<'a> ExprBuilder<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        imports: &'a Imports,
        variables: &'a FxHashSet<String>,
    ) -> Self {
        ExprBuilder {
            registry,
            imports,
            variables,
        }
    }
}

impl Semantics for ExprBuilder<'_> {
    type Value = Expr;
    type Type = TypeHandle;

    fn literal(&mut self, literal: Literal) -> Result<Expr, ParseError> {
        Ok(Expr::Literal(match literal {
            Literal::Null => Value::Null,
            Literal::Bool(v) => Value::Bool(v),
            Literal::Int(v) => Value::Int(v),
            Literal::Long(v) => Value::Long(v),
            Literal::Float(v) => Value::Float(v),
            Literal::Double(v) => Value::Double(v),
            Literal::Char(v) => Value::Char(v),
            Literal::Str(v) => Value::Str(v),
        }))
    }

    fn conditional(
        &mut self,
        condition: Expr,
        if_true: Expr,
        if_false: Expr,
    ) -> Result<Expr, ParseError> {
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Result<Expr, ParseError> {
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn unary(&mut self, op: UnaryOp, operand: Expr) -> Result<Expr, ParseError> {
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn instance_of(&mut self, subject: Expr, ty: TypeHandle) -> Result<Expr, ParseError> {
        Ok(Expr::InstanceOf {
            subject: Box::new(subject),
            ty,
        })
    }

    fn cast(&mut self, ty: TypeHandle, operand: Expr) -> Result<Expr, ParseError> {
        Ok(Expr::Cast {
            ty,
            operand: Box::new(operand),
        })
    }

    fn variable(&mut self, name: &str) -> Result<Option<Expr>, ParseError> {
        Ok(self
            .variables
            .contains(name)
            .then(|| Expr::Variable(name.to_owned())))
    }

    fn imported_type(&mut self, simple_name: &str) -> Option<TypeHandle> {
        self.imports
            .resolve(simple_name, self.registry)
            .map(TypeHandle::Class)
    }

    fn load_type(&mut self, qualified_name: &str) -> Option<TypeHandle> {
        self.registry.lookup(qualified_name).map(TypeHandle::Class)
    }

    fn primitive_type(&mut self, name: &str) -> Option<TypeHandle> {
        Primitive::from_name(name).map(TypeHandle::Primitive)
    }

    fn nested_type(&mut self, outer: &TypeHandle, name: &str) -> Option<TypeHandle> {
        match outer {
            TypeHandle::Class(class) => class.nested.get(name).cloned().map(TypeHandle::Class),
            TypeHandle::Primitive(_) => None,
        }
    }

    fn field_access(&mut self, target: Expr, name: &str) -> Result<Expr, ParseError> {
        Ok(Expr::Field {
            target: Box::new(target),
            name: name.to_owned(),
        })
    }

    fn static_member(&mut self, ty: TypeHandle, name: &str) -> Result<Expr, ParseError> {
        match ty {
            TypeHandle::Class(class) => Ok(Expr::StaticMember {
                class,
                name: name.to_owned(),
            }),
            TypeHandle::Primitive(p) => Err(ParseError::semantic(format!(
                "primitive type {} has no member {name:?}",
                p.name()
            ))),
        }
    }

    fn method_call(
        &mut self,
        target: Expr,
        name: &str,
        arguments: Vec<Expr>,
    ) -> Result<Expr, ParseError> {
        Ok(Expr::MethodCall {
            target: Box::new(target),
            name: name.to_owned(),
            arguments,
        })
    }

    fn static_call(
        &mut self,
        ty: TypeHandle,
        name: &str,
        arguments: Vec<Expr>,
    ) -> Result<Expr, ParseError> {
        match ty {
            TypeHandle::Class(class) => Ok(Expr::StaticCall {
                class,
                name: name.to_owned(),
                arguments,
            }),
            TypeHandle::Primitive(p) => Err(ParseError::semantic(format!(
                "primitive type {} has no method {name:?}",
                p.name()
            ))),
        }
    }

    fn index(&mut self, target: Expr, index: Expr) -> Result<Expr, ParseError> {
        Ok(Expr::Index {
            target: Box::new(target),
            index: Box::new(index),
        })
    }

    fn new_instance(&mut self, ty: TypeHandle, arguments: Vec<Expr>) -> Result<Expr, ParseError> {
        match ty {
            TypeHandle::Class(class) => Ok(Expr::NewInstance { class, arguments }),
            TypeHandle::Primitive(p) => Err(ParseError::semantic(format!(
                "cannot instantiate primitive type {}",
                p.name()
            ))),
        }
    }

    fn new_array(
        &mut self,
        element: TypeHandle,
        dimensions: Vec<Expr>,
        extra_rank: usize,
    ) -> Result<Expr, ParseError> {
        Ok(Expr::NewArray {
            element,
            dimensions,
            extra_rank,
        })
    }
}
