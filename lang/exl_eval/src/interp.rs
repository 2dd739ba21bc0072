//! Tree-walking evaluation.
//!
//! One function per node family. The logical operators evaluate their
//! right side only when the left does not decide, and a decided
//! operator returns the deciding operand itself, not a boolean.

use std::rc::Rc;

use tracing::trace;

use exl_parse::BinaryOp;

use crate::errors::{
    bad_cast, index_out_of_bounds, negative_array_size, no_such_constructor, no_such_member,
    no_such_method, non_integer_index, not_indexable, null_value, unbound_variable, EvalError,
    EvalResult,
};
use crate::expr::{Bindings, Expr};
use crate::ops;
use crate::types::{
    resolve_constructor, resolve_overload, ClassDef, Primitive, TypeHandle, TypeRegistry,
};
use crate::value::Value;

pub(crate) fn evaluate(expr: &Expr, bindings: &Bindings, registry: &TypeRegistry) -> EvalResult {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| unbound_variable(name)),
        Expr::Conditional {
            condition,
            if_true,
            if_false,
        } => {
            // Only the chosen branch is evaluated.
            if evaluate(condition, bindings, registry)?.is_truthy() {
                evaluate(if_true, bindings, registry)
            } else {
                evaluate(if_false, bindings, registry)
            }
        }
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOp::LogicalAnd => {
                let left = evaluate(lhs, bindings, registry)?;
                if left.is_truthy() {
                    evaluate(rhs, bindings, registry)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::LogicalOr => {
                let left = evaluate(lhs, bindings, registry)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    evaluate(rhs, bindings, registry)
                }
            }
            eager => {
                let left = evaluate(lhs, bindings, registry)?;
                let right = evaluate(rhs, bindings, registry)?;
                ops::binary(*eager, &left, &right)
            }
        },
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, bindings, registry)?;
            ops::unary(*op, &value)
        }
        Expr::InstanceOf { subject, ty } => {
            let value = evaluate(subject, bindings, registry)?;
            Ok(Value::Bool(is_instance(&value, ty)))
        }
        Expr::Cast { ty, operand } => {
            let value = evaluate(operand, bindings, registry)?;
            cast(value, ty)
        }
        Expr::Field { target, name } => {
            let value = evaluate(target, bindings, registry)?;
            field_access(&value, name, registry)
        }
        Expr::StaticMember { class, name } => class
            .statics
            .get(name)
            .cloned()
            .ok_or_else(|| no_such_member(name, &class.name)),
        Expr::MethodCall {
            target,
            name,
            arguments,
        } => {
            let receiver = evaluate(target, bindings, registry)?;
            let arguments = evaluate_all(arguments, bindings, registry)?;
            method_call(&receiver, name, &arguments, registry)
        }
        Expr::StaticCall {
            class,
            name,
            arguments,
        } => {
            let arguments = evaluate_all(arguments, bindings, registry)?;
            let Some(method) = resolve_overload(&class.static_methods, name, &arguments) else {
                return Err(no_such_method(name, &class.name));
            };
            trace!(class = %class.name, method = name, "static call");
            (method.body)(&Value::Null, &arguments)
        }
        Expr::Index { target, index } => {
            let value = evaluate(target, bindings, registry)?;
            let index = evaluate(index, bindings, registry)?;
            index_access(&value, &index)
        }
        Expr::NewInstance { class, arguments } => {
            let arguments = evaluate_all(arguments, bindings, registry)?;
            let Some(constructor) = resolve_constructor(&class.constructors, &arguments) else {
                return Err(no_such_constructor(&class.name));
            };
            trace!(class = %class.name, "construct");
            (constructor.body)(&arguments)
        }
        Expr::NewArray {
            element,
            dimensions,
            extra_rank,
        } => {
            let mut lengths = Vec::with_capacity(dimensions.len());
            for dimension in dimensions {
                let value = evaluate(dimension, bindings, registry)?;
                let Some(length) = value.as_integral() else {
                    return Err(non_integer_index(&value));
                };
                if length < 0 {
                    return Err(negative_array_size(length));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                lengths.push(length as usize);
            }
            Ok(new_array(element, &lengths, *extra_rank))
        }
    }
}

fn evaluate_all(
    expressions: &[Expr],
    bindings: &Bindings,
    registry: &TypeRegistry,
) -> Result<Vec<Value>, EvalError> {
    expressions
        .iter()
        .map(|e| evaluate(e, bindings, registry))
        .collect()
}

/// The class a non-object value belongs to, for method dispatch and
/// `instanceof` against the built-in wrappers.
fn value_class_name(value: &Value) -> Option<&'static str> {
    Some(match value {
        Value::Bool(_) => "lang.Boolean",
        Value::Byte(_) => "lang.Byte",
        Value::Short(_) => "lang.Short",
        Value::Int(_) => "lang.Integer",
        Value::Long(_) => "lang.Long",
        Value::Float(_) => "lang.Float",
        Value::Double(_) => "lang.Double",
        Value::Char(_) => "lang.Character",
        Value::Str(_) => "lang.String",
        _ => return None,
    })
}

/// The class whose instance methods apply to `receiver`, if any. An
/// instance dispatches through the registry's definition of its class
/// when one is registered, so constructors may hand out instances with
/// a bare definition.
fn receiver_class(receiver: &Value, registry: &TypeRegistry) -> Option<Rc<ClassDef>> {
    match receiver {
        Value::Object(instance) => Some(
            registry
                .lookup(&instance.class.name)
                .unwrap_or_else(|| Rc::clone(&instance.class)),
        ),
        other => value_class_name(other).and_then(|n| registry.lookup(n)),
    }
}

fn method_call(
    receiver: &Value,
    name: &str,
    arguments: &[Value],
    registry: &TypeRegistry,
) -> EvalResult {
    if matches!(receiver, Value::Null) {
        return Err(null_value("a method receiver"));
    }
    let Some(class) = receiver_class(receiver, registry) else {
        return Err(no_such_method(name, &receiver.type_name()));
    };
    let Some(method) = resolve_overload(&class.methods, name, arguments) else {
        return Err(no_such_method(name, &receiver.type_name()));
    };
    trace!(class = %class.name, method = name, "method call");
    (method.body)(receiver, arguments)
}

fn is_instance(value: &Value, ty: &TypeHandle) -> bool {
    match ty {
        TypeHandle::Primitive(p) => match (p, value) {
            (Primitive::Boolean, Value::Bool(_))
            | (Primitive::Byte, Value::Byte(_))
            | (Primitive::Short, Value::Short(_))
            | (Primitive::Int, Value::Int(_))
            | (Primitive::Long, Value::Long(_))
            | (Primitive::Float, Value::Float(_))
            | (Primitive::Double, Value::Double(_))
            | (Primitive::Char, Value::Char(_)) => true,
            _ => false,
        },
        TypeHandle::Class(class) => match value {
            Value::Object(instance) => instance.class.name == class.name,
            other => value_class_name(other) == Some(class.name.as_str()),
        },
    }
}

fn cast(value: Value, ty: &TypeHandle) -> EvalResult {
    match ty {
        TypeHandle::Primitive(p) => cast_primitive(value, *p),
        TypeHandle::Class(class) => {
            let matches = match &value {
                Value::Null => true,
                Value::Object(instance) => instance.class.name == class.name,
                other => value_class_name(other) == Some(class.name.as_str()),
            };
            if matches {
                Ok(value)
            } else {
                Err(bad_cast(&value, &class.name))
            }
        }
    }
}

/// Numeric casts truncate toward zero and wrap to the target width,
/// as in the source language. `boolean` casts only to itself.
fn cast_primitive(value: Value, target: Primitive) -> EvalResult {
    if target == Primitive::Boolean {
        return match value {
            Value::Bool(_) => Ok(value),
            other => Err(bad_cast(&other, "boolean")),
        };
    }
    let Some(numeric) = value.as_numeric() else {
        return Err(bad_cast(&value, target.name()));
    };
    // Integral reading preserves 64-bit precision where there is one.
    #[allow(clippy::cast_possible_truncation)]
    let truncated = numeric as i64;
    let integral = value.as_integral().unwrap_or(truncated);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let result = match target {
        Primitive::Byte => Value::Byte(integral as i8),
        Primitive::Short => Value::Short(integral as i16),
        Primitive::Int => Value::Int(integral as i32),
        Primitive::Long => Value::Long(integral),
        Primitive::Float => Value::Float(numeric as f32),
        Primitive::Double => Value::Double(numeric),
        Primitive::Char => {
            let code = u32::from(integral as u16);
            match char::from_u32(code) {
                Some(c) => Value::Char(c),
                None => return Err(bad_cast(&value, "char")),
            }
        }
        Primitive::Boolean => return Err(bad_cast(&value, "boolean")), // handled above
    };
    Ok(result)
}

/// Property lookup: a field of that name first, then a nullary method
/// of that name, then a `getName()` accessor.
fn field_access(target: &Value, name: &str, registry: &TypeRegistry) -> EvalResult {
    match target {
        Value::Null => Err(null_value("a field target")),
        Value::Array(elements) => {
            if name == "length" {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let length = elements.borrow().len() as i32;
                Ok(Value::Int(length))
            } else {
                Err(no_such_member(name, "array"))
            }
        }
        other => {
            if let Value::Object(instance) = other {
                if let Some(value) = instance.fields.borrow().get(name) {
                    return Ok(value.clone());
                }
            }
            if let Some(class) = receiver_class(other, registry) {
                for candidate in [name.to_owned(), accessor_name(name)] {
                    if let Some(method) = resolve_overload(&class.methods, &candidate, &[]) {
                        return (method.body)(other, &[]);
                    }
                }
            }
            Err(no_such_member(name, &other.type_name()))
        }
    }
}

/// `major` becomes `getMajor`.
fn accessor_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 3);
    out.push_str("get");
    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    out
}

fn index_access(target: &Value, index: &Value) -> EvalResult {
    let Value::Array(elements) = target else {
        if matches!(target, Value::Null) {
            return Err(null_value("an indexed array"));
        }
        return Err(not_indexable(target));
    };
    let Some(i) = index.as_integral() else {
        return Err(non_integer_index(index));
    };
    let elements = elements.borrow();
    let found = usize::try_from(i).ok().and_then(|i| elements.get(i).cloned());
    found.ok_or_else(|| index_out_of_bounds(i, elements.len()))
}

/// Build a fresh array. With a positive `extra_rank` the innermost
/// listed dimension holds unallocated (`null`) sub-arrays; otherwise it
/// holds the element type's default value.
fn new_array(element: &TypeHandle, lengths: &[usize], extra_rank: usize) -> Value {
    match lengths.split_first() {
        Some((&length, rest)) if rest.is_empty() => {
            let fill = if extra_rank > 0 {
                Value::Null
            } else {
                match element {
                    TypeHandle::Primitive(p) => p.default_value(),
                    TypeHandle::Class(_) => Value::Null,
                }
            };
            Value::array(vec![fill; length])
        }
        Some((&length, rest)) => Value::array(
            (0..length)
                .map(|_| new_array(element, rest, extra_rank))
                .collect(),
        ),
        None => Value::array(Vec::new()),
    }
}
