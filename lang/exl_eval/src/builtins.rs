//! The built-in `lang` package.
//!
//! A small standard library in the image of the source language's:
//! wrapper classes with parse/format statics, `Math`, and a mutable
//! `StringBuilder`. String methods here double as the instance methods
//! of string values, since the evaluator dispatches a call on a string
//! receiver to `lang.String`.

use std::rc::Rc;

use crate::errors::{integer_overflow, EvalError, EvalResult};
use crate::types::{ClassDef, ParamType, TypeRegistry};
use crate::value::{Instance, Value};

/// Register every `lang` class.
pub fn install(registry: &TypeRegistry) {
    registry.register(string_class());
    registry.register(integer_class());
    registry.register(long_class());
    registry.register(double_class());
    registry.register(float_class());
    registry.register(byte_class());
    registry.register(short_class());
    registry.register(boolean_class());
    registry.register(character_class());
    registry.register(math_class());
    registry.register(string_builder_class());
}

// Argument extraction helpers. Overload resolution has already vetted
// arity and applicability, so a mismatch here is a native signature
// bug; the errors still read sensibly if one slips through.

fn wrong_arg(method: &str, expected: &str) -> EvalError {
    EvalError::new(format!("{method} expects a {expected} argument"))
}

fn str_arg<'a>(method: &str, args: &'a [Value], i: usize) -> Result<&'a str, EvalError> {
    match args.get(i) {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(wrong_arg(method, "string")),
    }
}

fn int_arg(method: &str, args: &[Value], i: usize) -> Result<i32, EvalError> {
    args.get(i)
        .and_then(Value::as_integral)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| wrong_arg(method, "int"))
}

fn long_arg(method: &str, args: &[Value], i: usize) -> Result<i64, EvalError> {
    args.get(i)
        .and_then(Value::as_integral)
        .ok_or_else(|| wrong_arg(method, "long"))
}

fn double_arg(method: &str, args: &[Value], i: usize) -> Result<f64, EvalError> {
    args.get(i)
        .and_then(Value::as_numeric)
        .ok_or_else(|| wrong_arg(method, "double"))
}

fn char_arg(method: &str, args: &[Value], i: usize) -> Result<char, EvalError> {
    match args.get(i) {
        Some(Value::Char(c)) => Ok(*c),
        _ => Err(wrong_arg(method, "char")),
    }
}

fn str_receiver(receiver: &Value) -> Result<&str, EvalError> {
    match receiver {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::new(format!(
            "string method called on {}",
            other.type_name()
        ))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn int_value(v: usize) -> Value {
    Value::Int(v as i32)
}

fn string_class() -> ClassDef {
    ClassDef::new("lang.String")
        .static_method("valueOf", &[ParamType::Any], |_, args| {
            Ok(Value::Str(
                args.first().map(ToString::to_string).unwrap_or_default(),
            ))
        })
        .method("length", &[], |recv, _| {
            Ok(int_value(str_receiver(recv)?.chars().count()))
        })
        .method("isEmpty", &[], |recv, _| {
            Ok(Value::Bool(str_receiver(recv)?.is_empty()))
        })
        .method("charAt", &[ParamType::Int], |recv, args| {
            let s = str_receiver(recv)?;
            let i = int_arg("charAt", args, 0)?;
            usize::try_from(i)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(Value::Char)
                .ok_or_else(|| crate::errors::index_out_of_bounds(i64::from(i), s.chars().count()))
        })
        .method("substring", &[ParamType::Int], |recv, args| {
            let s = str_receiver(recv)?;
            let from = int_arg("substring", args, 0)?;
            substring(s, from, None)
        })
        .method("substring", &[ParamType::Int, ParamType::Int], |recv, args| {
            let s = str_receiver(recv)?;
            let from = int_arg("substring", args, 0)?;
            let to = int_arg("substring", args, 1)?;
            substring(s, from, Some(to))
        })
        .method("indexOf", &[ParamType::Str], |recv, args| {
            let s = str_receiver(recv)?;
            let needle = str_arg("indexOf", args, 0)?;
            Ok(match s.find(needle) {
                Some(byte) => int_value(s[..byte].chars().count()),
                None => Value::Int(-1),
            })
        })
        .method("contains", &[ParamType::Str], |recv, args| {
            let s = str_receiver(recv)?;
            Ok(Value::Bool(s.contains(str_arg("contains", args, 0)?)))
        })
        .method("startsWith", &[ParamType::Str], |recv, args| {
            let s = str_receiver(recv)?;
            Ok(Value::Bool(s.starts_with(str_arg("startsWith", args, 0)?)))
        })
        .method("endsWith", &[ParamType::Str], |recv, args| {
            let s = str_receiver(recv)?;
            Ok(Value::Bool(s.ends_with(str_arg("endsWith", args, 0)?)))
        })
        .method("toUpperCase", &[], |recv, _| {
            Ok(Value::Str(str_receiver(recv)?.to_uppercase()))
        })
        .method("toLowerCase", &[], |recv, _| {
            Ok(Value::Str(str_receiver(recv)?.to_lowercase()))
        })
        .method("trim", &[], |recv, _| {
            Ok(Value::Str(str_receiver(recv)?.trim().to_owned()))
        })
        .method("replace", &[ParamType::Str, ParamType::Str], |recv, args| {
            let s = str_receiver(recv)?;
            let from = str_arg("replace", args, 0)?;
            let to = str_arg("replace", args, 1)?;
            Ok(Value::Str(s.replace(from, to)))
        })
}

fn substring(s: &str, from: i32, to: Option<i32>) -> EvalResult {
    let length = s.chars().count();
    let out_of_range = |i: i32| crate::errors::index_out_of_bounds(i64::from(i), length);
    let from_i = usize::try_from(from).map_err(|_| out_of_range(from))?;
    let to_i = match to {
        Some(to) => usize::try_from(to).map_err(|_| out_of_range(to))?,
        None => length,
    };
    if from_i > to_i || to_i > length {
        return Err(out_of_range(to.unwrap_or(from)));
    }
    Ok(Value::Str(
        s.chars().skip(from_i).take(to_i - from_i).collect(),
    ))
}

fn parse_failure(type_name: &str, text: &str) -> EvalError {
    EvalError::new(format!("cannot parse {text:?} as {type_name}"))
}

fn integer_class() -> ClassDef {
    ClassDef::new("lang.Integer")
        .static_value("MIN_VALUE", Value::Int(i32::MIN))
        .static_value("MAX_VALUE", Value::Int(i32::MAX))
        .static_method("parseInt", &[ParamType::Str], |_, args| {
            let text = str_arg("parseInt", args, 0)?;
            text.parse()
                .map(Value::Int)
                .map_err(|_| parse_failure("int", text))
        })
        .static_method("parseInt", &[ParamType::Str, ParamType::Int], |_, args| {
            let text = str_arg("parseInt", args, 0)?;
            let radix = int_arg("parseInt", args, 1)?;
            u32::try_from(radix)
                .ok()
                .filter(|r| (2..=36).contains(r))
                .and_then(|r| i32::from_str_radix(text, r).ok())
                .map(Value::Int)
                .ok_or_else(|| parse_failure("int", text))
        })
        .static_method("valueOf", &[ParamType::Int], |_, args| {
            Ok(Value::Int(int_arg("valueOf", args, 0)?))
        })
        .static_method("toString", &[ParamType::Int], |_, args| {
            Ok(Value::Str(int_arg("toString", args, 0)?.to_string()))
        })
        .static_method("toHexString", &[ParamType::Int], |_, args| {
            let v = int_arg("toHexString", args, 0)?;
            Ok(Value::Str(format!("{v:x}")))
        })
}

fn long_class() -> ClassDef {
    ClassDef::new("lang.Long")
        .static_value("MIN_VALUE", Value::Long(i64::MIN))
        .static_value("MAX_VALUE", Value::Long(i64::MAX))
        .static_method("parseLong", &[ParamType::Str], |_, args| {
            let text = str_arg("parseLong", args, 0)?;
            text.parse()
                .map(Value::Long)
                .map_err(|_| parse_failure("long", text))
        })
        .static_method("toString", &[ParamType::Long], |_, args| {
            Ok(Value::Str(long_arg("toString", args, 0)?.to_string()))
        })
}

fn double_class() -> ClassDef {
    ClassDef::new("lang.Double")
        .static_value("MIN_VALUE", Value::Double(f64::MIN_POSITIVE))
        .static_value("MAX_VALUE", Value::Double(f64::MAX))
        .static_method("parseDouble", &[ParamType::Str], |_, args| {
            let text = str_arg("parseDouble", args, 0)?;
            text.parse()
                .map(Value::Double)
                .map_err(|_| parse_failure("double", text))
        })
        .static_method("isNaN", &[ParamType::Double], |_, args| {
            Ok(Value::Bool(double_arg("isNaN", args, 0)?.is_nan()))
        })
        .static_method("toString", &[ParamType::Double], |_, args| {
            let v = double_arg("toString", args, 0)?;
            Ok(Value::Str(format!("{v:?}")))
        })
}

fn float_class() -> ClassDef {
    ClassDef::new("lang.Float")
        .static_value("MIN_VALUE", Value::Float(f32::MIN_POSITIVE))
        .static_value("MAX_VALUE", Value::Float(f32::MAX))
}

fn byte_class() -> ClassDef {
    ClassDef::new("lang.Byte")
        .static_value("MIN_VALUE", Value::Byte(i8::MIN))
        .static_value("MAX_VALUE", Value::Byte(i8::MAX))
}

fn short_class() -> ClassDef {
    ClassDef::new("lang.Short")
        .static_value("MIN_VALUE", Value::Short(i16::MIN))
        .static_value("MAX_VALUE", Value::Short(i16::MAX))
}

fn boolean_class() -> ClassDef {
    ClassDef::new("lang.Boolean")
        .static_value("TRUE", Value::Bool(true))
        .static_value("FALSE", Value::Bool(false))
        .static_method("parseBoolean", &[ParamType::Str], |_, args| {
            let text = str_arg("parseBoolean", args, 0)?;
            Ok(Value::Bool(text.eq_ignore_ascii_case("true")))
        })
}

fn character_class() -> ClassDef {
    ClassDef::new("lang.Character")
        .static_method("isDigit", &[ParamType::Char], |_, args| {
            Ok(Value::Bool(char_arg("isDigit", args, 0)?.is_ascii_digit()))
        })
        .static_method("isLetter", &[ParamType::Char], |_, args| {
            Ok(Value::Bool(char_arg("isLetter", args, 0)?.is_alphabetic()))
        })
        .static_method("isWhitespace", &[ParamType::Char], |_, args| {
            Ok(Value::Bool(char_arg("isWhitespace", args, 0)?.is_whitespace()))
        })
        .static_method("toUpperCase", &[ParamType::Char], |_, args| {
            let c = char_arg("toUpperCase", args, 0)?;
            Ok(Value::Char(c.to_ascii_uppercase()))
        })
        .static_method("toLowerCase", &[ParamType::Char], |_, args| {
            let c = char_arg("toLowerCase", args, 0)?;
            Ok(Value::Char(c.to_ascii_lowercase()))
        })
}

fn math_class() -> ClassDef {
    ClassDef::new("lang.Math")
        .static_value("PI", Value::Double(std::f64::consts::PI))
        .static_value("E", Value::Double(std::f64::consts::E))
        .static_method("abs", &[ParamType::Int], |_, args| {
            int_arg("abs", args, 0)?
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("abs"))
        })
        .static_method("abs", &[ParamType::Long], |_, args| {
            long_arg("abs", args, 0)?
                .checked_abs()
                .map(Value::Long)
                .ok_or_else(|| integer_overflow("abs"))
        })
        .static_method("abs", &[ParamType::Double], |_, args| {
            Ok(Value::Double(double_arg("abs", args, 0)?.abs()))
        })
        .static_method("max", &[ParamType::Int, ParamType::Int], |_, args| {
            Ok(Value::Int(
                int_arg("max", args, 0)?.max(int_arg("max", args, 1)?),
            ))
        })
        .static_method("max", &[ParamType::Double, ParamType::Double], |_, args| {
            Ok(Value::Double(
                double_arg("max", args, 0)?.max(double_arg("max", args, 1)?),
            ))
        })
        .static_method("min", &[ParamType::Int, ParamType::Int], |_, args| {
            Ok(Value::Int(
                int_arg("min", args, 0)?.min(int_arg("min", args, 1)?),
            ))
        })
        .static_method("min", &[ParamType::Double, ParamType::Double], |_, args| {
            Ok(Value::Double(
                double_arg("min", args, 0)?.min(double_arg("min", args, 1)?),
            ))
        })
        .static_method("floor", &[ParamType::Double], |_, args| {
            Ok(Value::Double(double_arg("floor", args, 0)?.floor()))
        })
        .static_method("ceil", &[ParamType::Double], |_, args| {
            Ok(Value::Double(double_arg("ceil", args, 0)?.ceil()))
        })
        .static_method("sqrt", &[ParamType::Double], |_, args| {
            Ok(Value::Double(double_arg("sqrt", args, 0)?.sqrt()))
        })
        .static_method("pow", &[ParamType::Double, ParamType::Double], |_, args| {
            Ok(Value::Double(
                double_arg("pow", args, 0)?.powf(double_arg("pow", args, 1)?),
            ))
        })
        .static_method("round", &[ParamType::Double], |_, args| {
            #[allow(clippy::cast_possible_truncation)]
            let rounded = double_arg("round", args, 0)?.round() as i64;
            Ok(Value::Long(rounded))
        })
}

fn builder_receiver(receiver: &Value) -> Result<&Rc<Instance>, EvalError> {
    match receiver {
        Value::Object(instance) if instance.class.name == "lang.StringBuilder" => Ok(instance),
        other => Err(EvalError::new(format!(
            "StringBuilder method called on {}",
            other.type_name()
        ))),
    }
}

fn builder_text(instance: &Instance) -> String {
    match instance.fields.borrow().get("value") {
        Some(Value::Str(s)) => s.clone(),
        _ => String::new(),
    }
}

fn string_builder_class() -> ClassDef {
    ClassDef::new("lang.StringBuilder")
        .constructor(&[], |_| Ok(new_builder(String::new())))
        .constructor(&[ParamType::Str], |args| {
            let initial = str_arg("StringBuilder", args, 0)?.to_owned();
            Ok(new_builder(initial))
        })
        .method("append", &[ParamType::Any], |recv, args| {
            let instance = builder_receiver(recv)?;
            let appended = args.first().map(ToString::to_string).unwrap_or_default();
            let mut fields = instance.fields.borrow_mut();
            let text = match fields.get("value") {
                Some(Value::Str(s)) => format!("{s}{appended}"),
                _ => appended,
            };
            fields.insert("value".to_owned(), Value::Str(text));
            drop(fields);
            Ok(recv.clone())
        })
        .method("length", &[], |recv, _| {
            let instance = builder_receiver(recv)?;
            Ok(int_value(builder_text(instance).chars().count()))
        })
        .method("toString", &[], |recv, _| {
            let instance = builder_receiver(recv)?;
            Ok(Value::Str(builder_text(instance)))
        })
}

/// StringBuilder instances hold their text in a `value` field and are
/// created against a definition that carries the methods.
fn new_builder(initial: String) -> Value {
    let class = Rc::new(string_builder_class());
    let instance = Instance::new(class);
    instance
        .fields
        .borrow_mut()
        .insert("value".to_owned(), Value::Str(initial));
    Value::object(instance)
}
