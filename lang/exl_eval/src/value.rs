//! Runtime values.
//!
//! The value space mirrors the source language: four integral widths,
//! two floating widths, booleans, characters, strings, arrays, and class
//! instances. Arrays and instances have reference semantics through
//! `Rc`, everything else is copied by value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::types::ClassDef;

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<Instance>),
}

/// An instance of a registered class: its definition plus mutable
/// per-instance fields.
pub struct Instance {
    pub class: Rc<ClassDef>,
    pub fields: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<ClassDef>) -> Self {
        Instance {
            class,
            fields: RefCell::new(FxHashMap::default()),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.borrow())
            .finish()
    }
}

impl Value {
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn object(instance: Instance) -> Value {
        Value::Object(Rc::new(instance))
    }

    /// The value's type name as it appears in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Bool(_) => "boolean".to_owned(),
            Value::Byte(_) => "byte".to_owned(),
            Value::Short(_) => "short".to_owned(),
            Value::Int(_) => "int".to_owned(),
            Value::Long(_) => "long".to_owned(),
            Value::Float(_) => "float".to_owned(),
            Value::Double(_) => "double".to_owned(),
            Value::Char(_) => "char".to_owned(),
            Value::Str(_) => "String".to_owned(),
            Value::Array(_) => "array".to_owned(),
            Value::Object(instance) => instance.class.name.clone(),
        }
    }

    /// Perl-style truth: null, false, the empty string, and integral
    /// zero are false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Byte(v) => *v != 0,
            Value::Short(v) => *v != 0,
            Value::Int(v) => *v != 0,
            Value::Long(v) => *v != 0,
            Value::Char(c) => *c != '\0',
            Value::Str(s) => !s.is_empty(),
            Value::Float(_) | Value::Double(_) | Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// The integral value as `i64`, if this is an integral type.
    /// Characters count as integral, as in the source language.
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    /// The numeric value as `f64`, if this is any numeric type.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            other => other.as_integral().map(|v| v as f64),
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, Value::Float(_) | Value::Double(_))
    }
}

/// Value equality across numeric widths: `1 == 1L` is true, and
/// `null` equals only `null`. Instances compare by class and fields,
/// arrays element-wise.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => {
                a.class.name == b.class.name && *a.fields.borrow() == *b.fields.borrow()
            }
            (a, b) => {
                if a.is_float() || b.is_float() {
                    match (a.as_numeric(), b.as_numeric()) {
                        (Some(x), Some(y)) => x == y,
                        _ => false,
                    }
                } else {
                    match (a.as_integral(), b.as_integral()) {
                        (Some(x), Some(y)) => x == y,
                        _ => false,
                    }
                }
            }
        }
    }
}

/// Renders the value the way string concatenation sees it: no quotes
/// around strings, `null` for null.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            // Debug formatting keeps the decimal point on whole floats.
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Object(instance) => f.write_str(&instance.class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_promotes_numeric_widths() {
        assert_eq!(Value::Int(1), Value::Long(1));
        assert_eq!(Value::Byte(7), Value::Int(7));
        assert_eq!(Value::Int(1), Value::Double(1.0));
        assert_eq!(Value::Char('a'), Value::Int(97));
        assert_ne!(Value::Int(7), Value::Null);
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Str("1".into()), Value::Int(1));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Long(0).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Double(0.0).is_truthy());
        assert!(Value::array(Vec::new()).is_truthy());
    }

    #[test]
    fn display_is_concatenation_text() {
        assert_eq!(Value::Int(1).to_string(), "1");
        assert_eq!(Value::Double(1.0).to_string(), "1.0");
        assert_eq!(Value::Str("a".into()).to_string(), "a");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::array(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
    }
}
