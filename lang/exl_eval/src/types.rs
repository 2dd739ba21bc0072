//! Registered classes and overload resolution.
//!
//! A [`ClassDef`] describes a class the expression language can see:
//! instance methods, static methods, static values, constructors, and
//! nested classes. Method bodies are native closures over [`Value`]s.
//! Overloads are resolved by scoring each candidate signature against
//! the argument values and taking the cheapest applicable one, where
//! an exact parameter match costs nothing and each widening step costs
//! one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::EvalResult;
use crate::value::Value;

/// A primitive type of the expression language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Primitive> {
        Some(match name {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "char" => Primitive::Char,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
        }
    }

    /// The value a freshly created array slot of this type holds.
    pub fn default_value(self) -> Value {
        match self {
            Primitive::Boolean => Value::Bool(false),
            Primitive::Byte => Value::Byte(0),
            Primitive::Short => Value::Short(0),
            Primitive::Int => Value::Int(0),
            Primitive::Long => Value::Long(0),
            Primitive::Float => Value::Float(0.0),
            Primitive::Double => Value::Double(0.0),
            Primitive::Char => Value::Char('\0'),
        }
    }
}

/// A resolved type reference: a primitive or a registered class.
#[derive(Clone)]
pub enum TypeHandle {
    Primitive(Primitive),
    Class(Rc<ClassDef>),
}

impl TypeHandle {
    pub fn name(&self) -> String {
        match self {
            TypeHandle::Primitive(p) => p.name().to_owned(),
            TypeHandle::Class(c) => c.name.clone(),
        }
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.name())
    }
}

/// A parameter type in a native method signature, used only for
/// overload resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    /// Matches any argument, at the highest cost.
    Any,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Str,
    Array,
    Object,
}

/// Widening rank inside the numeric tower. `None` for non-numerics.
fn numeric_rank(param: ParamType) -> Option<u32> {
    Some(match param {
        ParamType::Byte => 0,
        ParamType::Short => 1,
        ParamType::Int => 2,
        ParamType::Long => 3,
        ParamType::Float => 4,
        ParamType::Double => 5,
        _ => return None,
    })
}

fn value_rank(value: &Value) -> Option<u32> {
    Some(match value {
        Value::Byte(_) => 0,
        Value::Short(_) => 1,
        // A char widens to int and beyond.
        Value::Int(_) | Value::Char(_) => 2,
        Value::Long(_) => 3,
        Value::Float(_) => 4,
        Value::Double(_) => 5,
        _ => return None,
    })
}

impl ParamType {
    /// Cost of passing `value` for this parameter, or `None` when the
    /// value is not applicable. Exact matches cost 0, each numeric
    /// widening step 1, `Any` a flat 8.
    pub fn accepts(self, value: &Value) -> Option<u32> {
        match (self, value) {
            (ParamType::Any, _) => Some(8),
            (ParamType::Bool, Value::Bool(_)) => Some(0),
            (ParamType::Char, Value::Char(_)) => Some(0),
            (ParamType::Str, Value::Str(_)) => Some(0),
            (ParamType::Array, Value::Array(_)) => Some(0),
            (ParamType::Object, Value::Object(_)) => Some(0),
            // Null is applicable to any reference-like parameter.
            (ParamType::Str | ParamType::Array | ParamType::Object, Value::Null) => Some(4),
            _ => {
                let param = numeric_rank(self)?;
                let value = value_rank(value)?;
                param.checked_sub(value)
            }
        }
    }
}

/// A native method body. The first argument is the receiver, which is
/// `Value::Null` for static methods.
pub type NativeFn = Rc<dyn Fn(&Value, &[Value]) -> EvalResult>;

/// A native constructor body.
pub type ConstructorFn = Rc<dyn Fn(&[Value]) -> EvalResult>;

/// One method overload.
#[derive(Clone)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<ParamType>,
    pub body: NativeFn,
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodDef({}/{:?})", self.name, self.params)
    }
}

/// One constructor overload.
#[derive(Clone)]
pub struct ConstructorDef {
    pub params: Vec<ParamType>,
    pub body: ConstructorFn,
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorDef({:?})", self.params)
    }
}

/// A class visible to expressions.
#[derive(Debug, Default)]
pub struct ClassDef {
    /// Fully qualified name, e.g. `lang.String`.
    pub name: String,
    pub methods: Vec<MethodDef>,
    pub static_methods: Vec<MethodDef>,
    pub statics: FxHashMap<String, Value>,
    pub constructors: Vec<ConstructorDef>,
    pub nested: FxHashMap<String, Rc<ClassDef>>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            ..ClassDef::default()
        }
    }

    /// The last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn method(
        mut self,
        name: &str,
        params: &[ParamType],
        body: impl Fn(&Value, &[Value]) -> EvalResult + 'static,
    ) -> Self {
        self.methods.push(MethodDef {
            name: name.to_owned(),
            params: params.to_vec(),
            body: Rc::new(body),
        });
        self
    }

    pub fn static_method(
        mut self,
        name: &str,
        params: &[ParamType],
        body: impl Fn(&Value, &[Value]) -> EvalResult + 'static,
    ) -> Self {
        self.static_methods.push(MethodDef {
            name: name.to_owned(),
            params: params.to_vec(),
            body: Rc::new(body),
        });
        self
    }

    pub fn static_value(mut self, name: &str, value: Value) -> Self {
        self.statics.insert(name.to_owned(), value);
        self
    }

    pub fn constructor(
        mut self,
        params: &[ParamType],
        body: impl Fn(&[Value]) -> EvalResult + 'static,
    ) -> Self {
        self.constructors.push(ConstructorDef {
            params: params.to_vec(),
            body: Rc::new(body),
        });
        self
    }

    pub fn nested(mut self, class: ClassDef) -> Self {
        let simple = class.simple_name().to_owned();
        self.nested.insert(simple, Rc::new(class));
        self
    }
}

/// Pick the cheapest applicable overload among same-named, same-arity
/// candidates. Ties go to the earliest registration.
pub fn resolve_overload<'a>(
    candidates: &'a [MethodDef],
    name: &str,
    arguments: &[Value],
) -> Option<&'a MethodDef> {
    candidates
        .iter()
        .filter(|m| m.name == name && m.params.len() == arguments.len())
        .filter_map(|m| signature_cost(&m.params, arguments).map(|cost| (cost, m)))
        .min_by_key(|(cost, _)| *cost)
        .map(|(_, m)| m)
}

/// Same scheme for constructors.
pub fn resolve_constructor<'a>(
    candidates: &'a [ConstructorDef],
    arguments: &[Value],
) -> Option<&'a ConstructorDef> {
    candidates
        .iter()
        .filter(|c| c.params.len() == arguments.len())
        .filter_map(|c| signature_cost(&c.params, arguments).map(|cost| (cost, c)))
        .min_by_key(|(cost, _)| *cost)
        .map(|(_, c)| c)
}

fn signature_cost(params: &[ParamType], arguments: &[Value]) -> Option<u32> {
    params
        .iter()
        .zip(arguments)
        .try_fold(0, |total, (param, argument)| {
            param.accepts(argument).map(|cost| total + cost)
        })
}

/// All classes known to an evaluator, keyed by fully qualified name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: RefCell<FxHashMap<String, Rc<ClassDef>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Register a class under its qualified name, replacing any
    /// previous registration.
    pub fn register(&self, class: ClassDef) -> Rc<ClassDef> {
        let class = Rc::new(class);
        self.classes
            .borrow_mut()
            .insert(class.name.clone(), Rc::clone(&class));
        class
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<Rc<ClassDef>> {
        self.classes.borrow().get(qualified_name).cloned()
    }

    /// Look up `package.simple_name`.
    pub fn lookup_in(&self, package: &str, simple_name: &str) -> Option<Rc<ClassDef>> {
        self.lookup(&format!("{package}.{simple_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: &str) -> impl Fn(&Value, &[Value]) -> EvalResult + 'static {
        let tag = tag.to_owned();
        move |_, _| Ok(Value::Str(tag.clone()))
    }

    fn sample() -> ClassDef {
        ClassDef::new("t.Sample")
            .static_method("pick", &[ParamType::Int], tagged("int"))
            .static_method("pick", &[ParamType::Long], tagged("long"))
            .static_method("pick", &[ParamType::Double], tagged("double"))
            .static_method("pick", &[ParamType::Any], tagged("any"))
    }

    fn pick(arguments: &[Value]) -> String {
        let class = sample();
        let method = resolve_overload(&class.static_methods, "pick", arguments)
            .expect("applicable overload");
        match (method.body)(&Value::Null, arguments) {
            Ok(Value::Str(tag)) => tag,
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn exact_match_beats_widening() {
        assert_eq!(pick(&[Value::Int(1)]), "int");
        assert_eq!(pick(&[Value::Long(1)]), "long");
        assert_eq!(pick(&[Value::Double(1.0)]), "double");
    }

    #[test]
    fn widening_beats_any() {
        // A short has no exact overload; int is the nearest widening.
        assert_eq!(pick(&[Value::Short(1)]), "int");
        assert_eq!(pick(&[Value::Str("s".into())]), "any");
    }

    #[test]
    fn arity_must_match() {
        let class = sample();
        assert!(resolve_overload(&class.static_methods, "pick", &[]).is_none());
        assert!(resolve_overload(&class.static_methods, "other", &[Value::Int(1)]).is_none());
    }

    #[test]
    fn registry_lookup_by_qualified_name() {
        let registry = TypeRegistry::new();
        registry.register(sample());
        assert!(registry.lookup("t.Sample").is_some());
        assert!(registry.lookup_in("t", "Sample").is_some());
        assert!(registry.lookup("t.Missing").is_none());
    }
}
