//! Methods, statics, casts, arrays, and user-registered classes.

use pretty_assertions::assert_eq;

use super::{eval, eval_with};
use crate::{Bindings, ClassDef, Evaluator, Extensions, Instance, ParamType, Value};

#[test]
fn string_methods() {
    assert_eq!(eval("\"Hello\".length()"), Value::Int(5));
    assert_eq!(eval("\"Hello\".substring(1, 3)"), Value::Str("el".into()));
    assert_eq!(eval("\"Hello\".substring(3)"), Value::Str("lo".into()));
    assert_eq!(eval("\"a,b\".indexOf(\",\")"), Value::Int(1));
    assert_eq!(eval("\"a,b\".indexOf(\"z\")"), Value::Int(-1));
    assert_eq!(eval("\"abc\".toUpperCase()"), Value::Str("ABC".into()));
    assert_eq!(eval("\" x \".trim().length()"), Value::Int(1));
    assert_eq!(eval("\"abc\".charAt(1)"), Value::Char('b'));
    assert_eq!(eval("\"f.java\".endsWith(\".java\")"), Value::Bool(true));
    assert_eq!(eval("\"a-b\".replace(\"-\", \"+\")"), Value::Str("a+b".into()));
}

#[test]
fn property_access_falls_back_to_accessor_methods() {
    // No `length` field on a string; the nullary method fills in.
    assert_eq!(eval("\"abc\".length"), Value::Int(3));

    let mut evaluator = Evaluator::new(Vec::<String>::new());
    evaluator.register_class(
        version_class().method("getLabel", &[], |_, _| Ok(Value::Str("v2".into()))),
    );
    evaluator.add_import("util.Version");
    let bindings = Bindings::default();
    // `major` is a real field; `label` goes through getLabel().
    assert_eq!(
        evaluator.evaluate("new Version(2).major", &bindings).map_err(|e| e.to_string()),
        Ok(Value::Int(2))
    );
    assert_eq!(
        evaluator.evaluate("new Version(2).label", &bindings).map_err(|e| e.to_string()),
        Ok(Value::Str("v2".into()))
    );
}

#[test]
fn wrapper_statics() {
    assert_eq!(eval("Integer.MAX_VALUE"), Value::Int(i32::MAX));
    assert_eq!(eval("Integer.parseInt(\"42\")"), Value::Int(42));
    assert_eq!(eval("Integer.parseInt(\"ff\", 16)"), Value::Int(255));
    assert_eq!(eval("Integer.toHexString(255)"), Value::Str("ff".into()));
    assert_eq!(eval("Long.parseLong(\"9\") + 1"), Value::Long(10));
    assert_eq!(eval("Double.parseDouble(\"1.5\") * 2"), Value::Double(3.0));
    assert_eq!(eval("Boolean.parseBoolean(\"TRUE\")"), Value::Bool(true));
    assert_eq!(eval("String.valueOf(42)"), Value::Str("42".into()));
    assert_eq!(eval("Character.isDigit('7')"), Value::Bool(true));
}

#[test]
fn math_overloads_pick_the_closest_signature() {
    assert_eq!(eval("Math.abs(-5)"), Value::Int(5));
    assert_eq!(eval("Math.abs(-5L)"), Value::Long(5));
    assert_eq!(eval("Math.abs(-5.5)"), Value::Double(5.5));
    assert_eq!(eval("Math.max(2, 3)"), Value::Int(3));
    assert_eq!(eval("Math.max(2.0, 3.5)"), Value::Double(3.5));
    assert_eq!(eval("Math.round(2.5)"), Value::Long(3));
}

#[test]
fn instanceof_checks_the_runtime_type() {
    assert_eq!(eval("\"s\" instanceof String"), Value::Bool(true));
    assert_eq!(eval("1 instanceof String"), Value::Bool(false));
    assert_eq!(eval("1 instanceof int"), Value::Bool(true));
    assert_eq!(eval("1L instanceof int"), Value::Bool(false));
    assert_eq!(eval("null instanceof String"), Value::Bool(false));
}

#[test]
fn casts_convert_numerics() {
    assert_eq!(eval("(long) 1"), Value::Long(1));
    assert_eq!(eval("(int) 3.9"), Value::Int(3));
    assert_eq!(eval("(char) 65"), Value::Char('A'));
    assert_eq!(eval("(byte) 300"), Value::Byte(44));
    assert_eq!(eval("(double) 1"), Value::Double(1.0));
    assert_eq!(eval("(int) 'a'"), Value::Int(97));
    let evaluator = Evaluator::new(Vec::<String>::new());
    assert!(evaluator
        .evaluate("(boolean) 1", &Bindings::default())
        .is_err());
}

#[test]
fn string_builder_accumulates() {
    assert_eq!(
        eval("new StringBuilder(\"a\").append(1).append(\"b\").toString()"),
        Value::Str("a1b".into())
    );
    assert_eq!(eval("new StringBuilder().length()"), Value::Int(0));
}

#[test]
fn untaken_branch_has_no_side_effects() {
    let sb = eval("new StringBuilder(\"z\")");
    let mut bindings = Bindings::default();
    bindings.insert("sb".to_owned(), sb);
    assert_eq!(
        eval_with("true ? 1 : sb.append(\"x\").length()", &bindings),
        Value::Int(1)
    );
    assert_eq!(eval_with("sb.toString()", &bindings), Value::Str("z".into()));
    // The taken branch does mutate.
    assert_eq!(
        eval_with("false ? 1 : sb.append(\"x\").length()", &bindings),
        Value::Int(2)
    );
    assert_eq!(eval_with("sb.toString()", &bindings), Value::Str("zx".into()));
}

#[test]
fn arrays_allocate_with_defaults() {
    assert_eq!(eval("new int[3].length"), Value::Int(3));
    assert_eq!(eval("(new int[3])[0]"), Value::Int(0));
    assert_eq!(eval("(new boolean[1])[0]"), Value::Bool(false));
    assert_eq!(eval("new int[2][3].length"), Value::Int(2));
    assert_eq!(eval("(new int[2][3])[1].length"), Value::Int(3));
    // An empty bracket pair leaves the inner arrays unallocated.
    assert_eq!(eval("(new int[2][])[0]"), Value::Null);
}

#[test]
fn array_index_errors() {
    let evaluator = Evaluator::new(Vec::<String>::new());
    let err = evaluator
        .evaluate("(new int[2])[5]", &Bindings::default())
        .expect_err("out of bounds");
    assert!(err.to_string().contains("out of bounds"), "{err}");
    assert!(evaluator
        .evaluate("new int[-1]", &Bindings::default())
        .is_err());
}

#[test]
fn indexing_a_bound_array() {
    let mut bindings = Bindings::default();
    bindings.insert(
        "values".to_owned(),
        Value::array(vec![Value::Int(10), Value::Int(20)]),
    );
    assert_eq!(eval_with("values[1]", &bindings), Value::Int(20));
    assert_eq!(eval_with("values.length", &bindings), Value::Int(2));
}

fn version_class() -> ClassDef {
    ClassDef::new("util.Version")
        .static_value("DEFAULT", Value::Str("0.0".into()))
        .constructor(&[ParamType::Int], |args| {
            let class = ClassDef::new("util.Version");
            let instance = Instance::new(std::rc::Rc::new(class));
            instance
                .fields
                .borrow_mut()
                .insert("major".to_owned(), args[0].clone());
            Ok(Value::object(instance))
        })
        .static_method("latest", &[], |_, _| Ok(Value::Str("9.9".into())))
}

#[test]
fn registered_classes_resolve_by_import_or_qualified_name() {
    let mut evaluator = Evaluator::new(Vec::<String>::new());
    evaluator.register_class(version_class());
    // Fully qualified, no import needed.
    assert_eq!(
        evaluator.evaluate("util.Version.DEFAULT", &Bindings::default()).map_err(|e| e.to_string()),
        Ok(Value::Str("0.0".into()))
    );
    let err = evaluator.parse("Version.DEFAULT").expect_err("not imported");
    assert!(err.to_string().contains("Version"), "{err}");

    evaluator.add_import("util.Version");
    assert_eq!(
        evaluator.evaluate("Version.latest()", &Bindings::default()).map_err(|e| e.to_string()),
        Ok(Value::Str("9.9".into()))
    );
    assert_eq!(
        evaluator.evaluate("new Version(2).major", &Bindings::default()).map_err(|e| e.to_string()),
        Ok(Value::Int(2))
    );
}

#[test]
fn on_demand_imports_search_in_order() {
    let mut evaluator = Evaluator::new(Vec::<String>::new());
    evaluator.register_class(version_class());
    evaluator.add_on_demand_import("util");
    assert_eq!(
        evaluator.evaluate("Version.DEFAULT", &Bindings::default()).map_err(|e| e.to_string()),
        Ok(Value::Str("0.0".into()))
    );
}

#[test]
fn nested_classes_chain_off_their_outer_type() {
    let evaluator = Evaluator::new(Vec::<String>::new());
    evaluator.register_class(
        ClassDef::new("conf.Outer")
            .nested(ClassDef::new("conf.Outer.Inner").static_value("NAME", Value::Str("in".into()))),
    );
    assert_eq!(
        evaluator.evaluate("conf.Outer.Inner.NAME", &Bindings::default()).map_err(|e| e.to_string()),
        Ok(Value::Str("in".into()))
    );
}

#[test]
fn constructor_shorthand_extensions() {
    let evaluator = Evaluator::new(Vec::<String>::new())
        .with_extensions(Extensions::default() | Extensions::NEW_WITHOUT_KEYWORD);
    assert_eq!(
        evaluator
            .evaluate("StringBuilder(\"a\").toString()", &Bindings::default())
            .map_err(|e| e.to_string()),
        Ok(Value::Str("a".into()))
    );
}
