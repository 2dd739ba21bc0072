//! End-to-end tests through the [`Evaluator`] facade.

mod runtime_tests;

use crate::{Bindings, Evaluator, Value};

/// Evaluate with no variables in scope.
pub(crate) fn eval(input: &str) -> Value {
    match Evaluator::new(Vec::<String>::new()).evaluate(input, &Bindings::default()) {
        Ok(value) => value,
        Err(e) => panic!("evaluating {input:?}: {e}"),
    }
}

/// Evaluate with the given variable bindings in scope.
pub(crate) fn eval_with(input: &str, bindings: &Bindings) -> Value {
    let evaluator = Evaluator::new(bindings.keys().cloned());
    match evaluator.evaluate(input, bindings) {
        Ok(value) => value,
        Err(e) => panic!("evaluating {input:?}: {e}"),
    }
}
