//! Global host-callback builtins installed into the root scope, distinct
//! from the prototype method tables in `prototypes` (those are reached via
//! property lookup on a value; these are free functions in scope by name).

use crate::error::EvalResult;
use crate::runtime::Runtime;
use crate::scope::Scope;
use crate::value::{FunctionValue, ResolvedParameter, Value};

/// Installs `print` into `scope`: writes the display form of its single
/// argument to stdout followed by a newline, and returns `Null`. This is the
/// one point where the evaluator actually performs I/O (spec.md's "only host
/// callbacks that do I/O suspend" carve-out).
pub fn install(scope: &Scope) {
    let print = FunctionValue::make_native(
        vec![ResolvedParameter { name: "value".to_string(), ty: None, default: None, rest: false }],
        None,
        |_runtime: &mut Runtime, args: Vec<Value>| -> EvalResult<Value> {
            let value = args.into_iter().next().unwrap_or(Value::Null);
            println!("{}", value.to_display_string());
            Ok(Value::Null)
        },
    );
    let _ = scope.declare("print", Value::Function(print), true, false);
}
