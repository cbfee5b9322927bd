//! End-to-end scenarios from spec.md §8, run through the public `Runtime`
//! API only.

use std::cell::RefCell;
use std::rc::Rc;

use snek_rt::error::Error;
use snek_rt::runtime::Runtime;
use snek_rt::scope::Scope;
use snek_rt::value::{FunctionValue, ResolvedParameter, Value};

fn new_runtime() -> Runtime {
    Runtime::new(Rc::new(|_runtime: &mut Runtime, path: &str| -> Result<Scope, Error> {
        Err(Error::without_position(format!("no module registered for '{}'", path)))
    }))
}

fn eval(source: &str) -> Value {
    let mut runtime = new_runtime();
    let scope = runtime.root_scope.child();
    runtime.run_script(&scope, source, "<test>").expect("script should evaluate without error")
}

#[test]
fn scenario_arithmetic_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Value::Int(7));
}

#[test]
fn scenario_list_reverse_join() {
    let value = eval("let xs = [1, 2, 3]\nxs.reverse().join(\",\")");
    assert_eq!(value, Value::string("3,2,1"));
}

#[test]
fn scenario_tail_recursive_fibonacci() {
    let source = "const f = (n: Int): Int => n < 2 ? n : f(n - 1) + f(n - 2)\nf(10)";
    assert_eq!(eval(source), Value::Int(55));
}

#[test]
fn scenario_record_destructuring() {
    let source = "let r = { a: 1, b: 2 }\nlet { a, b } = r\na + b";
    assert_eq!(eval(source), Value::Int(3));
}

#[test]
fn scenario_filter_map_chain() {
    let source = "let xs = [1, 2, 3, 4]\nxs.filter((e) => e % 2 == 0).map((e) => e * e)";
    let value = eval(source);
    assert_eq!(value, Value::list(vec![Value::Int(4), Value::Int(16)]));
    // spec §8 scenario 5: print(...) of this list must read "4, 16", not
    // the bracketed "[4, 16]" source form.
    assert_eq!(value.to_display_string(), "4, 16");
}

#[test]
fn scenario_star_import_with_alias() {
    let importer = Rc::new(|runtime: &mut Runtime, path: &str| -> Result<Scope, Error> {
        assert_eq!(path, "lib");
        let scope = runtime.root_scope.child();
        runtime.run_script(&scope, "export const greet = (who: String): String => \"hello, \" + who", path)?;
        Ok(scope)
    });
    let mut runtime = Runtime::new(importer);
    let scope = runtime.root_scope.child();
    let value = runtime
        .run_script(&scope, "import * as m from \"lib\"\nm.greet(\"world\")", "<test>")
        .expect("script should evaluate without error");
    assert_eq!(value, Value::string("hello, world"));
}

#[test]
fn tail_call_keeps_call_stack_depth_bounded() {
    let mut runtime = new_runtime();
    let depths: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let probe_depths = depths.clone();
    let probe = FunctionValue::make_native(
        vec![ResolvedParameter { name: "n".to_string(), ty: None, default: None, rest: false }],
        None,
        move |runtime: &mut Runtime, args: Vec<Value>| -> snek_rt::error::EvalResult<Value> {
            probe_depths.borrow_mut().push(runtime.call_stack().len());
            Ok(args.into_iter().next().unwrap_or(Value::Null))
        },
    );
    let scope = runtime.root_scope.child();
    scope.declare("probe", Value::Function(probe), true, false).unwrap();

    let source = "const f = (n: Int): Int => probe(n) > 0 ? f(n - 1) : 0\nf(50)";
    let result = runtime.run_script(&scope, source, "<test>").expect("script should evaluate without error");
    assert_eq!(result, Value::Int(0));

    let observed = depths.borrow();
    assert!(!observed.is_empty());
    assert!(observed.iter().all(|d| *d <= 2), "observed call-stack depths were not bounded: {:?}", observed);
}

#[test]
fn prototype_chain_property_holds_for_plain_values() {
    let mut runtime = new_runtime();
    let int_proto = snek_rt::evaluator::get_prototype_of(&runtime, &Value::Int(1));
    assert!(snek_rt::evaluator::get_property(&runtime, &int_proto, "toString").is_some());

    let record = Value::record(snek_rt::ordered_map::OrderedMap::new());
    let record_proto = snek_rt::evaluator::get_prototype_of(&runtime, &record);
    assert!(snek_rt::evaluator::get_property(&runtime, &record_proto, "keys").is_some());

    let scope = runtime.root_scope.child();
    let with_own_prototype = runtime
        .run_script(&scope, "let base = { greet: () => \"hi\" }\n{ [\"[[Prototype]]\"]: base }", "<test>")
        .unwrap();
    let resolved = snek_rt::evaluator::get_property(&runtime, &with_own_prototype, "greet");
    assert!(resolved.is_some(), "value with an own [[Prototype]] field should resolve methods through it");
}

#[test]
fn lexer_indent_dedent_balance_and_prefix_invariant() {
    use snek_compiler::compiler::lexer::Lexer;
    use snek_compiler::compiler::tokens::TokenKind;

    let source = "if true:\n  let x = 1\n  if x > 0:\n    x\nx\n";
    let tokens = Lexer::new(source, "<test>").tokenize().expect("well-formed source should lex");

    let mut depth: i64 = 0;
    let mut indents = 0usize;
    let mut dedents = 0usize;
    for token in &tokens {
        match token.kind {
            TokenKind::Indent => {
                depth += 1;
                indents += 1;
            }
            TokenKind::Dedent => {
                depth -= 1;
                dedents += 1;
            }
            _ => {}
        }
        assert!(depth >= 0, "Dedent count exceeded Indent count at some prefix");
    }
    assert_eq!(indents, dedents, "every Indent must have a matching Dedent before Eof");
}

#[test]
fn literal_expressions_round_trip_through_the_resolver() {
    use snek_rt::resolver::resolve_expression;
    use snek_rt::types::Type;

    let mut runtime = new_runtime();
    let scope = runtime.root_scope.child();
    for (source, expected) in [
        ("42", Value::Int(42)),
        ("3.5", Value::Float(3.5)),
        ("true", Value::Boolean(true)),
        ("null", Value::Null),
    ] {
        let value = runtime.run_script(&scope, source, "<test>").unwrap();
        assert_eq!(value, expected);

        let module = snek_compiler::parse(source, "<test>").unwrap();
        let expr = match &module.statements[0] {
            snek_compiler::compiler::ast::Statement::Expression { expression, .. } => expression,
            other => panic!("expected an expression statement, got {:?}", other),
        };
        let ty = resolve_expression(&scope, expr).expect("a literal must resolve to a concrete type");
        assert!(!matches!(ty, Type::Any), "literal types should never widen to Any");
    }
}
