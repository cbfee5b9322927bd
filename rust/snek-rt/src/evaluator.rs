//! Tree-walking evaluator: expression/statement execution, destructuring
//! assignment, prototype-chain property lookup, and function invocation.

use crate::error::{Error, EvalResult, Frame, Signal};
use crate::ordered_map::OrderedMap;
use crate::resolver;
use crate::runtime::Runtime;
use crate::scope::Scope;
use crate::value::{FunctionValue, ResolvedParameter, Value};
use snek_compiler::compiler::ast::{
    self, AssignOp, BinaryOp, Element, Expression, Field, ImportSpecifier, JumpKind, Module, Statement, UnaryOp,
};
use snek_core::Position;
use std::rc::Rc;

fn err(position: &Position, message: impl Into<String>) -> Signal {
    Signal::Error(Error::at(position.clone(), message))
}

/// Run a whole module's statements in the given scope, returning the final
/// expression statement's value (used by the REPL).
pub fn execute_module(runtime: &mut Runtime, scope: &Scope, module: &Module) -> Result<Value, Error> {
    let mut last = Value::Null;
    for statement in &module.statements {
        match execute_statement(runtime, scope, statement) {
            Ok(Some(value)) => last = value,
            Ok(None) => {}
            Err(signal) => return Err(signal.into_unexpected_jump_error()),
        }
    }
    Ok(last)
}

pub fn execute_statement(runtime: &mut Runtime, scope: &Scope, statement: &Statement) -> EvalResult<Option<Value>> {
    match statement {
        Statement::Block { statements, .. } => {
            let inner = scope.child();
            let mut last = None;
            for s in statements {
                last = execute_statement(runtime, &inner, s)?;
            }
            Ok(last)
        }
        Statement::Expression { expression, .. } => {
            Ok(Some(evaluate_expression(runtime, scope, expression, false)?))
        }
        Statement::DeclareVar { variable, initializer, is_read_only, is_export, .. } => {
            let value = match initializer {
                Some(e) => evaluate_expression(runtime, scope, e, false)?,
                None => Value::Null,
            };
            bind_pattern(runtime, scope, variable, value, &BindMode::Declare {
                read_only: *is_read_only,
                exported: *is_export,
            })?;
            Ok(None)
        }
        Statement::DeclareType { name, value, is_export, position } => {
            let ty = resolver::resolve_type(scope, value).map_err(Signal::Error)?;
            scope.declare_type(name, ty, *is_export).map_err(|e| err(position, e.to_string()))?;
            Ok(None)
        }
        Statement::If { condition, consequent, alternate, .. } => {
            let cond = evaluate_expression(runtime, scope, condition, false)?;
            if cond.is_truthy() {
                execute_statement(runtime, scope, consequent)
            } else if let Some(alt) = alternate {
                execute_statement(runtime, scope, alt)
            } else {
                Ok(None)
            }
        }
        Statement::While { condition, body, .. } => {
            loop {
                let cond = evaluate_expression(runtime, scope, condition, false)?;
                if !cond.is_truthy() {
                    break;
                }
                match execute_statement(runtime, scope, body) {
                    Ok(_) => {}
                    Err(Signal::Jump { kind: JumpKind::Break, .. }) => break,
                    Err(Signal::Jump { kind: JumpKind::Continue, .. }) => continue,
                    Err(other) => return Err(other),
                }
            }
            Ok(None)
        }
        Statement::Jump { kind, value, position } => {
            let v = match value {
                Some(expr) => evaluate_expression(runtime, scope, expr, *kind == JumpKind::Return)?,
                None => Value::Null,
            };
            Err(Signal::Jump { kind: *kind, value: v, position: position.clone() })
        }
        Statement::Import { specifiers, path, position } => {
            execute_import(runtime, scope, specifiers, path, position)?;
            Ok(None)
        }
    }
}

fn execute_import(
    runtime: &mut Runtime,
    scope: &Scope,
    specifiers: &[ImportSpecifier],
    path: &Option<String>,
    position: &Position,
) -> EvalResult<()> {
    let path = path.as_ref().ok_or_else(|| err(position, "Import requires a 'from' clause."))?;
    let module_scope = runtime.import_module(path).map_err(Signal::Error)?;
    for specifier in specifiers {
        match specifier {
            ImportSpecifier::Named { name, alias, position } => {
                let local = alias.clone().unwrap_or_else(|| name.clone());
                if let Some(value) = module_scope.lookup(name, true) {
                    scope.declare(&local, value, false, false).map_err(|e| err(position, e.to_string()))?;
                } else if let Some(ty) = module_scope.lookup_type(name, true) {
                    scope.declare_type(&local, ty, false).map_err(|e| err(position, e.to_string()))?;
                } else {
                    return Err(err(position, format!("Module has no exported member '{}'.", name)));
                }
            }
            ImportSpecifier::Star { alias, position } => match alias {
                Some(alias_name) => {
                    let mut map = OrderedMap::new();
                    for (k, v) in module_scope.exported_variables() {
                        map.insert(k, v);
                    }
                    scope
                        .declare(alias_name, Value::record(map), false, false)
                        .map_err(|e| err(position, e.to_string()))?;
                }
                None => {
                    for (k, v) in module_scope.exported_variables() {
                        scope.declare(&k, v, false, false).map_err(|e| err(position, e.to_string()))?;
                    }
                    for (k, t) in module_scope.exported_types() {
                        scope.declare_type(&k, t, false).map_err(|e| err(position, e.to_string()))?;
                    }
                }
            },
        }
    }
    Ok(())
}

// ── Expressions ──

pub fn evaluate_expression(
    runtime: &mut Runtime,
    scope: &Scope,
    expr: &Expression,
    tail_call: bool,
) -> EvalResult<Value> {
    match expr {
        Expression::Null { .. } => Ok(Value::Null),
        Expression::Boolean { value, .. } => Ok(Value::Boolean(*value)),
        Expression::Int { value, .. } => Ok(runtime.make_int(*value)),
        Expression::Float { value, .. } => Ok(Value::Float(*value)),
        Expression::String { value, .. } => Ok(Value::string(value.clone())),
        Expression::Id { name, position } => {
            scope.lookup(name, false).ok_or_else(|| err(position, format!("Unknown identifier '{}'.", name)))
        }
        Expression::List { elements, .. } => evaluate_list_literal(runtime, scope, elements),
        Expression::Record { fields, .. } => evaluate_record_literal(runtime, scope, fields),
        Expression::Function { params, return_type, body, .. } => {
            let resolved_params = resolve_params(scope, params).map_err(Signal::Error)?;
            let resolved_return =
                return_type.as_ref().map(|t| resolver::resolve_type(scope, t)).transpose().map_err(Signal::Error)?;
            Ok(Value::Function(Rc::new(FunctionValue::Scripted {
                params: resolved_params,
                return_type: resolved_return,
                body: Rc::new((**body).clone()),
                closure: scope.clone(),
            })))
        }
        Expression::Assign { op, target, value, position } => {
            evaluate_assign(runtime, scope, *op, target, value, position)
        }
        Expression::Binary { op, left, right, position } => match op {
            BinaryOp::LogicalAnd => {
                let l = evaluate_expression(runtime, scope, left, false)?;
                if !l.is_truthy() { Ok(l) } else { evaluate_expression(runtime, scope, right, tail_call) }
            }
            BinaryOp::LogicalOr => {
                let l = evaluate_expression(runtime, scope, left, false)?;
                if l.is_truthy() { Ok(l) } else { evaluate_expression(runtime, scope, right, tail_call) }
            }
            BinaryOp::QuestionQuestion => {
                let l = evaluate_expression(runtime, scope, left, false)?;
                if !matches!(l, Value::Null) { Ok(l) } else { evaluate_expression(runtime, scope, right, tail_call) }
            }
            _ => {
                let l = evaluate_expression(runtime, scope, left, false)?;
                let r = evaluate_expression(runtime, scope, right, tail_call)?;
                call_method(runtime, &l, op.method_name(), vec![r], position.clone())
            }
        },
        Expression::Unary { op, operand, position } => {
            let v = evaluate_expression(runtime, scope, operand, false)?;
            match op {
                UnaryOp::Not => Ok(Value::Boolean(!v.is_truthy())),
                _ => call_method(runtime, &v, op.method_name(), vec![], position.clone()),
            }
        }
        Expression::Increment { pre, target, position } => {
            evaluate_step(runtime, scope, *pre, target, "+", position)
        }
        Expression::Decrement { pre, target, position } => {
            evaluate_step(runtime, scope, *pre, target, "-", position)
        }
        Expression::Ternary { condition, consequent, alternate, .. } => {
            let c = evaluate_expression(runtime, scope, condition, false)?;
            if c.is_truthy() {
                evaluate_expression(runtime, scope, consequent, tail_call)
            } else {
                evaluate_expression(runtime, scope, alternate, tail_call)
            }
        }
        Expression::Call { callee, conditional, arguments, position } => {
            let callee_value = evaluate_expression(runtime, scope, callee, false)?;
            if *conditional && matches!(callee_value, Value::Null) {
                return Ok(Value::Null);
            }
            let mut args = Vec::with_capacity(arguments.len());
            for element in arguments {
                match element {
                    Element::Value(e) => args.push(evaluate_expression(runtime, scope, e, false)?),
                    Element::Spread(e) => {
                        let v = evaluate_expression(runtime, scope, e, false)?;
                        match v {
                            Value::List(l) => args.extend(l.to_vec()),
                            _ => return Err(err(e.position(), "Spread argument must be a list.")),
                        }
                    }
                }
            }
            invoke_function(runtime, &callee_value, args, position.clone(), tail_call)
        }
        Expression::Property { receiver, name, conditional, position } => {
            let recv = evaluate_expression(runtime, scope, receiver, false)?;
            if *conditional && matches!(recv, Value::Null) {
                return Ok(Value::Null);
            }
            get_property(runtime, &recv, name)
                .ok_or_else(|| err(position, format!("No property '{}' on {}.", name, recv.kind_name())))
        }
        Expression::Subscript { receiver, index, conditional, position } => {
            let recv = evaluate_expression(runtime, scope, receiver, false)?;
            if *conditional && matches!(recv, Value::Null) {
                return Ok(Value::Null);
            }
            let idx = evaluate_expression(runtime, scope, index, false)?;
            call_method(runtime, &recv, "[]", vec![idx], position.clone())
        }
        Expression::Spread { position, .. } => {
            Err(err(position, "Spread may only appear in a list, call, or record literal."))
        }
    }
}

fn evaluate_step(
    runtime: &mut Runtime,
    scope: &Scope,
    pre: bool,
    target: &Expression,
    method: &str,
    position: &Position,
) -> EvalResult<Value> {
    let current = evaluate_expression(runtime, scope, target, false)?;
    let one = runtime.make_int(1);
    let updated = call_method(runtime, &current, method, vec![one], position.clone())?;
    bind_pattern(runtime, scope, target, updated.clone(), &BindMode::Assign)?;
    Ok(if pre { updated } else { current })
}

fn evaluate_assign(
    runtime: &mut Runtime,
    scope: &Scope,
    op: AssignOp,
    target: &Expression,
    value: &Expression,
    position: &Position,
) -> EvalResult<Value> {
    let result = match op {
        AssignOp::Assign => evaluate_expression(runtime, scope, value, false)?,
        AssignOp::LogicalAnd | AssignOp::LogicalOr | AssignOp::QuestionQuestion => {
            let current = evaluate_expression(runtime, scope, target, false)?;
            let should_eval_rhs = match op {
                AssignOp::LogicalAnd => current.is_truthy(),
                AssignOp::LogicalOr => !current.is_truthy(),
                AssignOp::QuestionQuestion => matches!(current, Value::Null),
                _ => unreachable!(),
            };
            if !should_eval_rhs {
                return Ok(current);
            }
            evaluate_expression(runtime, scope, value, false)?
        }
        _ => {
            let current = evaluate_expression(runtime, scope, target, false)?;
            let rhs = evaluate_expression(runtime, scope, value, false)?;
            call_method(runtime, &current, compound_assign_method(op), vec![rhs], position.clone())?
        }
    };
    bind_pattern(runtime, scope, target, result.clone(), &BindMode::Assign)?;
    Ok(result)
}

fn compound_assign_method(op: AssignOp) -> &'static str {
    use AssignOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        BitwiseAnd => "&",
        BitwiseOr => "|",
        BitwiseXor => "^",
        LeftShift => "<<",
        RightShift => ">>",
        Assign | LogicalAnd | LogicalOr | QuestionQuestion => {
            unreachable!("handled separately in evaluate_assign")
        }
    }
}

fn evaluate_list_literal(runtime: &mut Runtime, scope: &Scope, elements: &[Element]) -> EvalResult<Value> {
    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Element::Value(e) => items.push(evaluate_expression(runtime, scope, e, false)?),
            Element::Spread(e) => {
                let v = evaluate_expression(runtime, scope, e, false)?;
                match v {
                    Value::List(l) => items.extend(l.to_vec()),
                    _ => return Err(err(e.position(), "Spread in a list literal must be a list.")),
                }
            }
        }
    }
    Ok(Value::list(items))
}

fn evaluate_record_literal(runtime: &mut Runtime, scope: &Scope, fields: &[Field]) -> EvalResult<Value> {
    let mut map = OrderedMap::new();
    for field in fields {
        match field {
            Field::Computed { key, value, position } => {
                let k = evaluate_expression(runtime, scope, key, false)?;
                let key_str = match &k {
                    Value::String(s) => s.to_rust_string(),
                    _ => return Err(err(position, "Record keys must be strings.")),
                };
                let v = evaluate_expression(runtime, scope, value, false)?;
                map.insert(Rc::from(key_str.as_str()), v);
            }
            Field::Named { name, value, .. } => {
                let v = evaluate_expression(runtime, scope, value, false)?;
                map.insert(Rc::from(name.as_str()), v);
            }
            Field::Shorthand { name, position } => {
                let v = scope.lookup(name, false).ok_or_else(|| err(position, format!("Unknown identifier '{}'.", name)))?;
                map.insert(Rc::from(name.as_str()), v);
            }
            Field::Function { name, params, return_type, body, .. } => {
                let resolved_params = resolve_params(scope, params).map_err(Signal::Error)?;
                let resolved_return =
                    return_type.as_ref().map(|t| resolver::resolve_type(scope, t)).transpose().map_err(Signal::Error)?;
                let func = FunctionValue::Scripted {
                    params: resolved_params,
                    return_type: resolved_return,
                    body: Rc::new((**body).clone()),
                    closure: scope.clone(),
                };
                map.insert(Rc::from(name.as_str()), Value::Function(Rc::new(func)));
            }
            Field::Spread { value, position } => {
                let v = evaluate_expression(runtime, scope, value, false)?;
                match v {
                    Value::Record(r) => {
                        for (k, val) in r.own_entries() {
                            map.insert(k, val);
                        }
                    }
                    _ => return Err(err(position, "Spread in a record literal must be a record.")),
                }
            }
        }
    }
    Ok(Value::record(map))
}

fn resolve_params(scope: &Scope, params: &[ast::Parameter]) -> Result<Vec<ResolvedParameter>, Error> {
    params
        .iter()
        .map(|p| {
            Ok(ResolvedParameter {
                name: p.name.clone(),
                ty: p.type_annotation.as_ref().map(|t| resolver::resolve_type(scope, t)).transpose()?,
                default: p.default.clone(),
                rest: p.rest,
            })
        })
        .collect()
}

// ── Assignment patterns (§4.4.2) ──

enum BindMode {
    Assign,
    Declare { read_only: bool, exported: bool },
}

fn bind_pattern(
    runtime: &mut Runtime,
    scope: &Scope,
    pattern: &Expression,
    value: Value,
    mode: &BindMode,
) -> EvalResult<()> {
    match pattern {
        Expression::Id { name, position } => match mode {
            BindMode::Assign => scope.set(name, value).map_err(|e| err(position, e.to_string())),
            BindMode::Declare { read_only, exported } => {
                scope.declare(name, value, *read_only, *exported).map_err(|e| err(position, e.to_string()))
            }
        },
        Expression::Property { .. } | Expression::Subscript { .. } => match mode {
            BindMode::Assign => assign_lvalue(runtime, scope, pattern, value),
            BindMode::Declare { .. } => Err(err(pattern.position(), "Cannot declare a property as a variable.")),
        },
        Expression::List { elements, position } => bind_list_pattern(runtime, scope, elements, value, mode, position),
        Expression::Record { fields, position } => bind_record_pattern(runtime, scope, fields, value, mode, position),
        _ => Err(err(pattern.position(), "Cannot assign to this expression.")),
    }
}

fn assign_lvalue(runtime: &mut Runtime, scope: &Scope, pattern: &Expression, value: Value) -> EvalResult<()> {
    match pattern {
        Expression::Property { receiver, name, position, .. } => {
            let recv = evaluate_expression(runtime, scope, receiver, false)?;
            match &recv {
                Value::Record(r) => {
                    r.set_own(Rc::from(name.as_str()), value).map_err(|e| err(position, e))
                }
                _ => Err(err(position, format!("Cannot assign a property on a {}.", recv.kind_name()))),
            }
        }
        Expression::Subscript { receiver, index, position, .. } => {
            let recv = evaluate_expression(runtime, scope, receiver, false)?;
            let idx = evaluate_expression(runtime, scope, index, false)?;
            match (&recv, &idx) {
                (Value::List(l), Value::Int(i)) => {
                    let index = usize::try_from(*i).map_err(|_| err(position, "Index out of bounds."))?;
                    l.set(index, value).map_err(|e| err(position, e))
                }
                (Value::Record(r), Value::String(s)) => {
                    r.set_own(Rc::from(s.to_rust_string().as_str()), value).map_err(|e| err(position, e))
                }
                (Value::List(_), _) => Err(err(position, "List index must be an Int.")),
                (Value::Record(_), _) => Err(err(position, "Record key must be a String.")),
                _ => Err(err(position, format!("Cannot assign an index on a {}.", recv.kind_name()))),
            }
        }
        _ => unreachable!("assign_lvalue only called for Property/Subscript patterns"),
    }
}

fn bind_list_pattern(
    runtime: &mut Runtime,
    scope: &Scope,
    elements: &[Element],
    value: Value,
    mode: &BindMode,
    position: &Position,
) -> EvalResult<()> {
    let list = match &value {
        Value::List(l) => l.clone(),
        _ => return Err(err(position, "Cannot destructure a non-list value.")),
    };
    let len = list.length();
    let mut idx = 0;
    for element in elements {
        match element {
            Element::Value(pat) => {
                if idx >= len {
                    return Err(err(position, "Not enough values to destructure."));
                }
                let v = list.at(idx).unwrap();
                bind_pattern(runtime, scope, pat, v, mode)?;
                idx += 1;
            }
            Element::Spread(pat) => {
                let rest: Vec<Value> = (idx..len).filter_map(|j| list.at(j)).collect();
                bind_pattern(runtime, scope, pat, Value::list(rest), mode)?;
                idx = len;
            }
        }
    }
    Ok(())
}

fn bind_record_pattern(
    runtime: &mut Runtime,
    scope: &Scope,
    fields: &[Field],
    value: Value,
    mode: &BindMode,
    position: &Position,
) -> EvalResult<()> {
    let record = match &value {
        Value::Record(r) => r.clone(),
        _ => return Err(err(position, "Cannot destructure a non-record value.")),
    };
    let mut consumed: Vec<Rc<str>> = Vec::new();
    for field in fields {
        match field {
            Field::Named { name, value: pat, position } => {
                let v = get_property(runtime, &Value::Record(record.clone()), name)
                    .ok_or_else(|| err(position, format!("Missing property '{}'.", name)))?;
                bind_pattern(runtime, scope, pat, v, mode)?;
                consumed.push(Rc::from(name.as_str()));
            }
            Field::Shorthand { name, position } => {
                let v = get_property(runtime, &Value::Record(record.clone()), name)
                    .ok_or_else(|| err(position, format!("Missing property '{}'.", name)))?;
                bind_pattern(runtime, scope, &Expression::Id { position: position.clone(), name: name.clone() }, v, mode)?;
                consumed.push(Rc::from(name.as_str()));
            }
            Field::Spread { value: pat, .. } => {
                let mut map = OrderedMap::new();
                for (k, v) in record.own_entries() {
                    if !consumed.contains(&k) {
                        map.insert(k, v);
                    }
                }
                bind_pattern(runtime, scope, pat, Value::record(map), mode)?;
            }
            Field::Computed { position, .. } | Field::Function { position, .. } => {
                return Err(err(position, "Invalid destructuring field."));
            }
        }
    }
    Ok(())
}

// ── Prototype chain & method dispatch (§4.4.3) ──

pub fn get_prototype_of(runtime: &Runtime, value: &Value) -> Value {
    match value {
        Value::Boolean(_) => runtime.prototypes.boolean.clone(),
        Value::Int(_) => runtime.prototypes.int.clone(),
        Value::Float(_) => runtime.prototypes.float.clone(),
        Value::String(_) => runtime.prototypes.string.clone(),
        Value::List(_) => runtime.prototypes.list.clone(),
        Value::Function(_) => runtime.prototypes.function.clone(),
        Value::Null => runtime.prototypes.object.clone(),
        Value::Record(r) => r.prototype().unwrap_or_else(|| runtime.prototypes.record.clone()),
    }
}

pub fn get_property(runtime: &Runtime, value: &Value, name: &str) -> Option<Value> {
    if let Value::Record(r) = value {
        if let Some(v) = r.get_own(name) {
            return Some(v);
        }
    }
    let mut current = get_prototype_of(runtime, value);
    loop {
        let Value::Record(r) = &current else { return None };
        if let Some(v) = r.get_own(name) {
            return Some(match v {
                Value::Function(f) => {
                    Value::Function(Rc::new(FunctionValue::Bound { this: value.clone(), inner: f }))
                }
                other => other,
            });
        }
        match r.prototype() {
            Some(next) => current = next,
            None => return None,
        }
    }
}

pub fn call_method(
    runtime: &mut Runtime,
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
    position: Position,
) -> EvalResult<Value> {
    let method = get_property(runtime, receiver, name)
        .ok_or_else(|| err(&position, format!("No method '{}' on {}.", name, receiver.kind_name())))?;
    invoke_function(runtime, &method, args, position, false)
}

// ── Function invocation (§4.4.4) ──

pub fn invoke_function(
    runtime: &mut Runtime,
    func: &Value,
    mut args: Vec<Value>,
    position: Position,
    tail_call: bool,
) -> EvalResult<Value> {
    let function = match func {
        Value::Function(f) => f.clone(),
        _ => return Err(err(&position, format!("{} is not callable.", func.kind_name()))),
    };
    if let FunctionValue::Bound { this, inner } = &*function {
        args.insert(0, this.clone());
        return invoke_function_value(runtime, inner.clone(), args, position, tail_call);
    }
    invoke_function_value(runtime, function, args, position, tail_call)
}

fn invoke_function_value(
    runtime: &mut Runtime,
    function: Rc<FunctionValue>,
    args: Vec<Value>,
    position: Position,
    tail_call: bool,
) -> EvalResult<Value> {
    let (params, default_scope): (Vec<ResolvedParameter>, Scope) = match &*function {
        FunctionValue::Native { params, .. } => (params.clone(), runtime.root_scope.clone()),
        FunctionValue::Scripted { params, closure, .. } => (params.clone(), closure.clone()),
        FunctionValue::Bound { .. } => unreachable!("Bound already unwrapped"),
    };
    let bound_args = bind_arguments(runtime, &params, args, &position, &default_scope)?;

    let pushed = !(tail_call && !runtime.call_stack().is_empty());
    let frame = Frame { position: position.clone(), callee_name: None, arity: params.len() };
    if pushed {
        runtime.push_frame(frame);
    } else {
        runtime.replace_top_frame(frame);
    }

    let result = match &*function {
        FunctionValue::Native { callback, .. } => (callback)(runtime, bound_args),
        FunctionValue::Scripted { body, closure, .. } => {
            let call_scope = closure.child();
            for (param, value) in params.iter().zip(bound_args.into_iter()) {
                call_scope
                    .declare(&param.name, value, false, false)
                    .map_err(|e| err(&position, e.to_string()))?;
            }
            match execute_statement(runtime, &call_scope, body) {
                Ok(_) => Ok(Value::Null),
                Err(Signal::Jump { kind: JumpKind::Return, value, .. }) => Ok(value),
                Err(Signal::Jump { kind, position: p, .. }) => {
                    let word = if kind == JumpKind::Break { "break" } else { "continue" };
                    Err(err(&p, format!("Unexpected `{}`.", word)))
                }
                Err(other) => Err(other),
            }
        }
        FunctionValue::Bound { .. } => unreachable!(),
    };

    if pushed {
        runtime.pop_frame();
    }
    result
}

fn bind_arguments(
    runtime: &mut Runtime,
    params: &[ResolvedParameter],
    args: Vec<Value>,
    position: &Position,
    default_scope: &Scope,
) -> EvalResult<Vec<Value>> {
    let mut bound = Vec::with_capacity(params.len());
    let mut idx = 0;
    for param in params {
        if param.rest {
            bound.push(Value::list(args[idx.min(args.len())..].to_vec()));
            idx = args.len();
            continue;
        }
        let value = if idx < args.len() {
            let v = args[idx].clone();
            idx += 1;
            v
        } else if let Some(default_expr) = &param.default {
            evaluate_expression(runtime, default_scope, default_expr, false)?
        } else {
            return Err(err(position, "Too few arguments."));
        };
        if let Some(ty) = &param.ty {
            if !ty.accepts_value(&value) {
                return Err(err(
                    position,
                    format!("Argument '{}' has the wrong type; got {}.", param.name, value.kind_name()),
                ));
            }
        }
        bound.push(value);
    }
    Ok(bound)
}
