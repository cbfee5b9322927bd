//! Built-in prototype registry: the nine root prototypes walked by
//! `evaluator::get_property`, and the operator method table of §4.4.6.

use crate::error::{Error, EvalResult, Signal};
use crate::evaluator::invoke_function;
use crate::ordered_map::OrderedMap;
use crate::runtime::Runtime;
use crate::value::{FunctionValue, ListValue, RecordValue, ResolvedParameter, StringValue, Value};
use snek_core::Position;
use std::rc::Rc;

pub struct Prototypes {
    pub object: Value,
    pub boolean: Value,
    pub int: Value,
    pub float: Value,
    pub function: Value,
    pub list: Value,
    pub record: Value,
    pub string: Value,
}

fn native(
    name: &'static str,
    params: &[&str],
    rest_last: bool,
    f: impl Fn(&mut Runtime, Vec<Value>) -> EvalResult<Value> + 'static,
) -> Value {
    let _ = name;
    let last = params.len().saturating_sub(1);
    let resolved = params
        .iter()
        .enumerate()
        .map(|(i, n)| ResolvedParameter { name: n.to_string(), ty: None, default: None, rest: rest_last && i == last })
        .collect();
    Value::Function(FunctionValue::make_native(resolved, None, f))
}

fn record_of(entries: Vec<(&str, Value)>, prototype: Option<Value>) -> Value {
    let mut map = OrderedMap::new();
    for (k, v) in entries {
        map.insert(Rc::from(k), v);
    }
    if let Some(p) = prototype {
        map.insert(Rc::from("[[Prototype]]"), p);
    }
    Value::record(map)
}

fn plain_err(message: impl Into<String>) -> Signal {
    Signal::Error(Error::without_position(message))
}

impl Prototypes {
    pub fn install() -> Prototypes {
        let object = record_of(
            vec![
                ("toString", native("toString", &["this"], false, |_rt, args| {
                    Ok(Value::string(args[0].to_display_string()))
                })),
                ("==", native("==", &["this", "other"], false, |_rt, args| {
                    Ok(Value::Boolean(args[0] == args[1]))
                })),
                ("!=", native("!=", &["this", "other"], false, |rt, args| {
                    let equal = crate::evaluator::call_method(
                        rt,
                        &args[0],
                        "==",
                        vec![args[1].clone()],
                        Position::synthetic(),
                    )?;
                    Ok(Value::Boolean(!equal.is_truthy()))
                })),
            ],
            None,
        );

        let number = record_of(numeric_methods(), Some(object.clone()));
        let int = record_of(vec![], Some(number.clone()));
        let float = record_of(vec![], Some(number));
        let boolean = record_of(vec![], Some(object.clone()));
        let function = record_of(vec![], Some(object.clone()));
        let list = record_of(list_methods(), Some(object.clone()));
        let string = record_of(string_methods(), Some(object.clone()));
        let record = record_of(record_methods(), Some(object.clone()));

        Prototypes { object, boolean, int, float, function, list, record, string }
    }
}

// ── Number ──

fn as_f64(v: &Value) -> Result<f64, String> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        _ => Err(format!("Expected a Number, got {}.", v.kind_name())),
    }
}

fn numeric_binary(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, String> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => match int_op(*x, *y) {
            Some(r) => Ok(Value::Int(r)),
            None => Ok(Value::Float(float_op(*x as f64, *y as f64))),
        },
        _ => {
            let x = as_f64(a)?;
            let y = as_f64(b)?;
            Ok(Value::Float(float_op(x, y)))
        }
    }
}

fn numeric_div(a: &Value, b: &Value) -> Result<Value, String> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        if *y == 0 {
            return Ok(Value::Float(f64::INFINITY));
        }
        if x % y == 0 {
            return Ok(Value::Int(x / y));
        }
        return Ok(Value::Float(*x as f64 / *y as f64));
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    Ok(Value::Float(x / y))
}

fn float_mod(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        return f64::NAN;
    }
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn numeric_mod(a: &Value, b: &Value) -> Result<Value, String> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        if *y == 0 {
            return Err("Modulo by zero.".to_string());
        }
        return Ok(Value::Int(x % y));
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    Ok(Value::Float(float_mod(x, y)))
}

fn require_ints(a: &Value, b: &Value) -> Result<(i64, i64), String> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok((*x, *y)),
        _ => Err("Bitwise operators require Int operands.".to_string()),
    }
}

fn binary_numeric(params: &'static [&'static str], f: fn(&Value, &Value) -> Result<Value, String>) -> Value {
    native("", params, false, move |_rt, args| f(&args[0], &args[1]).map_err(plain_err))
}

fn numeric_methods() -> Vec<(&'static str, Value)> {
    vec![
        ("+", binary_numeric(&["this", "other"], |a, b| numeric_binary(a, b, i64::checked_add, |x, y| x + y))),
        ("-", binary_numeric(&["this", "other"], |a, b| numeric_binary(a, b, i64::checked_sub, |x, y| x - y))),
        ("*", binary_numeric(&["this", "other"], |a, b| numeric_binary(a, b, i64::checked_mul, |x, y| x * y))),
        ("/", binary_numeric(&["this", "other"], numeric_div)),
        ("%", binary_numeric(&["this", "other"], numeric_mod)),
        ("&", binary_numeric(&["this", "other"], |a, b| {
            let (x, y) = require_ints(a, b)?;
            Ok(Value::Int(x & y))
        })),
        ("|", binary_numeric(&["this", "other"], |a, b| {
            let (x, y) = require_ints(a, b)?;
            Ok(Value::Int(x | y))
        })),
        ("^", binary_numeric(&["this", "other"], |a, b| {
            let (x, y) = require_ints(a, b)?;
            Ok(Value::Int(x ^ y))
        })),
        ("<<", binary_numeric(&["this", "other"], |a, b| {
            let (x, y) = require_ints(a, b)?;
            Ok(Value::Int(x.wrapping_shl((y & 63) as u32)))
        })),
        (">>", binary_numeric(&["this", "other"], |a, b| {
            let (x, y) = require_ints(a, b)?;
            Ok(Value::Int(x.wrapping_shr((y & 63) as u32)))
        })),
        ("<", binary_numeric(&["this", "other"], |a, b| Ok(Value::Boolean(as_f64(a)? < as_f64(b)?)))),
        (">", binary_numeric(&["this", "other"], |a, b| Ok(Value::Boolean(as_f64(a)? > as_f64(b)?)))),
        ("<=", binary_numeric(&["this", "other"], |a, b| Ok(Value::Boolean(as_f64(a)? <= as_f64(b)?)))),
        (">=", binary_numeric(&["this", "other"], |a, b| Ok(Value::Boolean(as_f64(a)? >= as_f64(b)?)))),
        ("~", native("~", &["this"], false, |_rt, args| match &args[0] {
            Value::Int(x) => Ok(Value::Int(!x)),
            _ => Err(plain_err("Bitwise `~` requires an Int operand.")),
        })),
        ("+@", native("+@", &["this"], false, |_rt, args| match &args[0] {
            Value::Int(_) | Value::Float(_) => Ok(args[0].clone()),
            other => Err(plain_err(format!("Expected a Number, got {}.", other.kind_name()))),
        })),
        ("-@", native("-@", &["this"], false, |_rt, args| match &args[0] {
            Value::Int(x) => Ok(Value::Int(-x)),
            Value::Float(x) => Ok(Value::Float(-x)),
            other => Err(plain_err(format!("Expected a Number, got {}.", other.kind_name()))),
        })),
    ]
}

// ── List ──

fn as_list(v: &Value) -> EvalResult<Rc<ListValue>> {
    match v {
        Value::List(l) => Ok(l.clone()),
        _ => Err(plain_err(format!("Expected a List, got {}.", v.kind_name()))),
    }
}

fn list_methods() -> Vec<(&'static str, Value)> {
    vec![
        ("[]", native("[]", &["this", "index"], false, |_rt, args| {
            let list = as_list(&args[0])?;
            match &args[1] {
                Value::Int(i) if *i >= 0 => list.at(*i as usize).ok_or_else(|| plain_err("Index out of bounds.")),
                Value::Int(_) => Err(plain_err("Index out of bounds.")),
                other => Err(plain_err(format!("List index must be an Int, got {}.", other.kind_name()))),
            }
        })),
        ("+", native("+", &["this", "other"], false, |_rt, args| {
            let a = as_list(&args[0])?;
            let b = as_list(&args[1])?;
            Ok(Value::List(Rc::new(ListValue::Concat(a, b))))
        })),
        ("*", native("*", &["this", "count"], false, |_rt, args| {
            let a = as_list(&args[0])?;
            match &args[1] {
                Value::Int(n) if *n >= 0 => Ok(Value::List(Rc::new(ListValue::Repeat(a, *n as usize)))),
                other => Err(plain_err(format!("Expected a non-negative Int, got {}.", other.kind_name()))),
            }
        })),
        ("filter", native("filter", &["this", "predicate"], false, |rt, args| {
            let list = as_list(&args[0])?;
            let f = args[1].clone();
            let mut out = Vec::new();
            for i in 0..list.length() {
                let v = list.at(i).unwrap();
                let keep = invoke_function(rt, &f, vec![v.clone()], Position::synthetic(), false)?;
                if keep.is_truthy() {
                    out.push(v);
                }
            }
            Ok(Value::list(out))
        })),
        ("map", native("map", &["this", "mapper"], false, |rt, args| {
            let list = as_list(&args[0])?;
            let f = args[1].clone();
            let mut out = Vec::with_capacity(list.length());
            for i in 0..list.length() {
                let v = list.at(i).unwrap();
                out.push(invoke_function(rt, &f, vec![v], Position::synthetic(), false)?);
            }
            Ok(Value::list(out))
        })),
        ("reduce", native("reduce", &["this", "reducer", "initial"], false, |rt, args| {
            let list = as_list(&args[0])?;
            let f = args[1].clone();
            let mut acc = args[2].clone();
            for i in 0..list.length() {
                let v = list.at(i).unwrap();
                acc = invoke_function(rt, &f, vec![acc, v], Position::synthetic(), false)?;
            }
            Ok(acc)
        })),
        ("forEach", native("forEach", &["this", "action"], false, |rt, args| {
            let list = as_list(&args[0])?;
            let f = args[1].clone();
            for i in 0..list.length() {
                let v = list.at(i).unwrap();
                invoke_function(rt, &f, vec![v], Position::synthetic(), false)?;
            }
            Ok(Value::Null)
        })),
        ("includes", native("includes", &["this", "target"], false, |_rt, args| {
            let list = as_list(&args[0])?;
            let target = &args[1];
            Ok(Value::Boolean((0..list.length()).any(|i| list.at(i).as_ref() == Some(target))))
        })),
        ("indexOf", native("indexOf", &["this", "target"], false, |_rt, args| {
            let list = as_list(&args[0])?;
            let target = &args[1];
            let found = (0..list.length()).find(|&i| list.at(i).as_ref() == Some(target));
            Ok(Value::Int(found.map(|i| i as i64).unwrap_or(-1)))
        })),
        ("lastIndexOf", native("lastIndexOf", &["this", "target"], false, |_rt, args| {
            let list = as_list(&args[0])?;
            let target = &args[1];
            let found = (0..list.length()).rev().find(|&i| list.at(i).as_ref() == Some(target));
            Ok(Value::Int(found.map(|i| i as i64).unwrap_or(-1)))
        })),
        ("join", native("join", &["this", "separator"], false, |_rt, args| {
            let list = as_list(&args[0])?;
            let sep = match &args[1] {
                Value::String(s) => s.to_rust_string(),
                other => return Err(plain_err(format!("Expected a String separator, got {}.", other.kind_name()))),
            };
            let parts: Vec<String> = (0..list.length()).map(|i| list.at(i).unwrap().to_display_string()).collect();
            Ok(Value::string(parts.join(&sep)))
        })),
        ("reverse", native("reverse", &["this"], false, |_rt, args| {
            let list = as_list(&args[0])?;
            Ok(Value::List(Rc::new(ListValue::Reversed(list))))
        })),
        ("size", native("size", &["this"], false, |rt, args| {
            let list = as_list(&args[0])?;
            Ok(rt.make_int(list.length() as i64))
        })),
    ]
}

// ── String ──

fn as_string(v: &Value) -> EvalResult<Rc<StringValue>> {
    match v {
        Value::String(s) => Ok(s.clone()),
        _ => Err(plain_err(format!("Expected a String, got {}.", v.kind_name()))),
    }
}

fn find_substring(haystack: &[char], needle: &[char], from_end: bool) -> Option<usize> {
    if needle.is_empty() {
        return Some(if from_end { haystack.len() } else { 0 });
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let range: Box<dyn Iterator<Item = usize>> = if from_end {
        Box::new((0..=haystack.len() - needle.len()).rev())
    } else {
        Box::new(0..=haystack.len() - needle.len())
    };
    for start in range {
        if &haystack[start..start + needle.len()] == needle {
            return Some(start);
        }
    }
    None
}

fn string_methods() -> Vec<(&'static str, Value)> {
    vec![
        ("[]", native("[]", &["this", "index"], false, |_rt, args| {
            let s = as_string(&args[0])?;
            match &args[1] {
                Value::Int(i) if *i >= 0 => {
                    s.at(*i as usize).map(|c| Value::string(c.to_string())).ok_or_else(|| plain_err("Index out of bounds."))
                }
                Value::Int(_) => Err(plain_err("Index out of bounds.")),
                other => Err(plain_err(format!("String index must be an Int, got {}.", other.kind_name()))),
            }
        })),
        ("+", native("+", &["this", "other"], false, |_rt, args| {
            let a = as_string(&args[0])?;
            let b = as_string(&args[1])?;
            Ok(Value::String(Rc::new(StringValue::Concat(a, b))))
        })),
        ("*", native("*", &["this", "count"], false, |_rt, args| {
            let a = as_string(&args[0])?;
            match &args[1] {
                Value::Int(n) if *n >= 0 => Ok(Value::String(Rc::new(StringValue::Repeat(a, *n as usize)))),
                other => Err(plain_err(format!("Expected a non-negative Int, got {}.", other.kind_name()))),
            }
        })),
        ("codePointAt", native("codePointAt", &["this", "index"], false, |rt, args| {
            let s = as_string(&args[0])?;
            match &args[1] {
                Value::Int(i) if *i >= 0 => {
                    let c = s.at(*i as usize).ok_or_else(|| plain_err("Index out of bounds."))?;
                    Ok(rt.make_int(c as i64))
                }
                other => Err(plain_err(format!("Expected an Int index, got {}.", other.kind_name()))),
            }
        })),
        ("indexOf", native("indexOf", &["this", "needle"], false, |_rt, args| {
            let haystack = as_string(&args[0])?.to_rust_string().chars().collect::<Vec<_>>();
            let needle = as_string(&args[1])?.to_rust_string().chars().collect::<Vec<_>>();
            Ok(Value::Int(find_substring(&haystack, &needle, false).map(|i| i as i64).unwrap_or(-1)))
        })),
        ("includes", native("includes", &["this", "needle"], false, |_rt, args| {
            let haystack = as_string(&args[0])?.to_rust_string().chars().collect::<Vec<_>>();
            let needle = as_string(&args[1])?.to_rust_string().chars().collect::<Vec<_>>();
            Ok(Value::Boolean(find_substring(&haystack, &needle, false).is_some()))
        })),
        ("lastIndexOf", native("lastIndexOf", &["this", "needle"], false, |_rt, args| {
            let haystack = as_string(&args[0])?.to_rust_string().chars().collect::<Vec<_>>();
            let needle = as_string(&args[1])?.to_rust_string().chars().collect::<Vec<_>>();
            Ok(Value::Int(find_substring(&haystack, &needle, true).map(|i| i as i64).unwrap_or(-1)))
        })),
        ("length", native("length", &["this"], false, |rt, args| {
            let s = as_string(&args[0])?;
            Ok(rt.make_int(s.length() as i64))
        })),
        ("reverse", native("reverse", &["this"], false, |_rt, args| {
            let s = as_string(&args[0])?;
            Ok(Value::String(Rc::new(StringValue::Reversed(s))))
        })),
        ("toLower", native("toLower", &["this"], false, |_rt, args| {
            let s = as_string(&args[0])?;
            Ok(Value::string(s.to_rust_string().to_lowercase()))
        })),
        ("toUpper", native("toUpper", &["this"], false, |_rt, args| {
            let s = as_string(&args[0])?;
            Ok(Value::string(s.to_rust_string().to_uppercase()))
        })),
    ]
}

// ── Record ──

fn as_record(v: &Value) -> EvalResult<Rc<RecordValue>> {
    match v {
        Value::Record(r) => Ok(r.clone()),
        _ => Err(plain_err(format!("Expected a Record, got {}.", v.kind_name()))),
    }
}

fn record_methods() -> Vec<(&'static str, Value)> {
    vec![
        ("[]", native("[]", &["this", "name"], false, |_rt, args| {
            let r = as_record(&args[0])?;
            match &args[1] {
                Value::String(name) => {
                    r.get_own(&name.to_rust_string()).ok_or_else(|| plain_err(format!("No field '{}'.", name.to_rust_string())))
                }
                other => Err(plain_err(format!("Record key must be a String, got {}.", other.kind_name()))),
            }
        })),
        ("+", native("+", &["this", "other"], false, |_rt, args| {
            let a = as_record(&args[0])?;
            let b = as_record(&args[1])?;
            Ok(Value::Record(Rc::new(RecordValue::Concat(a, b))))
        })),
        ("-", native("-", &["this", "key"], false, |_rt, args| {
            let a = as_record(&args[0])?;
            match &args[1] {
                Value::String(key) => Ok(Value::Record(Rc::new(RecordValue::Remove(a, Rc::from(key.to_rust_string().as_str()))))),
                other => Err(plain_err(format!("Record key must be a String, got {}.", other.kind_name()))),
            }
        })),
        ("entries", native("entries", &["this"], false, |_rt, args| {
            let r = as_record(&args[0])?;
            let entries = r
                .own_entries()
                .into_iter()
                .filter(|(k, _)| k.as_ref() != "[[Prototype]]")
                .map(|(k, v)| Value::list(vec![Value::string(k.to_string()), v]))
                .collect();
            Ok(Value::list(entries))
        })),
        ("keys", native("keys", &["this"], false, |_rt, args| {
            let r = as_record(&args[0])?;
            let keys = r
                .own_entries()
                .into_iter()
                .filter(|(k, _)| k.as_ref() != "[[Prototype]]")
                .map(|(k, _)| Value::string(k.to_string()))
                .collect();
            Ok(Value::list(keys))
        })),
        ("values", native("values", &["this"], false, |_rt, args| {
            let r = as_record(&args[0])?;
            let values = r
                .own_entries()
                .into_iter()
                .filter(|(k, _)| k.as_ref() != "[[Prototype]]")
                .map(|(_, v)| v)
                .collect();
            Ok(Value::list(values))
        })),
    ]
}
