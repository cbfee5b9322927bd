//! Runtime value representation: the tagged sum type every expression
//! evaluates to, plus the List/String/Record view realizations and the
//! three function forms spec.md's data model names.

use crate::ordered_map::OrderedMap;
use crate::runtime::Runtime;
use crate::scope::Scope;
use crate::types::Type;
use snek_compiler::compiler::ast::Statement;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(Rc<StringValue>),
    List(Rc<ListValue>),
    Record(Rc<RecordValue>),
    Function(Rc<FunctionValue>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::new(StringValue::Owned(s.into().chars().collect())))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(ListValue::Owned(RefCell::new(items))))
    }

    pub fn record(fields: OrderedMap<Value>) -> Value {
        Value::Record(Rc::new(RecordValue::Owned(RefCell::new(fields))))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => s.length() > 0,
            Value::List(l) => l.length() > 0,
            Value::Record(_) => true,
            Value::Function(_) => true,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
            Value::Function(_) => "Function",
        }
    }

    fn float_string(f: f64) -> String {
        if f.is_nan() {
            "NaN".to_string()
        } else if f.is_infinite() {
            if f > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
        } else {
            format!("{}", f)
        }
    }

    /// `ToString`: the `print`/`toString` rendering. Strings render as their
    /// raw contents, and List/Record elements are joined by `", "` with no
    /// surrounding delimiter (spec §8 scenario 5: `print([4, 16])` → `4, 16`).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => Self::float_string(*f),
            Value::String(s) => s.to_rust_string(),
            Value::List(l) => {
                let items: Vec<String> =
                    (0..l.length()).map(|i| l.at(i).unwrap().to_display_string()).collect();
                items.join(", ")
            }
            Value::Record(r) => {
                let items: Vec<String> = r
                    .own_entries()
                    .into_iter()
                    .filter(|(k, _)| k.as_ref() != "[[Prototype]]")
                    .map(|(k, v)| format!("{}: {}", k, v.to_display_string()))
                    .collect();
                items.join(", ")
            }
            Value::Function(_) => "<function>".to_string(),
        }
    }

    /// `ToSource`: a delimited, re-parseable rendering (bracketed lists,
    /// braced records, quoted/escaped strings) used for the round-trip
    /// property (`Eval(ParseExpression(ToSource(v))) == v`, §8) and the
    /// REPL's echo of a value back to the user.
    pub fn to_source_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => Self::float_string(*f),
            Value::String(s) => quote_string(&s.to_rust_string()),
            Value::List(l) => {
                let items: Vec<String> =
                    (0..l.length()).map(|i| l.at(i).unwrap().to_source_string()).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Record(r) => {
                let items: Vec<String> = r
                    .own_entries()
                    .into_iter()
                    .filter(|(k, _)| k.as_ref() != "[[Prototype]]")
                    .map(|(k, v)| format!("{}: {}", k, v.to_source_string()))
                    .collect();
                format!("{{ {} }}", items.join(", "))
            }
            Value::Function(_) => "<function>".to_string(),
        }
    }
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_source_string())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::String(a), Value::String(b)) => a.equals(b),
            (Value::List(a), Value::List(b)) => {
                a.length() == b.length()
                    && (0..a.length()).all(|i| a.at(i) == b.at(i))
            }
            (Value::Record(a), Value::Record(b)) => {
                let ae = a.own_entries();
                let be = b.own_entries();
                ae.len() == be.len()
                    && ae.iter().zip(be.iter()).all(|((k1, v1), (k2, v2))| k1 == k2 && v1 == v2)
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ── String views ──

pub enum StringValue {
    Owned(Vec<char>),
    Reversed(Rc<StringValue>),
    Concat(Rc<StringValue>, Rc<StringValue>),
    Repeat(Rc<StringValue>, usize),
}

impl StringValue {
    pub fn length(&self) -> usize {
        match self {
            StringValue::Owned(chars) => chars.len(),
            StringValue::Reversed(inner) => inner.length(),
            StringValue::Concat(a, b) => a.length() + b.length(),
            StringValue::Repeat(inner, n) => inner.length() * n,
        }
    }

    pub fn at(&self, index: usize) -> Option<char> {
        match self {
            StringValue::Owned(chars) => chars.get(index).copied(),
            StringValue::Reversed(inner) => inner.at(inner.length().checked_sub(1)?.checked_sub(index)?),
            StringValue::Concat(a, b) => {
                if index < a.length() {
                    a.at(index)
                } else {
                    b.at(index - a.length())
                }
            }
            StringValue::Repeat(inner, n) => {
                if inner.length() == 0 || index >= inner.length() * n {
                    None
                } else {
                    inner.at(index % inner.length())
                }
            }
        }
    }

    pub fn to_rust_string(&self) -> String {
        (0..self.length()).filter_map(|i| self.at(i)).collect()
    }

    pub fn equals(&self, other: &StringValue) -> bool {
        self.length() == other.length() && (0..self.length()).all(|i| self.at(i) == other.at(i))
    }

    pub fn equals_str(&self, s: &str) -> bool {
        self.to_rust_string() == s
    }
}

// ── List views ──

pub enum ListValue {
    Owned(RefCell<Vec<Value>>),
    Reversed(Rc<ListValue>),
    Concat(Rc<ListValue>, Rc<ListValue>),
    Repeat(Rc<ListValue>, usize),
}

impl ListValue {
    pub fn length(&self) -> usize {
        match self {
            ListValue::Owned(items) => items.borrow().len(),
            ListValue::Reversed(inner) => inner.length(),
            ListValue::Concat(a, b) => a.length() + b.length(),
            ListValue::Repeat(inner, n) => inner.length() * n,
        }
    }

    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            ListValue::Owned(items) => items.borrow().get(index).cloned(),
            ListValue::Reversed(inner) => inner.at(inner.length().checked_sub(1)?.checked_sub(index)?),
            ListValue::Concat(a, b) => {
                if index < a.length() {
                    a.at(index)
                } else {
                    b.at(index - a.length())
                }
            }
            ListValue::Repeat(inner, n) => {
                if inner.length() == 0 || index >= inner.length() * n {
                    None
                } else {
                    inner.at(index % inner.length())
                }
            }
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        (0..self.length()).filter_map(|i| self.at(i)).collect()
    }

    /// In-place index assignment. Only valid on an owned list; views are
    /// immutable by construction (spec.md §3.4).
    pub fn set(&self, index: usize, value: Value) -> Result<(), String> {
        match self {
            ListValue::Owned(items) => {
                let mut items = items.borrow_mut();
                if index >= items.len() {
                    return Err("Index out of bounds.".to_string());
                }
                items[index] = value;
                Ok(())
            }
            _ => Err("Cannot assign into a list view.".to_string()),
        }
    }
}

// ── Record views ──

pub enum RecordValue {
    Owned(RefCell<OrderedMap<Value>>),
    /// Right-biased merge view produced by the `+` operator.
    Concat(Rc<RecordValue>, Rc<RecordValue>),
    /// Key-removed view produced by the `-` operator.
    Remove(Rc<RecordValue>, Rc<str>),
}

impl RecordValue {
    pub fn get_own(&self, name: &str) -> Option<Value> {
        match self {
            RecordValue::Owned(fields) => fields.borrow().get(name).cloned(),
            RecordValue::Concat(a, b) => b.get_own(name).or_else(|| a.get_own(name)),
            RecordValue::Remove(inner, removed) => {
                if removed.as_ref() == name {
                    None
                } else {
                    inner.get_own(name)
                }
            }
        }
    }

    pub fn own_entries(&self) -> Vec<(Rc<str>, Value)> {
        match self {
            RecordValue::Owned(fields) => {
                fields.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            RecordValue::Concat(a, b) => {
                let mut result = a.own_entries();
                for (k, v) in b.own_entries() {
                    if let Some(existing) = result.iter_mut().find(|(ek, _)| *ek == k) {
                        existing.1 = v;
                    } else {
                        result.push((k, v));
                    }
                }
                result
            }
            RecordValue::Remove(inner, removed) => inner
                .own_entries()
                .into_iter()
                .filter(|(k, _)| k.as_ref() != removed.as_ref())
                .collect(),
        }
    }

    /// Set (or insert) an own field. Only valid on an owned record.
    pub fn set_own(&self, name: Rc<str>, value: Value) -> Result<(), String> {
        match self {
            RecordValue::Owned(fields) => {
                fields.borrow_mut().insert(name, value);
                Ok(())
            }
            _ => Err("Cannot assign a field on a record view.".to_string()),
        }
    }

    /// Resolve `[[Prototype]]` if present and itself a Record.
    pub fn prototype(&self) -> Option<Value> {
        match self.get_own("[[Prototype]]") {
            Some(Value::Record(r)) => Some(Value::Record(r)),
            _ => None,
        }
    }
}

// ── Functions ──

/// A parameter of a Scripted function after default-expression AST is kept
/// and the declared type annotation (if any) has been resolved to a
/// semantic `Type` against the definition-site scope.
#[derive(Clone)]
pub struct ResolvedParameter {
    pub name: String,
    pub ty: Option<Type>,
    pub default: Option<snek_compiler::compiler::ast::Expression>,
    pub rest: bool,
}

pub type NativeCallback = Rc<dyn Fn(&mut Runtime, Vec<Value>) -> crate::error::EvalResult<Value>>;

pub enum FunctionValue {
    Native {
        params: Vec<ResolvedParameter>,
        return_type: Option<Type>,
        callback: NativeCallback,
    },
    Scripted {
        params: Vec<ResolvedParameter>,
        return_type: Option<Type>,
        body: Rc<Statement>,
        closure: Scope,
    },
    Bound {
        this: Value,
        inner: Rc<FunctionValue>,
    },
}

impl FunctionValue {
    pub fn make_native(
        params: Vec<ResolvedParameter>,
        return_type: Option<Type>,
        callback: impl Fn(&mut Runtime, Vec<Value>) -> crate::error::EvalResult<Value> + 'static,
    ) -> Rc<FunctionValue> {
        Rc::new(FunctionValue::Native { params, return_type, callback: Rc::new(callback) })
    }

    /// The visible parameter list (i.e. with a Bound function's receiver
    /// parameter already dropped).
    pub fn visible_params(&self) -> &[ResolvedParameter] {
        match self {
            FunctionValue::Native { params, .. } | FunctionValue::Scripted { params, .. } => params,
            FunctionValue::Bound { inner, .. } => {
                let all = inner.visible_params();
                if all.is_empty() { all } else { &all[1..] }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_form_joins_list_without_brackets() {
        let list = Value::list(vec![Value::Int(4), Value::Int(16)]);
        assert_eq!(list.to_display_string(), "4, 16");
        assert_eq!(list.to_source_string(), "[4, 16]");
    }

    #[test]
    fn display_form_joins_record_without_braces() {
        let mut fields = OrderedMap::new();
        fields.insert(Rc::from("a"), Value::Int(1));
        fields.insert(Rc::from("b"), Value::Int(2));
        let record = Value::record(fields);
        assert_eq!(record.to_display_string(), "a: 1, b: 2");
        assert_eq!(record.to_source_string(), "{ a: 1, b: 2 }");
    }

    #[test]
    fn source_form_quotes_and_escapes_strings() {
        let s = Value::string("a\"b\nc");
        assert_eq!(s.to_display_string(), "a\"b\nc");
        assert_eq!(s.to_source_string(), "\"a\\\"b\\nc\"");
    }
}
