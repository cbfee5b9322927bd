//! Semantic type model and the `Accepts` subtype relation.

use crate::value::Value;
use std::rc::Rc;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Builtin {
    Boolean,
    Float,
    Function,
    Int,
    List,
    Number,
    Record,
    String,
    Void,
}

#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub name: String,
    pub ty: Option<Type>,
    pub has_default: bool,
    pub rest: bool,
}

#[derive(Debug, Clone)]
pub enum Type {
    Any,
    BooleanLiteral(bool),
    Builtin(Builtin),
    Function {
        params: Rc<Vec<TypeParameter>>,
        return_type: Rc<Type>,
    },
    Intersection(Rc<Vec<Type>>),
    List(Rc<Type>),
    Record(Rc<Vec<(String, Type)>>),
    StringLiteral(Rc<str>),
    Tuple(Rc<Vec<Type>>),
    Union(Rc<Vec<Type>>),
}

impl Type {
    pub fn void() -> Type {
        Type::Builtin(Builtin::Void)
    }

    /// Deduplicate a set of candidate types down to one element when
    /// possible, otherwise a Union — used to reify a function's inferred
    /// return type from the set of its `return` expressions.
    pub fn reify(mut members: Vec<Type>) -> Type {
        if members.is_empty() {
            return Type::void();
        }
        let mut deduped: Vec<Type> = Vec::new();
        'outer: while let Some(candidate) = members.pop() {
            for existing in &deduped {
                if existing.structurally_equal(&candidate) {
                    continue 'outer;
                }
            }
            deduped.push(candidate);
        }
        if deduped.len() == 1 {
            deduped.into_iter().next().unwrap()
        } else {
            Type::Union(Rc::new(deduped))
        }
    }

    fn structurally_equal(&self, other: &Type) -> bool {
        use Type::*;
        match (self, other) {
            (Any, Any) => true,
            (BooleanLiteral(a), BooleanLiteral(b)) => a == b,
            (Builtin(a), Builtin(b)) => a == b,
            (StringLiteral(a), StringLiteral(b)) => a == b,
            (List(a), List(b)) => a.structurally_equal(b),
            _ => false,
        }
    }

    /// Does this type accept a concrete runtime value?
    pub fn accepts_value(&self, value: &Value) -> bool {
        match self {
            Type::Any => true,
            Type::BooleanLiteral(b) => matches!(value, Value::Boolean(v) if v == b),
            Type::StringLiteral(s) => matches!(value, Value::String(v) if v.equals_str(s)),
            Type::Builtin(Builtin::Boolean) => matches!(value, Value::Boolean(_)),
            Type::Builtin(Builtin::Int) => matches!(value, Value::Int(_)),
            Type::Builtin(Builtin::Float) => matches!(value, Value::Float(_)),
            Type::Builtin(Builtin::Number) => matches!(value, Value::Int(_) | Value::Float(_)),
            Type::Builtin(Builtin::String) => matches!(value, Value::String(_)),
            Type::Builtin(Builtin::List) => matches!(value, Value::List(_)),
            Type::Builtin(Builtin::Record) => matches!(value, Value::Record(_)),
            Type::Builtin(Builtin::Function) => matches!(value, Value::Function(_)),
            Type::Builtin(Builtin::Void) => matches!(value, Value::Null),
            Type::List(_) => matches!(value, Value::List(_)),
            Type::Tuple(members) => match value {
                Value::List(list) => {
                    list.length() == members.len()
                        && members.iter().enumerate().all(|(i, t)| {
                            list.at(i).map(|v| t.accepts_value(&v)).unwrap_or(false)
                        })
                }
                _ => false,
            },
            Type::Record(fields) => match value {
                Value::Record(record) => fields.iter().all(|(name, ty)| {
                    record.get_own(name).map(|v| ty.accepts_value(&v)).unwrap_or(false)
                }),
                _ => false,
            },
            Type::Function { .. } => matches!(value, Value::Function(_)),
            Type::Intersection(members) => members.iter().all(|t| t.accepts_value(value)),
            Type::Union(members) => members.iter().any(|t| t.accepts_value(value)),
        }
    }

    /// Does this type accept another type as a subtype?
    pub fn accepts_type(&self, other: &Type) -> bool {
        match self {
            Type::Any => true,
            Type::Union(members) => members.iter().any(|t| t.accepts_type(other)),
            Type::Intersection(members) => members.iter().all(|t| t.accepts_type(other)),
            _ => match other {
                Type::Union(members) => members.iter().all(|t| self.accepts_type(t)),
                Type::Intersection(members) => members.iter().any(|t| self.accepts_type(t)),
                Type::Any => matches!(self, Type::Any),
                _ => self.accepts_type_concrete(other),
            },
        }
    }

    fn accepts_type_concrete(&self, other: &Type) -> bool {
        use Type::*;
        match (self, other) {
            (Builtin(Builtin::Number), Builtin(Builtin::Int) | Builtin(Builtin::Float)) => true,
            (Builtin(Builtin::Number), BooleanLiteral(_)) => false,
            (Builtin(a), Builtin(b)) => a == b,
            (Builtin(Builtin::List), List(_)) | (Builtin(Builtin::List), Tuple(_)) => true,
            (Builtin(Builtin::String), StringLiteral(_)) => true,
            (Builtin(Builtin::Boolean), BooleanLiteral(_)) => true,
            (List(elem), List(other_elem)) => elem.accepts_type(other_elem),
            (List(elem), Tuple(members)) => members.iter().all(|m| elem.accepts_type(m)),
            (Tuple(a), Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.accepts_type(y))
            }
            (Record(fields), Record(other_fields)) => fields.iter().all(|(name, ty)| {
                other_fields
                    .iter()
                    .find(|(n, _)| n == name)
                    .is_some_and(|(_, t)| ty.accepts_type(t))
            }),
            (BooleanLiteral(a), BooleanLiteral(b)) => a == b,
            (StringLiteral(a), StringLiteral(b)) => a == b,
            (Function { params: p1, return_type: r1 }, Function { params: p2, return_type: r2 }) => {
                p1.len() == p2.len() && r1.accepts_type(r2)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn any_accepts_everything() {
        assert!(Type::Any.accepts_value(&Value::Null));
        assert!(Type::Any.accepts_value(&Value::Int(5)));
    }

    #[test]
    fn number_accepts_int_and_float() {
        let number = Type::Builtin(Builtin::Number);
        assert!(number.accepts_value(&Value::Int(1)));
        assert!(number.accepts_value(&Value::Float(1.0)));
        assert!(!number.accepts_value(&Value::Boolean(true)));
    }

    #[test]
    fn list_accepts_tuple() {
        let list_of_int = Type::List(Rc::new(Type::Builtin(Builtin::Int)));
        let tuple = Type::Tuple(Rc::new(vec![Type::Builtin(Builtin::Int), Type::Builtin(Builtin::Int)]));
        assert!(list_of_int.accepts_type(&tuple));
    }

    #[test]
    fn tuple_requires_matching_size() {
        let a = Type::Tuple(Rc::new(vec![Type::Builtin(Builtin::Int)]));
        let b = Type::Tuple(Rc::new(vec![Type::Builtin(Builtin::Int), Type::Builtin(Builtin::Int)]));
        assert!(!a.accepts_type(&b));
    }

    #[test]
    fn union_requires_one_member() {
        let u = Type::Union(Rc::new(vec![Type::Builtin(Builtin::Int), Type::Builtin(Builtin::String)]));
        assert!(u.accepts_value(&Value::Int(1)));
        assert!(!u.accepts_value(&Value::Boolean(true)));
    }

    #[test]
    fn intersection_requires_all_members() {
        let i = Type::Intersection(Rc::new(vec![Type::Any, Type::Builtin(Builtin::Int)]));
        assert!(i.accepts_value(&Value::Int(1)));
        assert!(!i.accepts_value(&Value::Boolean(true)));
    }

    #[test]
    fn reify_dedups_to_single_type() {
        let t = Type::reify(vec![Type::Builtin(Builtin::Int), Type::Builtin(Builtin::Int)]);
        assert!(matches!(t, Type::Builtin(Builtin::Int)));
    }
}
