//! Lexical scope: nested mapping of names to variables and types.

use crate::ordered_map::OrderedMap;
use crate::types::Type;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
struct Variable {
    value: Value,
    read_only: bool,
    exported: bool,
}

#[derive(Clone)]
struct TypeEntry {
    ty: Type,
    exported: bool,
}

struct ScopeData {
    variables: OrderedMap<Variable>,
    types: OrderedMap<TypeEntry>,
    parent: Option<Scope>,
}

/// A lexical scope. Cheaply cloneable (`Rc` handle) so closures can capture
/// it by value, matching the teacher's convention of passing cheap handles
/// rather than references through the evaluator.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    AlreadyDeclared(String),
    ReadOnly(String),
    Unknown(String),
}

impl std::fmt::Display for ScopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeError::AlreadyDeclared(name) => write!(f, "'{}' is already declared in this scope.", name),
            ScopeError::ReadOnly(name) => write!(f, "Cannot assign to read-only variable '{}'.", name),
            ScopeError::Unknown(name) => write!(f, "Unknown identifier '{}'.", name),
        }
    }
}

impl Scope {
    pub fn root() -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            variables: OrderedMap::new(),
            types: OrderedMap::new(),
            parent: None,
        })))
    }

    pub fn child(&self) -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            variables: OrderedMap::new(),
            types: OrderedMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub fn declare(
        &self,
        name: &str,
        value: Value,
        read_only: bool,
        exported: bool,
    ) -> Result<(), ScopeError> {
        let mut data = self.0.borrow_mut();
        if data.variables.contains_key(name) {
            return Err(ScopeError::AlreadyDeclared(name.to_string()));
        }
        data.variables.insert(Rc::from(name), Variable { value, read_only, exported });
        Ok(())
    }

    pub fn declare_type(&self, name: &str, ty: Type, exported: bool) -> Result<(), ScopeError> {
        let mut data = self.0.borrow_mut();
        if data.types.contains_key(name) {
            return Err(ScopeError::AlreadyDeclared(name.to_string()));
        }
        data.types.insert(Rc::from(name), TypeEntry { ty, exported });
        Ok(())
    }

    /// Walk parents to find and overwrite an existing binding.
    pub fn set(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        let mut data = self.0.borrow_mut();
        if let Some(var) = data.variables.get_mut(name) {
            if var.read_only {
                return Err(ScopeError::ReadOnly(name.to_string()));
            }
            var.value = value;
            return Ok(());
        }
        let parent = data.parent.clone();
        drop(data);
        match parent {
            Some(p) => p.set(name, value),
            None => Err(ScopeError::Unknown(name.to_string())),
        }
    }

    /// Look up a variable's value, walking parents. `imported` restricts
    /// the search to exported entries at the *current* level only (never
    /// crossing into a parent), matching spec.md §3.6.
    pub fn lookup(&self, name: &str, imported: bool) -> Option<Value> {
        let data = self.0.borrow();
        if let Some(var) = data.variables.get(name) {
            if !imported || var.exported {
                return Some(var.value.clone());
            }
            return None;
        }
        if imported {
            return None;
        }
        let parent = data.parent.clone();
        drop(data);
        parent.and_then(|p| p.lookup(name, false))
    }

    pub fn lookup_type(&self, name: &str, imported: bool) -> Option<Type> {
        let data = self.0.borrow();
        if let Some(entry) = data.types.get(name) {
            if !imported || entry.exported {
                return Some(entry.ty.clone());
            }
            return None;
        }
        if imported {
            return None;
        }
        let parent = data.parent.clone();
        drop(data);
        parent.and_then(|p| p.lookup_type(name, false))
    }

    /// All exported variables declared directly at this level (used by
    /// star-imports).
    pub fn exported_variables(&self) -> Vec<(Rc<str>, Value)> {
        self.0
            .borrow()
            .variables
            .iter()
            .filter(|(_, v)| v.exported)
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub fn exported_types(&self) -> Vec<(Rc<str>, Type)> {
        self.0
            .borrow()
            .types
            .iter()
            .filter(|(_, t)| t.exported)
            .map(|(k, t)| (k.clone(), t.ty.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_lookup() {
        let s = Scope::root();
        s.declare("x", Value::Int(1), false, false).unwrap();
        assert_eq!(s.lookup("x", false), Some(Value::Int(1)));
    }

    #[test]
    fn redeclare_in_same_level_errors() {
        let s = Scope::root();
        s.declare("x", Value::Int(1), false, false).unwrap();
        assert_eq!(
            s.declare("x", Value::Int(2), false, false),
            Err(ScopeError::AlreadyDeclared("x".to_string()))
        );
    }

    #[test]
    fn set_walks_parents() {
        let parent = Scope::root();
        parent.declare("x", Value::Int(1), false, false).unwrap();
        let child = parent.child();
        child.set("x", Value::Int(2)).unwrap();
        assert_eq!(parent.lookup("x", false), Some(Value::Int(2)));
    }

    #[test]
    fn read_only_rejects_set() {
        let s = Scope::root();
        s.declare("x", Value::Int(1), true, false).unwrap();
        assert_eq!(s.set("x", Value::Int(2)), Err(ScopeError::ReadOnly("x".to_string())));
    }

    #[test]
    fn imported_lookup_never_crosses_parent() {
        let parent = Scope::root();
        parent.declare("x", Value::Int(1), false, true).unwrap();
        let child = parent.child();
        assert_eq!(child.lookup("x", true), None);
        assert_eq!(child.lookup("x", false), Some(Value::Int(1)));
    }

    #[test]
    fn imported_lookup_requires_exported() {
        let s = Scope::root();
        s.declare("x", Value::Int(1), false, false).unwrap();
        assert_eq!(s.lookup("x", true), None);
    }
}
