//! The host-facing entry point: owns the prototype registry, root scope,
//! call stack, small-int cache, and module cache.

use crate::error::{Error, Frame};
use crate::prototypes::Prototypes;
use crate::scope::Scope;
use crate::types::{Builtin, Type};
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

const SMALL_INT_MIN: i64 = -128;
const SMALL_INT_MAX: i64 = 1024;

/// Resolves an import path to a loaded module scope. The default
/// (`filesystem_importer`) reads the path as a file; hosts embedding Snek
/// may substitute their own (e.g. an in-memory registry for tests).
pub type ModuleImporter = Rc<dyn Fn(&mut Runtime, &str) -> Result<Scope, Error>>;

pub struct Runtime {
    pub root_scope: Scope,
    pub prototypes: Prototypes,
    call_stack: Vec<Frame>,
    small_ints: Vec<Value>,
    module_cache: HashMap<Rc<str>, Scope>,
    importer: ModuleImporter,
}

impl Runtime {
    pub fn new(importer: ModuleImporter) -> Self {
        let root_scope = Scope::root();
        let prototypes = Prototypes::install();
        install_builtin_types(&root_scope);
        crate::builtins::install(&root_scope);
        let small_ints = (SMALL_INT_MIN..SMALL_INT_MAX).map(Value::Int).collect();
        Runtime {
            root_scope,
            prototypes,
            call_stack: Vec::new(),
            small_ints,
            module_cache: HashMap::new(),
            importer,
        }
    }

    pub fn with_filesystem_importer() -> Self {
        Self::new(Rc::new(crate::importer::filesystem_importer))
    }

    /// Construct an Int value, consulting the small-integer cache.
    pub fn make_int(&self, n: i64) -> Value {
        if n >= SMALL_INT_MIN && n < SMALL_INT_MAX {
            self.small_ints[(n - SMALL_INT_MIN) as usize].clone()
        } else {
            Value::Int(n)
        }
    }

    pub fn call_stack(&self) -> &[Frame] {
        &self.call_stack
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.call_stack.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.call_stack.pop();
    }

    pub fn replace_top_frame(&mut self, frame: Frame) {
        if let Some(top) = self.call_stack.last_mut() {
            *top = frame;
        } else {
            self.call_stack.push(frame);
        }
    }

    /// Lex, parse, and execute `source` against `scope`, returning the value
    /// of the final top-level expression statement (used by the REPL).
    pub fn run_script(&mut self, scope: &Scope, source: &str, file: impl Into<Rc<str>>) -> Result<Value, Error> {
        let file = file.into();
        let module = snek_compiler::parse(source, file).map_err(|e| Error::without_position(e.to_string()))?;
        crate::evaluator::execute_module(self, scope, &module)
    }

    pub fn import_module(&mut self, path: &str) -> Result<Scope, Error> {
        if path.is_empty() {
            return Err(Error::without_position("Cannot import an empty path."));
        }
        if let Some(scope) = self.module_cache.get(path) {
            return Ok(scope.clone());
        }
        let importer = self.importer.clone();
        let scope = importer(self, path)?;
        self.module_cache.insert(Rc::from(path), scope.clone());
        Ok(scope)
    }
}

fn install_builtin_types(scope: &Scope) {
    let builtins = [
        Builtin::Boolean,
        Builtin::Float,
        Builtin::Function,
        Builtin::Int,
        Builtin::List,
        Builtin::Number,
        Builtin::Record,
        Builtin::String,
        Builtin::Void,
    ];
    for b in builtins {
        let _ = scope.declare_type(&b.to_string(), Type::Builtin(b), false);
    }
    let _ = scope.declare_type("Any", Type::Any, false);
}
