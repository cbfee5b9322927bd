//! Default module resolution strategy (§4.5): paths are opaque strings
//! resolved against the filesystem. Hosts that embed Snek may supply a
//! different `ModuleImporter` to `Runtime::new` (e.g. an in-memory registry
//! for tests or a virtual filesystem).

use crate::error::Error;
use crate::scope::Scope;
use crate::runtime::Runtime;
use crate::value::Value;

/// Reads `path` from disk, runs it in a fresh scope parented to the root
/// scope with a read-only `__name__` binding, and returns that scope.
pub fn filesystem_importer(runtime: &mut Runtime, path: &str) -> Result<Scope, Error> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| Error::without_position(format!("Cannot read module '{}': {}", path, e)))?;
    let scope = runtime.root_scope.child();
    let _ = scope.declare("__name__", Value::string(path), true, false);
    runtime.run_script(&scope, &source, path)?;
    Ok(scope)
}
