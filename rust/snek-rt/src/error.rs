//! Runtime error and non-local control flow ("jump") types.
//!
//! The evaluator models both runtime errors and break/continue/return as a
//! single `Signal` threaded through `Result`, matching the host's original
//! exception-based control flow without throwing: `Jump` unwinds to the
//! nearest loop or call boundary, `Error` propagates to the top.

use crate::value::Value;
use snek_compiler::compiler::ast::JumpKind;
use snek_core::Position;
use thiserror::Error;

/// One entry of the runtime call stack, used for stack traces and exposed
/// to host embedders via `Runtime::call_stack()`.
#[derive(Debug, Clone)]
pub struct Frame {
    pub position: Position,
    pub callee_name: Option<String>,
    pub arity: usize,
}

#[derive(Debug, Error, Clone)]
#[error("{}", self.render())]
pub struct Error {
    pub position: Option<Position>,
    pub message: String,
    pub stack: Vec<Frame>,
}

impl Error {
    pub fn new(position: Option<Position>, message: impl Into<String>, stack: Vec<Frame>) -> Self {
        Self { position, message: message.into(), stack }
    }

    pub fn at(position: Position, message: impl Into<String>) -> Self {
        Self::new(Some(position), message, Vec::new())
    }

    pub fn without_position(message: impl Into<String>) -> Self {
        Self::new(None, message, Vec::new())
    }

    fn render(&self) -> String {
        let mut out = match &self.position {
            Some(p) => format!("{}: {}", p, self.message),
            None => self.message.clone(),
        };
        for frame in &self.stack {
            let name = frame.callee_name.as_deref().unwrap_or("<anonymous>");
            out.push_str(&format!("\n  at {} ({})", name, frame.position));
        }
        out
    }
}

/// Internal control-flow signal threaded through evaluation. `Jump` never
/// escapes `Runtime::run_script` — it is always caught by a loop, a call, or
/// converted to an `Error` ("Unexpected break/continue/return") if it
/// escapes its intended scope.
#[derive(Debug, Clone)]
pub enum Signal {
    Jump {
        kind: JumpKind,
        value: Value,
        position: Position,
    },
    Error(Error),
}

impl From<Error> for Signal {
    fn from(err: Error) -> Self {
        Signal::Error(err)
    }
}

impl Signal {
    /// Jumps that escape the construct meant to catch them (return outside
    /// any function, break/continue outside any loop) become runtime errors.
    pub fn into_unexpected_jump_error(self) -> Error {
        match self {
            Signal::Error(e) => e,
            Signal::Jump { kind, position, .. } => {
                let word = match kind {
                    JumpKind::Break => "break",
                    JumpKind::Continue => "continue",
                    JumpKind::Return => "return",
                };
                Error::at(position, format!("Unexpected `{}`.", word))
            }
        }
    }
}

pub type EvalResult<T> = Result<T, Signal>;
