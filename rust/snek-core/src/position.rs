//! Source position tracking shared by the lexer, parser, and evaluator.

use std::fmt;
use std::rc::Rc;

/// A single point in a source file, attached to tokens, AST nodes, and most
/// error sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: Rc<str>, line: usize, column: usize) -> Self {
        debug_assert!(line >= 1 && column >= 1);
        Self { file, line, column }
    }

    /// Position for values produced outside of any parsed source, e.g. by the
    /// host API or synthetic AST built at runtime.
    pub fn synthetic() -> Self {
        Self {
            file: Rc::from("<eval>"),
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
