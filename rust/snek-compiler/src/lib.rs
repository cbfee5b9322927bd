//! Snek compiler front end.
//!
//! Turns source text into an AST: tokenize with [`compiler::lexer::Lexer`],
//! then parse with [`compiler::parser::Parser`]. This crate is purely
//! syntactic — no semantic `Type`, no `Scope`, no runtime `Value` — those
//! live in `snek-rt`, which depends on this crate for its AST.

pub mod compiler;

use compiler::ast::Module;
use compiler::lexer::{LexError, Lexer};
use compiler::parser::{ParseError, Parser};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Lex and parse `source` (attributed to `file` in every position) into a
/// module AST.
pub fn parse(source: &str, file: impl Into<Rc<str>>) -> Result<Module, CompileError> {
    let tokens = Lexer::new(source, file).tokenize()?;
    let module = Parser::new(tokens).parse_module()?;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_program() {
        let module = parse(
            "let xs = [1, 2, 3]\nprint(xs.reverse().join(\",\"))\n",
            "<test>",
        )
        .unwrap();
        assert_eq!(module.statements.len(), 2);
    }

    #[test]
    fn surfaces_lex_errors() {
        let err = parse("\"unterminated", "<test>").unwrap_err();
        assert!(matches!(err, CompileError::Lex(_)));
    }

    #[test]
    fn surfaces_parse_errors() {
        let err = parse("let = 1\n", "<test>").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
    }
}
