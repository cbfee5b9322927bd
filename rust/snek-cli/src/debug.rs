//! Dump lexer/parser output as JSON, for the "external collaborator"
//! tooling (editors, linters) spec.md §1 carves core semantics out for.

use snek_compiler::compiler::lexer::Lexer;
use snek_compiler::compiler::parser::Parser;

#[derive(thiserror::Error, Debug)]
pub enum DebugError {
    #[error("{0}")]
    Compile(String),
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Tokenize `source` and return its tokens as pretty-printed JSON.
pub fn dump_tokens(source: &str, file: &str) -> Result<String, DebugError> {
    let tokens = Lexer::new(source, file.to_string()).tokenize().map_err(|e| DebugError::Compile(e.to_string()))?;
    Ok(serde_json::to_string_pretty(&tokens)?)
}

/// Lex and parse `source` and return its AST as pretty-printed JSON.
pub fn dump_ast(source: &str, file: &str) -> Result<String, DebugError> {
    let tokens = Lexer::new(source, file.to_string()).tokenize().map_err(|e| DebugError::Compile(e.to_string()))?;
    let module = Parser::new(tokens).parse_module().map_err(|e| DebugError::Compile(e.to_string()))?;
    Ok(serde_json::to_string_pretty(&module)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_tokens_as_json() {
        let json = dump_tokens("let x = 1\n", "<test>").unwrap();
        assert!(json.contains("\"kind\""));
    }

    #[test]
    fn dumps_ast_as_json() {
        let json = dump_ast("let x = 1\n", "<test>").unwrap();
        assert!(json.contains("DeclareVar") || json.contains("statements"));
    }

    #[test]
    fn surfaces_lex_errors() {
        assert!(dump_tokens("\"unterminated", "<test>").is_err());
    }
}
