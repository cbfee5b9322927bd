//! Interactive REPL for Snek.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{History, SearchDirection};
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::colors::{bold, cyan, gray, green, red};
use snek_rt::runtime::Runtime;

/// Keywords recognized by the lexer (spec §3.2's keyword table).
const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "export", "false", "for", "from", "if", "import",
    "let", "null", "pass", "return", "true", "type", "while",
];

/// Builtin type names installed by `Runtime::new`.
const TYPES: &[&str] =
    &["Any", "Boolean", "Float", "Function", "Int", "List", "Number", "Record", "String", "Void"];

/// Global host functions and common prototype methods, offered for completion
/// alongside keywords and types.
const BUILTINS: &[&str] = &[
    "print", "filter", "map", "reduce", "forEach", "includes", "indexOf", "lastIndexOf", "join",
    "reverse", "size", "entries", "keys", "values", "toString", "codePointAt", "toLower", "toUpper",
    "length",
];

/// REPL commands for tab completion.
const COMMANDS: &[&str] = &[":help", ":quit", ":reset", ":clear", ":history", ":load"];

/// Completer/Helper for the REPL.
struct SnekCompleter;

impl Completer for SnekCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == '[' || c == '{' || c == '.')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line[start..pos];

        if word.is_empty() {
            return Ok((start, Vec::new()));
        }

        let mut candidates = Vec::new();

        if line.trim_start() == word && word.starts_with(':') {
            for &cmd in COMMANDS {
                if cmd.starts_with(word) {
                    candidates.push(Pair { display: cmd.to_string(), replacement: cmd.to_string() });
                }
            }
        } else {
            for &kw in KEYWORDS {
                if kw.starts_with(word) {
                    candidates.push(Pair { display: kw.to_string(), replacement: kw.to_string() });
                }
            }
            for &ty in TYPES {
                if ty.starts_with(word) {
                    candidates.push(Pair { display: ty.to_string(), replacement: ty.to_string() });
                }
            }
            for &b in BUILTINS {
                if b.starts_with(word) {
                    candidates.push(Pair { display: b.to_string(), replacement: b.to_string() });
                }
            }
        }

        Ok((start, candidates))
    }
}

impl Hinter for SnekCompleter {
    type Hint = String;
}

impl Highlighter for SnekCompleter {}
impl Validator for SnekCompleter {}
impl Helper for SnekCompleter {}

/// Determine whether `buffer` still needs more input before it can be
/// handed to the lexer/parser: either an unclosed bracket, or a line ending
/// in `:` (opening an indented `if`/`while`/function block) with no
/// indented continuation yet.
fn needs_more_input(buffer: &str) -> bool {
    let mut parens = 0i32;
    let mut brackets = 0i32;
    let mut braces = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for ch in buffer.chars() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            '{' => braces += 1,
            '}' => braces -= 1,
            _ => {}
        }
    }
    if parens > 0 || brackets > 0 || braces > 0 || in_string {
        return true;
    }

    let last_line = buffer.lines().last().unwrap_or("");
    last_line.trim_end().ends_with(':')
}

pub fn run_repl() {
    println!("{}", bold(&cyan("Snek REPL")));
    println!("{}\n", gray("Type :help for available commands, :quit to exit."));

    let config = rustyline::Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(config).expect("Failed to create editor");
    rl.set_helper(Some(SnekCompleter));

    let history_path = get_history_path();
    if let Some(ref path) = history_path {
        if path.exists() {
            let _ = rl.load_history(path);
        }
    }

    let mut runtime = new_repl_runtime();
    let mut scope = runtime.root_scope.child();
    let mut multiline_buffer = String::new();

    loop {
        let prompt = if multiline_buffer.is_empty() { format!("{} ", green("snek>")) } else { format!("{}    ", gray("...")) };

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    if multiline_buffer.is_empty() {
                        continue;
                    }
                    // A blank line always closes a multi-line block.
                } else if multiline_buffer.is_empty() {
                    if let Some(keep_going) = handle_command(&line, &mut rl, &mut runtime, &mut scope) {
                        if !keep_going {
                            break;
                        }
                        continue;
                    }
                }

                if !line.trim().is_empty() {
                    if !multiline_buffer.is_empty() {
                        multiline_buffer.push('\n');
                    }
                    multiline_buffer.push_str(&line);

                    if needs_more_input(&multiline_buffer) {
                        continue;
                    }
                }

                let input = multiline_buffer.trim().to_string();
                multiline_buffer.clear();
                if input.is_empty() {
                    continue;
                }

                eval_input(&mut runtime, &scope, &input);
            }
            Err(ReadlineError::Interrupted) => {
                multiline_buffer.clear();
                println!("{}", gray("(Ctrl-C to exit)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", red("Error:"), err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }

    println!("\n{}", cyan("Goodbye!"));
}

fn new_repl_runtime() -> Runtime {
    Runtime::with_filesystem_importer()
}

fn get_history_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let mut path = PathBuf::from(home);
    path.push(".snek");
    path.push("repl_history");
    Some(path)
}

/// Handle REPL commands. `Some(true)` to continue, `Some(false)` to quit,
/// `None` if `line` is not a command (fall through to evaluation).
fn handle_command<H: Helper>(
    line: &str,
    rl: &mut Editor<H, rustyline::history::DefaultHistory>,
    runtime: &mut Runtime,
    scope: &mut snek_rt::scope::Scope,
) -> Option<bool> {
    let trimmed = line.trim();
    match trimmed {
        ":quit" | ":q" => Some(false),
        ":help" | ":h" => {
            print_help();
            Some(true)
        }
        ":reset" | ":r" => {
            *scope = runtime.root_scope.child();
            println!("{}", gray("Session state reset."));
            Some(true)
        }
        ":clear" | ":c" => {
            print!("\x1b[2J\x1b[H");
            io::stdout().flush().ok();
            Some(true)
        }
        ":history" => {
            let history = rl.history();
            for i in 0..history.len() {
                if let Ok(Some(result)) = history.get(i, SearchDirection::Forward) {
                    println!("{:4} {}", gray(&format!("{}", i + 1)), result.entry);
                }
            }
            Some(true)
        }
        _ if trimmed.starts_with(":load ") => {
            let path = trimmed.strip_prefix(":load ").unwrap().trim();
            cmd_load(runtime, scope, path);
            Some(true)
        }
        _ => None,
    }
}

fn eval_input(runtime: &mut Runtime, scope: &snek_rt::scope::Scope, input: &str) {
    match runtime.run_script(scope, input, "<repl>") {
        Ok(value) => {
            if !matches!(value, snek_rt::value::Value::Null) {
                println!("{}", value.to_source_string());
            }
        }
        Err(e) => eprintln!("{} {}", red("Error:"), e),
    }
}

fn cmd_load(runtime: &mut Runtime, scope: &snek_rt::scope::Scope, path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} Failed to read {}: {}", red("Error:"), path, e);
            return;
        }
    };
    match runtime.run_script(scope, &source, path.to_string()) {
        Ok(value) => {
            if !matches!(value, snek_rt::value::Value::Null) {
                println!("{}", value.to_source_string());
            }
        }
        Err(e) => eprintln!("{} {}", red("Error:"), e),
    }
}

fn print_help() {
    println!("{}", bold("Commands:"));
    println!("  {}  {}", cyan(":help, :h"), gray("Show this help"));
    println!("  {}  {}", cyan(":quit, :q"), gray("Exit the REPL"));
    println!("  {}  {}", cyan(":reset, :r"), gray("Reset session state"));
    println!("  {}  {}", cyan(":clear, :c"), gray("Clear terminal screen"));
    println!("  {}  {}", cyan(":load <file>"), gray("Load and execute a Snek file"));
    println!("  {}  {}", cyan(":history"), gray("Show command history"));
    println!();
    println!("{}", gray("Features:"));
    println!("  {}", gray("• Arrow keys for navigation"));
    println!("  {}", gray("• Tab completion for keywords, builtin types, prototype methods"));
    println!("  {}", gray("• History persistence in ~/.snek/repl_history"));
    println!("  {}", gray("• Multi-line input (a trailing ':' opens a block; blank line ends it)"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_more_input_brackets() {
        assert!(needs_more_input("print("));
        assert!(needs_more_input("let x = [1, 2"));
        assert!(needs_more_input("let x = { a: 1"));
        assert!(!needs_more_input("print(1)"));
        assert!(!needs_more_input("let x = [1, 2]"));
    }

    #[test]
    fn needs_more_input_colon_block() {
        assert!(needs_more_input("if x > 0:"));
        assert!(needs_more_input("while true:"));
        assert!(!needs_more_input("if x > 0: pass"));
    }

    #[test]
    fn needs_more_input_ignores_colon_inside_string() {
        assert!(!needs_more_input("let s = \"a:\""));
    }
}
