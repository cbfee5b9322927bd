//! Snek CLI — command-line interface and REPL entry point.

use clap::Parser as ClapParser;
use snek_cli::colors::red;
use snek_cli::error::CliError;
use snek_cli::{debug, repl};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use snek_rt::runtime::Runtime;
use snek_rt::value::Value;

#[derive(ClapParser)]
#[command(
    name = "snek",
    version,
    about = "Snek — a small dynamically-evaluated, statically-typable scripting language",
    long_about = "Snek is a small dynamically-evaluated, statically-typable scripting language \
                  with a prototype-based object model and a tree-walking evaluator.",
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}

Examples:
  snek hello.snek              Run a script
  snek -e 'print(1 + 2)'       Evaluate a one-liner
  snek                         Start the REPL (or read stdin if piped)
  snek --dump-tokens hello.snek  Print the lexer's token stream as JSON
  snek --dump-ast hello.snek    Print the parsed AST as JSON
"
)]
struct Cli {
    /// Evaluate PROG as the script source instead of reading a file
    #[arg(short = 'e', long = "eval", value_name = "PROG")]
    eval: Option<String>,

    /// Path to a Snek source file. Omit to read stdin (non-interactive) or
    /// start the REPL (interactive terminal)
    #[arg()]
    file: Option<PathBuf>,

    /// Dump the lexer's token stream as JSON instead of running the program
    #[arg(long)]
    dump_tokens: bool,

    /// Dump the parsed AST as JSON instead of running the program
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.dump_tokens || cli.dump_ast {
        run_debug_dump(&cli)
    } else if let Some(prog) = cli.eval {
        run_source(&prog, "<eval>", false)
    } else if let Some(path) = cli.file {
        read_file(&path).and_then(|source| run_source(&source, &path.display().to_string(), true))
    } else if std::io::stdin().is_terminal() {
        repl::run_repl();
        Ok(())
    } else {
        read_stdin().and_then(|source| run_source(&source, "<stdin>", false))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", red(&e.to_string()));
            ExitCode::from(e.exit_code())
        }
    }
}

fn read_file(path: &PathBuf) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.clone(), source })
}

fn read_stdin() -> Result<String, CliError> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source).map_err(CliError::Stdin)?;
    Ok(source)
}

fn run_debug_dump(cli: &Cli) -> Result<(), CliError> {
    let source = match (&cli.eval, &cli.file) {
        (Some(prog), _) => prog.clone(),
        (None, Some(path)) => read_file(path)?,
        (None, None) => read_stdin()?,
    };

    let json =
        if cli.dump_ast { debug::dump_ast(&source, "<dump>")? } else { debug::dump_tokens(&source, "<dump>")? };
    println!("{}", json);
    Ok(())
}

/// Run `source` to completion, setting `__name__` to `"__main__"` when
/// invoked as a direct script (not `-e`/stdin), per §6.3.
fn run_source(source: &str, file: &str, is_main_script: bool) -> Result<(), CliError> {
    let mut runtime = Runtime::with_filesystem_importer();
    let scope = runtime.root_scope.child();
    let name = if is_main_script { "__main__" } else { file };
    let _ = scope.declare("__name__", Value::string(name), true, false);

    runtime.run_script(&scope, source, file.to_string())?;
    Ok(())
}
