//! Unifies the CLI's fallible paths — file I/O, lex/parse/runtime errors
//! from `snek_rt::run_script`, and debug-dump failures — behind one error
//! type so `main` has a single place to map errors to exit codes (spec
//! §6.3: 0 success / 1 uncaught Snek error / 2 usage error).

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("cannot read stdin: {0}")]
    Stdin(std::io::Error),

    #[error(transparent)]
    Script(#[from] snek_rt::error::Error),

    #[error(transparent)]
    Debug(#[from] crate::debug::DebugError),
}

impl CliError {
    /// Exit code 2 for I/O failures reading the requested source (a usage
    /// problem — the file/stdin named on the command line isn't readable);
    /// exit code 1 for everything the language itself rejected.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Io { .. } | CliError::Stdin(_) => 2,
            CliError::Script(_) | CliError::Debug(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_exit_with_code_two() {
        let err = CliError::Io {
            path: PathBuf::from("missing.snek"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn script_errors_exit_with_code_one() {
        let err: CliError = snek_rt::error::Error::without_position("boom").into();
        assert_eq!(err.exit_code(), 1);
    }
}
