//! Snek CLI library: shared between the `snek` binary and its integration
//! tests.

pub mod colors;
pub mod debug;
pub mod error;
pub mod repl;
