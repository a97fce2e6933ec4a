//! Batch and interactive command processing for a raster image toolkit's
//! command-line front end.
//!
//! This crate is the line-oriented shell of the toolkit: it reads one command
//! per line from a script file, a pipe, or the terminal, splits it with
//! either Unix- or Windows-style quoting rules, and dispatches the resulting
//! argument vector to a pluggable sub-command registry for a pass/fail
//! verdict. The image operations themselves (convert, identify, and the
//! rest) live behind the [`command::CommandRegistry`] seam and are registered
//! by the embedding toolkit.
//!
//! The main entry point is [`BatchDriver`], which owns the session's
//! [`BatchOptions`] and runs the read-eval-dispatch loop. The public modules
//! [`tokenizer`], [`options`], [`command`], and [`input`] expose the pieces
//! individually for embedding and testing.

pub mod command;
mod driver;
pub mod input;
pub mod options;
pub mod tokenizer;

pub use driver::BatchDriver;
pub use options::BatchOptions;
pub use tokenizer::EscapeStyle;
