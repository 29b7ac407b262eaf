#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # premac
//!
//! A C-family preprocessor library. It consumes a translation unit and its
//! transitively included files, evaluates conditional-compilation
//! directives, maintains a table of object-like, function-like, and variadic
//! macros, expands macros in source lines, and emits the concatenated
//! expanded source. Arbitrary macro expressions can also be evaluated
//! on demand as integer or boolean values.
//!
//! ## Features
//!
//! - Object-like, function-like, and variadic macro expansion, with
//!   string-literal and field-access awareness
//! - Conditional compilation (`#if`, `#ifdef`, `#ifndef`, `#elif`, `#else`,
//!   `#endif`) with a built-in constant-expression evaluator
//! - Include processing over the filesystem or custom resolvers
//! - Multi-line macro invocations and backslash continuations
//!
//! ## Example
//!
//! ```rust
//! use premac::Preprocessor;
//!
//! let mut pp = Preprocessor::new();
//! pp.include_source(
//!     "demo.c",
//!     "#define ADD(a, b) ((a) + (b))\nint x = ADD(1, 2);\n",
//! )
//! .unwrap();
//! assert_eq!(pp.source(), "int x = ((1) + (2));\n");
//! ```

mod config;
mod directive;
mod driver;
mod error;
mod eval;
mod expand;
mod flow;
mod lines;
mod macro_def;
mod scan;

pub use config::{IncludeFilter, IncludeResolver, PragmaHandler, SourceOpener};
pub use driver::{DEFAULT_MAX_EXPANSIONS, Preprocessor};
pub use error::PreprocessError;
pub use eval::Value;
pub use macro_def::Macro;

use std::fs;
use std::path::Path;

/// Preprocess a source string with a fresh [`Preprocessor`] and return the
/// expanded output.
///
/// # Errors
/// Returns [`PreprocessError`] if the input has malformed conditional
/// nesting, an expansion fails, or an include cannot be resolved.
pub fn process<S: AsRef<str>>(input: S) -> Result<String, PreprocessError> {
    let mut pp = Preprocessor::new();
    pp.include_source("<source>", input.as_ref())?;
    Ok(pp.source())
}

/// Preprocess a file and write the expanded output to another file.
///
/// # Errors
/// Returns [`PreprocessError`] if the input cannot be read, preprocessing
/// fails, or the output cannot be written.
pub fn process_file<P: AsRef<Path>>(input_path: P, output_path: P) -> Result<(), PreprocessError> {
    let mut pp = Preprocessor::new();
    pp.include(input_path.as_ref())?;
    fs::write(output_path, pp.source())?;
    Ok(())
}
