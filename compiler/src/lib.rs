//! brine-fidl-compiler
//!
//! This crate implements:
//!  1) Identifier legalization and literal formatting for Dart,
//!  2) A consistency verifier for the FIDL JSON IR (duplicates, index mismatches),
//!  3) The type descriptor compiler, cross-library resolver and result detector,
//!  4) Declaration compilers producing a serializable generation model (`compile`),
//!  5) Dart emission for `fidl.dart`, `fidl_async.dart` and `fidl_test.dart`,
//!  6) The `dartfmt` formatter boundary and error types (`FidlgenError`).

pub mod error;
pub mod names;
pub mod literal;
pub mod utils;
pub mod model;
pub mod verifier;
pub mod compiler;
pub mod resolver;
pub mod type_compiler;
pub mod result;
pub mod decls;
pub mod gen_dart;
pub mod formatter;

pub use compiler::{compile, Compiler};
pub use error::{FidlgenError, Result};
pub use formatter::{FormatPipe, Formatter, FORMATTER_TIMEOUT};
pub use gen_dart::BindingFile;
