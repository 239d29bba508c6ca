// Parser module for extracting imports and structure from Python sources

pub mod ast;
mod python;
mod source;

pub use ast::*;
pub use python::PythonParser;
pub use source::{decode, TextEncoding};
