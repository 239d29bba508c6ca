//! pymap - Map the import structure of Python codebases
//!
//! Discovers Python sources, extracts their imports with tree-sitter,
//! classifies every referenced module as local, standard library or
//! external, and builds a deterministic file-to-module dependency graph
//! with per-file statistics.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{
    AnalysisResult, Analyzer, Classification, Classifier, DependencyGraph, FileDiscoverer,
    GraphBuilder, GraphOptions, LocalModuleIndex, ModuleReference, ProjectStats, SourceFile,
    StdlibTable,
};
pub use config::Config;
pub use error::{Error, Result};
pub use output::Renderer;
pub use parser::{ImportDeclaration, ImportKind, ImportedName, PythonParser};
