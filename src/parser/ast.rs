// Syntax-level types extracted from Python source files
//
// These are produced once per file by the parser and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Result of parsing one source file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedSource {
    /// Every import declaration, in source order, at any nesting depth
    pub imports: Vec<ImportDeclaration>,
    /// Number of `def` and `async def` definitions, nested ones included
    pub defs: usize,
    /// Number of `class` definitions, nested ones included
    pub classes: usize,
    /// Number of `import x` statements
    pub import_statements: usize,
    /// Number of `from x import y` statements
    pub from_import_statements: usize,
    /// Module-level docstring
    pub docstring: Option<String>,
    /// Top-level functions and classes
    pub declarations: Vec<Declaration>,
}

impl ParsedSource {
    /// Check if the file declared nothing at all
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.defs == 0 && self.classes == 0
    }
}

/// Whether a reference is resolved from the project root or the importing package
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImportKind {
    /// `import x` or `from x import y`
    Absolute,
    /// `from .x import y`, level = number of leading dots
    Relative { level: usize },
}

impl ImportKind {
    pub fn level(&self) -> usize {
        match self {
            ImportKind::Absolute => 0,
            ImportKind::Relative { level } => *level,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, ImportKind::Relative { .. })
    }
}

/// A single import declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportDeclaration {
    pub kind: ImportKind,
    /// Dotted module path after any leading dots; empty for `from . import x`
    pub module: String,
    /// Imported names; empty means the whole module was imported
    pub names: Vec<ImportedName>,
    /// Alias of a whole-module import (`import x as y`)
    pub alias: Option<String>,
    /// 1-based line number
    pub line: usize,
}

impl ImportDeclaration {
    /// Create an `import x` / `import x as y` declaration
    pub fn module(module: &str, alias: Option<&str>, line: usize) -> Self {
        Self {
            kind: ImportKind::Absolute,
            module: module.to_string(),
            names: Vec::new(),
            alias: alias.map(str::to_string),
            line,
        }
    }

    /// Create a `from x import y` declaration
    pub fn from_import(kind: ImportKind, module: &str, names: Vec<ImportedName>, line: usize) -> Self {
        Self {
            kind,
            module: module.to_string(),
            names,
            alias: None,
            line,
        }
    }

    pub fn is_whole_module(&self) -> bool {
        self.names.is_empty()
    }
}

/// A single imported name with optional alias
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportedName {
    /// Original name
    pub name: String,
    /// Alias (from `as` clause)
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn with_alias(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }
}

/// Kind of top-level declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Function,
    Class,
}

/// A top-level function or class, for documentation tooling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub line: usize,
    pub is_async: bool,
    pub docstring: Option<String>,
}
