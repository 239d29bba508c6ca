// Python parser using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
///
/// Holds one tree-sitter parser; create one per worker thread.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse Python source code.
    ///
    /// Returns `Error::Parse` when the source does not parse cleanly; callers
    /// treat that file as having no imports and no structure.
    pub fn parse_source(&mut self, source: &str, path: &Path) -> Result<ParsedSource> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(path, "parser returned no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(Error::parse(path, format!("invalid syntax near line {}", line)));
        }
        if let Some(line) = python2_statement_line(root) {
            return Err(Error::parse(
                path,
                format!("Python 2 statement near line {}", line),
            ));
        }

        let src = source.as_bytes();
        let mut parsed = ParsedSource::default();
        walk(root, src, &mut parsed);
        parsed.docstring = block_docstring(root, src);
        parsed.declarations = top_level_declarations(root, src);

        Ok(parsed)
    }
}

/// Pre-order walk over the whole tree, in source order
fn walk(root: Node, source: &[u8], parsed: &mut ParsedSource) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let descend = visit(node, source, parsed);

        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Record one node; returns whether its children should be visited
fn visit(node: Node, source: &[u8], parsed: &mut ParsedSource) -> bool {
    match node.kind() {
        "import_statement" => {
            parsed.import_statements += 1;
            parse_import(node, source, &mut parsed.imports);
            false
        }
        "import_from_statement" => {
            parsed.from_import_statements += 1;
            if let Some(decl) = parse_import_from(node, source) {
                parsed.imports.push(decl);
            }
            false
        }
        "future_import_statement" => {
            parsed.from_import_statements += 1;
            let names = imported_names(node, source);
            let line = node.start_position().row + 1;
            parsed.imports.push(ImportDeclaration::from_import(
                ImportKind::Absolute,
                "__future__",
                names,
                line,
            ));
            false
        }
        "function_definition" => {
            parsed.defs += 1;
            true
        }
        "class_definition" => {
            parsed.classes += 1;
            true
        }
        _ => true,
    }
}

/// Parse `import a, b.c as d`: one declaration per listed module
fn parse_import(node: Node, source: &[u8], out: &mut Vec<ImportDeclaration>) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => {
                out.push(ImportDeclaration::module(&dotted_name(child, source), None, line));
            }
            "aliased_import" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let alias = child
                    .child_by_field_name("alias")
                    .map(|a| node_text(a, source));
                out.push(ImportDeclaration::module(
                    &dotted_name(name, source),
                    alias.as_deref(),
                    line,
                ));
            }
            _ => {}
        }
    }
}

/// Parse `from x import y`, `from ..x import (y as z)` and `from . import *`
fn parse_import_from(node: Node, source: &[u8]) -> Option<ImportDeclaration> {
    let line = node.start_position().row + 1;
    let module_node = node.child_by_field_name("module_name")?;

    let (kind, module) = if module_node.kind() == "relative_import" {
        relative_import(module_node, source)
    } else {
        (ImportKind::Absolute, dotted_name(module_node, source))
    };

    let mut names = imported_names(node, source);
    if names.is_empty() {
        let mut cursor = node.walk();
        let wildcard = node
            .named_children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import");
        if wildcard {
            names.push(ImportedName::new("*"));
        }
    }

    Some(ImportDeclaration::from_import(kind, &module, names, line))
}

fn imported_names(node: Node, source: &[u8]) -> Vec<ImportedName> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => names.push(ImportedName::new(&dotted_name(child, source))),
            "aliased_import" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| dotted_name(n, source));
                let alias = child
                    .child_by_field_name("alias")
                    .map(|a| node_text(a, source));
                match (name, alias) {
                    (Some(name), Some(alias)) => names.push(ImportedName::with_alias(&name, &alias)),
                    (Some(name), None) => names.push(ImportedName::new(&name)),
                    _ => {}
                }
            }
            _ => {}
        }
    }
    names
}

/// Split `..pkg.mod` into its level and the dotted remainder
fn relative_import(node: Node, source: &[u8]) -> (ImportKind, String) {
    let mut level = 0;
    let mut module = String::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_prefix" => {
                level = node_text(child, source).chars().filter(|c| *c == '.').count();
            }
            "dotted_name" => module = dotted_name(child, source),
            _ => {}
        }
    }

    (ImportKind::Relative { level }, module)
}

/// Dotted name text with any interior whitespace dropped
fn dotted_name(node: Node, source: &[u8]) -> String {
    if node.kind() != "dotted_name" {
        return node_text(node, source);
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() == "identifier")
        .map(|c| node_text(c, source))
        .collect::<Vec<_>>()
        .join(".")
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().trim().to_string()
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

/// The grammar still accepts `print x` and `exec code`, which Python 3 rejects
fn python2_statement_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if matches!(node.kind(), "print_statement" | "exec_statement") {
            return Some(node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Docstring of a module or a definition body: a leading string statement
fn block_docstring(block: Node, source: &[u8]) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;

    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }
    Some(string_literal_value(&node_text(string, source)))
}

/// Strip prefix letters and quotes from a string literal
fn string_literal_value(text: &str) -> String {
    let body = text.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|q| {
            body.strip_prefix(q)
                .and_then(|rest| rest.strip_suffix(q).or(Some(rest)))
        })
        .unwrap_or(body);
    inner.trim().to_string()
}

fn top_level_declarations(root: Node, source: &[u8]) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let definition = if child.kind() == "decorated_definition" {
            child.child_by_field_name("definition")
        } else {
            Some(child)
        };
        if let Some(decl) = definition.and_then(|d| declaration(d, source)) {
            declarations.push(decl);
        }
    }
    declarations
}

fn declaration(node: Node, source: &[u8]) -> Option<Declaration> {
    let kind = match node.kind() {
        "function_definition" => DeclarationKind::Function,
        "class_definition" => DeclarationKind::Class,
        _ => return None,
    };
    let name = node_text(node.child_by_field_name("name")?, source);
    let is_async = node.child(0).is_some_and(|c| c.kind() == "async");
    let docstring = node
        .child_by_field_name("body")
        .and_then(|body| block_docstring(body, source));

    Some(Declaration {
        kind,
        name,
        line: node.start_position().row + 1,
        is_async,
        docstring,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedSource {
        let mut parser = PythonParser::new().unwrap();
        parser.parse_source(source, Path::new("test.py")).unwrap()
    }

    #[test]
    fn test_parser_new() {
        assert!(PythonParser::new().is_ok());
    }

    #[test]
    fn test_empty_file() {
        let parsed = parse("");
        assert!(parsed.is_empty());
        assert_eq!(parsed.import_statements, 0);
    }

    #[test]
    fn test_simple_import() {
        let parsed = parse("import os");
        assert_eq!(parsed.imports.len(), 1);
        assert_eq!(parsed.imports[0].module, "os");
        assert_eq!(parsed.imports[0].kind, ImportKind::Absolute);
        assert!(parsed.imports[0].is_whole_module());
        assert_eq!(parsed.imports[0].alias, None);
        assert_eq!(parsed.import_statements, 1);
    }

    #[test]
    fn test_import_with_alias() {
        let parsed = parse("import numpy as np");
        assert_eq!(parsed.imports[0].module, "numpy");
        assert_eq!(parsed.imports[0].alias.as_deref(), Some("np"));
    }

    #[test]
    fn test_import_multiple_modules() {
        let parsed = parse("import os.path, json as j\n");
        assert_eq!(parsed.import_statements, 1);
        assert_eq!(parsed.imports.len(), 2);
        assert_eq!(parsed.imports[0].module, "os.path");
        assert_eq!(parsed.imports[1].module, "json");
        assert_eq!(parsed.imports[1].alias.as_deref(), Some("j"));
    }

    #[test]
    fn test_from_import() {
        let parsed = parse("from collections import OrderedDict, defaultdict as dd\n");
        assert_eq!(parsed.from_import_statements, 1);
        let decl = &parsed.imports[0];
        assert_eq!(decl.kind, ImportKind::Absolute);
        assert_eq!(decl.module, "collections");
        assert_eq!(
            decl.names,
            vec![
                ImportedName::new("OrderedDict"),
                ImportedName::with_alias("defaultdict", "dd"),
            ]
        );
    }

    #[test]
    fn test_parenthesized_from_import() {
        let parsed = parse("from typing import (\n    Any,\n    Dict,\n)\n");
        assert_eq!(parsed.imports[0].names.len(), 2);
        assert_eq!(parsed.imports[0].names[1].name, "Dict");
    }

    #[test]
    fn test_relative_import() {
        let parsed = parse("from .sibling import helper\nfrom ..pkg.mod import thing\n");
        assert_eq!(parsed.imports[0].kind, ImportKind::Relative { level: 1 });
        assert_eq!(parsed.imports[0].module, "sibling");
        assert_eq!(parsed.imports[1].kind, ImportKind::Relative { level: 2 });
        assert_eq!(parsed.imports[1].module, "pkg.mod");
    }

    #[test]
    fn test_pure_relative_import() {
        let parsed = parse("from . import a, b\nfrom ... import c\n");
        assert_eq!(parsed.imports[0].kind, ImportKind::Relative { level: 1 });
        assert_eq!(parsed.imports[0].module, "");
        assert_eq!(parsed.imports[0].names.len(), 2);
        assert_eq!(parsed.imports[1].kind, ImportKind::Relative { level: 3 });
        assert_eq!(parsed.imports[1].module, "");
    }

    #[test]
    fn test_wildcard_import() {
        let parsed = parse("from os.path import *\n");
        assert_eq!(parsed.imports[0].module, "os.path");
        assert_eq!(parsed.imports[0].names, vec![ImportedName::new("*")]);
    }

    #[test]
    fn test_future_import() {
        let parsed = parse("from __future__ import annotations\nimport os\n");
        assert_eq!(parsed.from_import_statements, 1);
        assert_eq!(parsed.import_statements, 1);
        assert_eq!(parsed.imports[0].module, "__future__");
        assert_eq!(parsed.imports[0].kind, ImportKind::Absolute);
        assert_eq!(parsed.imports[0].names, vec![ImportedName::new("annotations")]);
    }

    #[test]
    fn test_nested_imports_are_found() {
        let source = r#"
def load():
    import json
    return json

class Reader:
    def read(self):
        from pathlib import Path
        return Path

if True:
    try:
        import yaml
    except ImportError:
        yaml = None
"#;
        let parsed = parse(source);
        let modules: Vec<&str> = parsed.imports.iter().map(|d| d.module.as_str()).collect();
        assert_eq!(modules, vec!["json", "pathlib", "yaml"]);
        assert_eq!(parsed.import_statements, 2);
        assert_eq!(parsed.from_import_statements, 1);
    }

    #[test]
    fn test_line_numbers() {
        let parsed = parse("\n\nimport os\n");
        assert_eq!(parsed.imports[0].line, 3);
    }

    #[test]
    fn test_structural_counts() {
        let source = r#"
class A:
    def method(self):
        def inner():
            pass

    class Nested:
        pass

async def fetch():
    pass

@decorator
def decorated():
    pass

square = lambda x: x * x
"#;
        let parsed = parse(source);
        assert_eq!(parsed.defs, 4);
        assert_eq!(parsed.classes, 2);
    }

    #[test]
    fn test_python2_statements_are_parse_errors() {
        let mut parser = PythonParser::new().unwrap();
        for source in ["import os\nprint 'x'\n", "print >>sys.stderr, 'x'\n", "exec \"x = 1\"\n"] {
            let result = parser.parse_source(source, Path::new("legacy.py"));
            assert!(
                matches!(result, Err(Error::Parse { .. })),
                "{:?} should not parse",
                source
            );
        }
        let parsed = parse("import os\nprint('x')\nexec(code)\n");
        assert_eq!(parsed.imports.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let mut parser = PythonParser::new().unwrap();
        let result = parser.parse_source("import os\ndef broken(:\n    pass\n", Path::new("bad.py"));
        match result {
            Err(Error::Parse { path, message }) => {
                assert_eq!(path, Path::new("bad.py"));
                assert!(message.contains("line"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_reusable_after_error() {
        let mut parser = PythonParser::new().unwrap();
        assert!(parser.parse_source("def (", Path::new("a.py")).is_err());
        let parsed = parser.parse_source("import re\n", Path::new("b.py")).unwrap();
        assert_eq!(parsed.imports.len(), 1);
    }

    #[test]
    fn test_module_docstring() {
        let parsed = parse("\"\"\"Utilities for parsing.\"\"\"\n\nimport os\n");
        assert_eq!(parsed.docstring.as_deref(), Some("Utilities for parsing."));
    }

    #[test]
    fn test_module_docstring_after_comment() {
        let parsed = parse("# header\n'''Docs.'''\n");
        assert_eq!(parsed.docstring.as_deref(), Some("Docs."));
    }

    #[test]
    fn test_no_docstring() {
        let parsed = parse("x = 1\n\"\"\"not a docstring\"\"\"\n");
        assert_eq!(parsed.docstring, None);
    }

    #[test]
    fn test_top_level_declarations() {
        let source = r#"
def plain():
    """Do a thing."""

@cache
async def cached():
    pass

class Model:
    r"""A model."""
    def method(self):
        pass
"#;
        let parsed = parse(source);
        assert_eq!(parsed.declarations.len(), 3);

        assert_eq!(parsed.declarations[0].name, "plain");
        assert_eq!(parsed.declarations[0].kind, DeclarationKind::Function);
        assert_eq!(parsed.declarations[0].docstring.as_deref(), Some("Do a thing."));
        assert!(!parsed.declarations[0].is_async);

        assert_eq!(parsed.declarations[1].name, "cached");
        assert!(parsed.declarations[1].is_async);
        assert_eq!(parsed.declarations[1].docstring, None);

        assert_eq!(parsed.declarations[2].name, "Model");
        assert_eq!(parsed.declarations[2].kind, DeclarationKind::Class);
        assert_eq!(parsed.declarations[2].docstring.as_deref(), Some("A model."));
    }

    #[test]
    fn test_string_literal_value() {
        assert_eq!(string_literal_value("\"\"\" text \"\"\""), "text");
        assert_eq!(string_literal_value("'single'"), "single");
        assert_eq!(string_literal_value("r'''raw'''"), "raw");
    }
}
