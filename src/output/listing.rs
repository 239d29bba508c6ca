// Grouped Markdown listing of each file's imports

use crate::analysis::{AnalysisResult, Classification, DependencyGraph, EdgeView, ModuleReference};
use crate::error::Result;
use crate::output::Renderer;

/// Text shown for an empty source tree
pub const NO_FILES: &str = "No Python files found.";

/// Lists each file's imports under stdlib / external / local headings
#[derive(Debug, Default)]
pub struct ListingRenderer;

impl ListingRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render straight from a graph
    pub fn render_graph(&self, graph: &DependencyGraph) -> String {
        let files = graph.files();
        if files.is_empty() {
            return format!("{}\n", NO_FILES);
        }

        let mut lines = Vec::new();
        for file in files {
            lines.push(format!("- **{}**", file.label));

            let edges = graph.edges_from(&file.id);
            if edges.is_empty() {
                lines.push("  - (no imports)".to_string());
                continue;
            }

            for group in Classification::ORDERED {
                let in_group: Vec<&EdgeView<'_>> = edges
                    .iter()
                    .filter(|e| e.edge.classification == group)
                    .collect();
                if in_group.is_empty() {
                    continue;
                }
                lines.push(format!("  - **{}**", group));
                for edge in in_group {
                    push_edge(&mut lines, edge);
                }
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Whole-module imports first, then the from-import names
fn push_edge(lines: &mut Vec<String>, edge: &EdgeView<'_>) {
    let Some(first) = edge.edge.imports.first() else {
        return;
    };
    let module = ModuleReference::from(first).id();

    let mut whole = Vec::new();
    let mut names = Vec::new();
    for decl in &edge.edge.imports {
        if decl.is_whole_module() {
            let line = match &decl.alias {
                Some(alias) => format!("    - `import {} as {}`", module, alias),
                None => format!("    - `import {}`", module),
            };
            if !whole.contains(&line) {
                whole.push(line);
            }
        } else {
            for name in &decl.names {
                let entry = match &name.alias {
                    Some(alias) => format!("{} as {}", name.name, alias),
                    None => name.name.clone(),
                };
                if !names.contains(&entry) {
                    names.push(entry);
                }
            }
        }
    }

    lines.extend(whole);
    if !names.is_empty() {
        lines.push(format!("    - `{}`:", module));
        lines.extend(names.into_iter().map(|n| format!("      - {}", n)));
    }
}

impl Renderer for ListingRenderer {
    fn name(&self) -> &'static str {
        "listing"
    }

    fn file_name(&self) -> &'static str {
        "imports.md"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        Ok(self.render_graph(&analysis.graph))
    }
}
