// Graphviz output: DOT text, optionally rendered to SVG by the `dot` tool

use crate::analysis::{AnalysisResult, DependencyGraph};
use crate::config::RankDir;
use crate::error::{Error, Result};
use crate::output::Renderer;
use std::fmt::Write as _;
use std::io::Write as _;
use std::process::{Command, Stdio};

/// Writes the dependency graph as a Graphviz digraph
#[derive(Debug, Clone, Copy, Default)]
pub struct DotRenderer {
    rankdir: RankDir,
}

impl DotRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rankdir(mut self, rankdir: RankDir) -> Self {
        self.rankdir = rankdir;
        self
    }

    pub fn render_graph(&self, graph: &DependencyGraph) -> String {
        let mut out = String::new();
        out.push_str("digraph imports {\n");
        let _ = writeln!(out, "    rankdir={};", self.rankdir.as_str());
        out.push_str("    node [style=filled];\n");

        for node in graph.nodes() {
            let _ = writeln!(
                out,
                "    {} [label={}, shape={}, color={}];",
                quote(&node.id),
                quote(&node.label),
                node.style.shape,
                node.style.color
            );
        }

        for edge in graph.edges() {
            let _ = writeln!(out, "    {} -> {};", quote(&edge.from.id), quote(&edge.to.id));
        }

        out.push_str("}\n");
        out
    }
}

/// Quote a DOT identifier
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Renderer for DotRenderer {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn file_name(&self) -> &'static str {
        "import_graph.dot"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        Ok(self.render_graph(&analysis.graph))
    }
}

/// Renders the DOT description to SVG with Graphviz
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    dot: DotRenderer,
    binary: String,
}

impl SvgRenderer {
    pub fn new(dot: DotRenderer) -> Self {
        Self {
            dot,
            binary: "dot".to_string(),
        }
    }

    /// Use a different Graphviz executable
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Pipe DOT text through `dot -Tsvg`.
    ///
    /// Returns `Error::Render` if Graphviz is missing, exits with a failure
    /// status, or produces non-UTF-8 output.
    pub fn render_graph(&self, graph: &DependencyGraph) -> Result<String> {
        let dot = self.dot.render_graph(graph);
        let output = Command::new(&self.binary)
            .arg("-Tsvg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .and_then(|mut child| {
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(dot.as_bytes())?;
                }
                child.wait_with_output()
            })
            .map_err(|e| Error::render("svg", format!("failed to run graphviz '{}': {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(Error::render(
                "svg",
                format!(
                    "graphviz exited with {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| Error::render("svg", format!("invalid UTF-8 from graphviz: {}", e)))
    }
}

impl Renderer for SvgRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn file_name(&self) -> &'static str {
        "import_graph.svg"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        self.render_graph(&analysis.graph)
    }
}
