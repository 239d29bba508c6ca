// Machine-readable JSON outputs

use crate::analysis::{
    AnalysisResult, Classification, DependencyGraph, FileAnalysis, FileStats, GraphNode,
    ImportBreakdown, LocalModuleIndex, ProjectStats,
};
use crate::error::Result;
use crate::output::Renderer;
use crate::parser::ImportDeclaration;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct EdgeRecord<'a> {
    from: &'a str,
    to: &'a str,
    classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<&'a str>,
    imports: &'a [ImportDeclaration],
}

#[derive(Serialize)]
struct GraphRecord<'a> {
    nodes: Vec<&'a GraphNode>,
    edges: Vec<EdgeRecord<'a>>,
}

impl<'a> GraphRecord<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        let edges = graph
            .edges()
            .into_iter()
            .map(|e| EdgeRecord {
                from: &e.from.id,
                to: &e.to.id,
                classification: e.edge.classification,
                resolved: e.edge.resolved.as_deref(),
                imports: &e.edge.imports,
            })
            .collect();
        Self {
            nodes: graph.nodes(),
            edges,
        }
    }
}

#[derive(Serialize)]
struct StatsRecord<'a> {
    #[serde(flatten)]
    project: &'a ProjectStats,
    per_file: BTreeMap<String, &'a FileStats>,
}

impl<'a> StatsRecord<'a> {
    fn new(analysis: &'a AnalysisResult) -> Self {
        Self {
            project: &analysis.stats,
            per_file: analysis
                .files
                .iter()
                .map(|f| (f.source.id(), &f.stats))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct AnalysisRecord<'a> {
    root: &'a Path,
    files: &'a [FileAnalysis],
    local_modules: &'a LocalModuleIndex,
    graph: GraphRecord<'a>,
    stats: StatsRecord<'a>,
    imports_by_classification: ImportBreakdown,
    parse_errors: &'a BTreeMap<PathBuf, String>,
    skipped: &'a BTreeMap<PathBuf, String>,
}

/// Nodes and edges as JSON
#[derive(Debug, Default)]
pub struct GraphJsonRenderer;

impl Renderer for GraphJsonRenderer {
    fn name(&self) -> &'static str {
        "graph-json"
    }

    fn file_name(&self) -> &'static str {
        "graph.json"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(&GraphRecord::new(&analysis.graph))?)
    }
}

/// Project totals as a flat record, plus per-file counts
#[derive(Debug, Default)]
pub struct StatsJsonRenderer;

impl Renderer for StatsJsonRenderer {
    fn name(&self) -> &'static str {
        "stats-json"
    }

    fn file_name(&self) -> &'static str {
        "stats.json"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(&StatsRecord::new(analysis))?)
    }
}

/// Full analysis dump for downstream documentation tools
#[derive(Debug, Default)]
pub struct AnalysisJsonRenderer;

impl Renderer for AnalysisJsonRenderer {
    fn name(&self) -> &'static str {
        "analysis-json"
    }

    fn file_name(&self) -> &'static str {
        "analysis.json"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        let record = AnalysisRecord {
            root: &analysis.root,
            files: &analysis.files,
            local_modules: &analysis.index,
            graph: GraphRecord::new(&analysis.graph),
            stats: StatsRecord::new(analysis),
            imports_by_classification: analysis.breakdown(),
            parse_errors: &analysis.parse_errors,
            skipped: &analysis.skipped,
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }
}
