// Self-contained HTML page with a client-side explorable graph

use crate::analysis::{AnalysisResult, Classification, DependencyGraph, GraphNode, NodeStyle};
use crate::error::Result;
use crate::output::Renderer;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const TEMPLATE: &str = "interactive.html";

#[derive(Serialize)]
struct VisNode<'a> {
    id: &'a str,
    label: &'a str,
    shape: &'a str,
    color: &'a str,
    group: &'a str,
    title: String,
}

#[derive(Serialize)]
struct VisEdge<'a> {
    from: &'a str,
    to: &'a str,
}

#[derive(Serialize)]
struct LegendItem {
    label: &'static str,
    color: &'static str,
}

/// Renders the graph as an HTML page driven by vis-network
pub struct InteractiveRenderer {
    tera: Tera,
    title: String,
}

impl InteractiveRenderer {
    /// Create a renderer with the embedded template
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE, include_str!("../../templates/interactive.html.tera"))?;
        tera.register_filter("pluralize", pluralize);
        Ok(Self {
            tera,
            title: "Import graph".to_string(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn render_graph(&self, graph: &DependencyGraph) -> Result<String> {
        let nodes: Vec<VisNode<'_>> = graph.nodes().into_iter().map(vis_node).collect();
        let edges: Vec<VisEdge<'_>> = graph
            .edges()
            .iter()
            .map(|e| VisEdge {
                from: &e.from.id,
                to: &e.to.id,
            })
            .collect();

        let mut context = Context::new();
        context.insert("title", &self.title);
        context.insert("file_count", &graph.files().len());
        context.insert("module_count", &graph.modules().len());
        context.insert("edge_count", &graph.edge_count());
        context.insert("legend", &legend());
        context.insert("nodes_json", &script_json(&nodes)?);
        context.insert("edges_json", &script_json(&edges)?);

        Ok(self.tera.render(TEMPLATE, &context)?)
    }
}

fn vis_node(node: &GraphNode) -> VisNode<'_> {
    let group = node
        .classification
        .map(|c| c.as_str())
        .unwrap_or("file");
    VisNode {
        id: &node.id,
        label: &node.label,
        shape: node.style.shape,
        color: node.style.color,
        group,
        title: format!("{} ({})", node.id, group),
    }
}

fn legend() -> Vec<LegendItem> {
    let mut items = vec![LegendItem {
        label: "file",
        color: NodeStyle::file(false).color,
    }];
    items.extend(Classification::ORDERED.iter().map(|c| LegendItem {
        label: c.as_str(),
        color: NodeStyle::module(*c).color,
    }));
    items
}

/// JSON safe to embed inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Tera filter: pick the singular or plural word for a count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let key = if count == 1 { "singular" } else { "plural" };
    args.get(key)
        .cloned()
        .ok_or_else(|| tera::Error::msg(format!("pluralize requires a `{}` argument", key)))
}

impl Renderer for InteractiveRenderer {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn file_name(&self) -> &'static str {
        "import_graph.html"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        self.render_graph(&analysis.graph)
    }
}
