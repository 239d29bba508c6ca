// Dependency graph of files and the modules they import

use crate::analysis::classifier::{Classification, Classifier, ModuleReference};
use crate::analysis::discovery::SourceFile;
use crate::analysis::resolver::{is_package_init, module_name, resolve_relative};
use crate::parser::ImportDeclaration;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Root-level files that mark the project entry point, in priority order
pub const ENTRY_POINTS: &[&str] = &["main.py", "__init__.py"];

/// Kind of graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Module,
}

/// Display attributes shared by every renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub shape: &'static str,
    pub color: &'static str,
}

impl NodeStyle {
    pub fn file(entry_point: bool) -> Self {
        Self {
            shape: "box",
            color: if entry_point { "red" } else { "lightblue" },
        }
    }

    pub fn module(classification: Classification) -> Self {
        let color = match classification {
            Classification::Local => "blue",
            Classification::StdLib => "gray",
            Classification::External => "green",
        };
        Self {
            shape: "ellipse",
            color,
        }
    }
}

/// A file or referenced module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    /// Set on module nodes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    pub label: String,
    pub style: NodeStyle,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub entry_point: bool,
}

impl GraphNode {
    pub fn file(id: &str, label: &str, entry_point: bool) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::File,
            classification: None,
            label: label.to_string(),
            style: NodeStyle::file(entry_point),
            entry_point,
        }
    }

    pub fn module(id: &str, classification: Classification) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::Module,
            classification: Some(classification),
            label: id.to_string(),
            style: NodeStyle::module(classification),
            entry_point: false,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// One "imports" relation from a file to a module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// Classification of the referenced module
    pub classification: Classification,
    /// Absolute name a relative reference points at, when it can be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    /// Declarations in the file that reference this module, in source order
    pub imports: Vec<ImportDeclaration>,
}

/// Borrowed view of an edge with both endpoints
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'g> {
    pub from: &'g GraphNode,
    pub to: &'g GraphNode,
    pub edge: &'g GraphEdge,
}

/// Deduplicated node set plus edge list.
///
/// Node ids are unique: the first node registered under an id wins.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    ids: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node; returns the existing index when the id is taken
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.ids.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.ids.insert(id, idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) {
        self.graph.add_edge(from, to, edge);
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.ids.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// File nodes sorted by id
    pub fn files(&self) -> Vec<&GraphNode> {
        self.sorted_nodes(NodeKind::File)
    }

    /// Module nodes sorted by id
    pub fn modules(&self) -> Vec<&GraphNode> {
        self.sorted_nodes(NodeKind::Module)
    }

    /// All nodes: files first, then modules, each sorted by id
    pub fn nodes(&self) -> Vec<&GraphNode> {
        let mut nodes = self.files();
        nodes.extend(self.modules());
        nodes
    }

    /// All edges sorted by (from id, to id)
    pub fn edges(&self) -> Vec<EdgeView<'_>> {
        let mut edges: Vec<EdgeView<'_>> = self
            .graph
            .edge_references()
            .map(|e| EdgeView {
                from: &self.graph[e.source()],
                to: &self.graph[e.target()],
                edge: e.weight(),
            })
            .collect();
        edges.sort_by(|a, b| (&a.from.id, &a.to.id).cmp(&(&b.from.id, &b.to.id)));
        edges
    }

    /// Outgoing edges of one file, sorted by target id
    pub fn edges_from(&self, id: &str) -> Vec<EdgeView<'_>> {
        let Some(&idx) = self.ids.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<EdgeView<'_>> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| EdgeView {
                from: &self.graph[e.source()],
                to: &self.graph[e.target()],
                edge: e.weight(),
            })
            .collect();
        edges.sort_by(|a, b| a.to.id.cmp(&b.to.id));
        edges
    }

    /// Number of edges pointing at a node
    pub fn in_degree(&self, id: &str) -> usize {
        self.ids
            .get(id)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    fn sorted_nodes(&self, kind: NodeKind) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self
            .graph
            .node_indices()
            .map(|idx| &self.graph[idx])
            .filter(|n| n.kind == kind)
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }
}

/// Options that change node identity and edge filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Package `__init__` files use the package name as node id
    pub merge_init_nodes: bool,
    /// Drop references to the file's own module or enclosing package
    pub suppress_self_edges: bool,
}

/// Builds a [`DependencyGraph`] from per-file import declarations
pub struct GraphBuilder<'a> {
    classifier: Classifier<'a>,
    options: GraphOptions,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(classifier: Classifier<'a>) -> Self {
        Self {
            classifier,
            options: GraphOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    /// Node id used for a file
    pub fn file_id(&self, file: &SourceFile) -> String {
        if self.options.merge_init_nodes && is_package_init(&file.path) {
            let name = module_name(&file.path);
            if !name.is_empty() {
                return name;
            }
        }
        file.id()
    }

    /// Build the graph.
    ///
    /// Every file node is registered before any module node so a file always
    /// owns its id. Each file contributes one edge per distinct reference.
    pub fn build<'f, I>(&self, files: I) -> DependencyGraph
    where
        I: IntoIterator<Item = (&'f SourceFile, &'f [ImportDeclaration])>,
    {
        let files: Vec<(&SourceFile, &[ImportDeclaration])> = files.into_iter().collect();
        let mut graph = DependencyGraph::new();
        let entry = entry_point(files.iter().map(|(f, _)| *f));

        let file_nodes: Vec<NodeIndex> = files
            .iter()
            .map(|(file, _)| {
                let id = file.id();
                let is_entry = entry.as_deref() == Some(id.as_str());
                graph.add_node(GraphNode::file(&self.file_id(file), &id, is_entry))
            })
            .collect();

        for ((file, imports), from) in files.iter().zip(file_nodes) {
            let own_module = module_name(&file.path);
            let is_package = is_package_init(&file.path);

            for (reference, decls) in unique_references(imports) {
                let resolved = if reference.kind.is_relative() {
                    resolve_relative(&own_module, is_package, reference.kind.level(), &reference.module)
                } else {
                    Some(reference.module.clone())
                };

                if self.options.suppress_self_edges
                    && is_self_reference(&own_module, is_package, resolved.as_deref())
                {
                    debug!(file = %file.id(), module = %reference.id(), "Dropping self edge");
                    continue;
                }

                let classification = self.classifier.classify(&reference);
                let to = graph.add_node(GraphNode::module(&reference.id(), classification));
                graph.add_edge(
                    from,
                    to,
                    GraphEdge {
                        classification,
                        resolved: resolved.filter(|_| reference.kind.is_relative()),
                        imports: decls,
                    },
                );
            }
        }

        graph
    }
}

/// Group a file's declarations by distinct module reference
fn unique_references(imports: &[ImportDeclaration]) -> BTreeMap<ModuleReference, Vec<ImportDeclaration>> {
    let mut references: BTreeMap<ModuleReference, Vec<ImportDeclaration>> = BTreeMap::new();
    for decl in imports {
        references
            .entry(ModuleReference::from(decl))
            .or_default()
            .push(decl.clone());
    }
    references
}

fn is_self_reference(own_module: &str, is_package: bool, resolved: Option<&str>) -> bool {
    let Some(target) = resolved else {
        return false;
    };
    if own_module.is_empty() {
        return false;
    }
    let own_package = if is_package {
        own_module
    } else {
        own_module.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
    };
    target == own_module || (!own_package.is_empty() && target == own_package)
}

/// Relative path of the root-level entry point file, if any
fn entry_point<'f>(files: impl Iterator<Item = &'f SourceFile> + Clone) -> Option<String> {
    ENTRY_POINTS.iter().find_map(|name| {
        files
            .clone()
            .map(SourceFile::id)
            .find(|id| id.as_str() == *name)
    })
}
