// Analysis pipeline: discover, parse in parallel, then merge in path order

pub mod classifier;
pub mod discovery;
pub mod graph;
pub mod index;
pub mod resolver;
pub mod stats;

pub use classifier::*;
pub use discovery::*;
pub use graph::*;
pub use index::*;
pub use resolver::*;
pub use stats::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::{ParsedSource, PythonParser, TextEncoding};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything known about one analyzed file
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    #[serde(flatten)]
    pub source: SourceFile,
    /// Dotted module name
    pub module: String,
    pub encoding: TextEncoding,
    /// `None` when the file failed to parse
    pub parsed: Option<ParsedSource>,
    pub stats: FileStats,
}

impl FileAnalysis {
    pub fn imports(&self) -> &[crate::parser::ImportDeclaration] {
        self.parsed
            .as_ref()
            .map(|p| p.imports.as_slice())
            .unwrap_or(&[])
    }
}

/// Result of analyzing a source tree
#[derive(Debug)]
pub struct AnalysisResult {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Analyzed files sorted by relative path
    pub files: Vec<FileAnalysis>,
    pub index: LocalModuleIndex,
    pub graph: DependencyGraph,
    pub stats: ProjectStats,
    /// Files that failed to parse (path -> error message)
    pub parse_errors: BTreeMap<PathBuf, String>,
    /// Files that could not be read at all (path -> error message)
    pub skipped: BTreeMap<PathBuf, String>,
}

impl AnalysisResult {
    pub fn file(&self, id: &str) -> Option<&FileAnalysis> {
        self.files.iter().find(|f| f.source.id() == id)
    }

    pub fn breakdown(&self) -> ImportBreakdown {
        ImportBreakdown::from_graph(&self.graph)
    }
}

enum FileOutcome {
    Analyzed {
        analysis: FileAnalysis,
        parse_error: Option<String>,
    },
    Unreadable {
        path: PathBuf,
        message: String,
    },
}

impl FileOutcome {
    fn path(&self) -> &Path {
        match self {
            FileOutcome::Analyzed { analysis, .. } => &analysis.source.path,
            FileOutcome::Unreadable { path, .. } => path,
        }
    }
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    stdlib: StdlibTable,
    verbose: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        // fail early if the grammar cannot be loaded
        PythonParser::new()?;

        let stdlib = StdlibTable::python().with_extra(config.analysis.extra_stdlib.iter().cloned());
        Ok(Self {
            config,
            stdlib,
            verbose: false,
        })
    }

    /// Create analyzer with a progress bar
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replace the standard library table
    pub fn with_stdlib(mut self, stdlib: StdlibTable) -> Self {
        self.stdlib = stdlib;
        self
    }

    /// Discover and analyze a source tree
    pub fn analyze(&self, root: &Path) -> Result<AnalysisResult> {
        let files = self.discoverer()?.discover(root)?;
        info!(root = %root.display(), files = files.len(), "Discovered source files");
        let root = root.canonicalize().map_err(|e| Error::discovery(root, e))?;
        self.analyze_files(&root, files)
    }

    /// Analyze an already-discovered file set, in any order
    pub fn analyze_files(&self, root: &Path, files: Vec<SourceFile>) -> Result<AnalysisResult> {
        let mut outcomes = self.parse_all(&files);
        outcomes.sort_by(|a, b| a.path().cmp(b.path()));

        let mut sources = files;
        sources.sort();
        let index = LocalModuleIndex::build(&sources);
        debug!(modules = index.len(), "Built local module index");

        let mut analyzed = Vec::with_capacity(outcomes.len());
        let mut parse_errors = BTreeMap::new();
        let mut skipped = BTreeMap::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Analyzed {
                    analysis,
                    parse_error,
                } => {
                    if let Some(message) = parse_error {
                        parse_errors.insert(analysis.source.path.clone(), message);
                    }
                    analyzed.push(analysis);
                }
                FileOutcome::Unreadable { path, message } => {
                    skipped.insert(path, message);
                }
            }
        }

        let options = GraphOptions {
            merge_init_nodes: self.config.graph.merge_init_nodes,
            suppress_self_edges: self.config.graph.suppress_self_edges,
        };
        let graph = GraphBuilder::new(Classifier::new(&index, &self.stdlib))
            .with_options(options)
            .build(analyzed.iter().map(|f| (&f.source, f.imports())));
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );

        let ids: Vec<String> = analyzed.iter().map(|f| f.source.id()).collect();
        let stats = ProjectStats::aggregate(
            ids.iter()
                .map(String::as_str)
                .zip(analyzed.iter().map(|f| &f.stats)),
        );

        Ok(AnalysisResult {
            root: root.to_path_buf(),
            files: analyzed,
            index,
            graph,
            stats,
            parse_errors,
            skipped,
        })
    }

    fn discoverer(&self) -> Result<FileDiscoverer> {
        let analysis = &self.config.analysis;
        FileDiscoverer::new()
            .with_ignore_dirs(analysis.effective_ignore_dirs())
            .with_extensions(&analysis.extensions)
            .with_exclude(&analysis.exclude)
    }

    /// Parse every file; one parser per worker thread
    fn parse_all(&self, files: &[SourceFile]) -> Vec<FileOutcome> {
        let progress = self.progress_bar(files.len());

        let run = || -> Vec<FileOutcome> {
            files
                .par_iter()
                .map_init(PythonParser::new, |parser, file| {
                    let outcome = analyze_file(parser, file);
                    progress.inc(1);
                    outcome
                })
                .collect()
        };

        let threads = self.config.analysis.threads;
        let outcomes = if threads > 0 {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!("Cannot build a {}-thread pool, using the default: {}", threads, e);
                    run()
                }
            }
        } else {
            run()
        };

        progress.finish_and_clear();
        outcomes
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("parsing");
        pb
    }
}

/// Read, decode, parse and count one file
fn analyze_file(parser: &mut Result<PythonParser>, file: &SourceFile) -> FileOutcome {
    let (text, encoding) = match file.read_text() {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(path = %file.path.display(), "Skipping unreadable file: {}", e);
            return FileOutcome::Unreadable {
                path: file.path.clone(),
                message: e.to_string(),
            };
        }
    };
    if encoding == TextEncoding::Latin1 {
        debug!(path = %file.path.display(), "Not valid UTF-8, decoded as Latin-1");
    }

    let result = match parser {
        Ok(parser) => parser.parse_source(&text, &file.path),
        Err(e) => Err(Error::parse(&file.path, format!("parser unavailable: {}", e))),
    };

    let (parsed, parse_error) = match result {
        Ok(parsed) => (Some(parsed), None),
        Err(e) => {
            warn!(path = %file.path.display(), "{}", e);
            let message = match e {
                Error::Parse { message, .. } => message,
                other => other.to_string(),
            };
            (None, Some(message))
        }
    };

    let stats = FileStats::from_source(&text, parsed.as_ref());
    FileOutcome::Analyzed {
        analysis: FileAnalysis {
            module: module_name(&file.path),
            source: file.clone(),
            encoding,
            parsed,
            stats,
        },
        parse_error,
    }
}
