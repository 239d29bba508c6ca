// Line and structure statistics per file and per project

use crate::analysis::classifier::Classification;
use crate::analysis::graph::DependencyGraph;
use crate::parser::ParsedSource;
use serde::Serialize;

/// Counts for a single file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub lines: usize,
    pub blank: usize,
    pub comments: usize,
    pub defs: usize,
    pub classes: usize,
    pub imports: usize,
    pub from_imports: usize,
}

impl FileStats {
    /// Line counts from the text; structural counts only when it parsed
    pub fn from_source(text: &str, parsed: Option<&ParsedSource>) -> Self {
        let (lines, blank, comments) = count_lines(text);
        let mut stats = Self {
            lines,
            blank,
            comments,
            ..Default::default()
        };
        if let Some(parsed) = parsed {
            stats.defs = parsed.defs;
            stats.classes = parsed.classes;
            stats.imports = parsed.import_statements;
            stats.from_imports = parsed.from_import_statements;
        }
        stats
    }
}

/// Count lines in source: (total, blank, comment-only)
pub fn count_lines(source: &str) -> (usize, usize, usize) {
    let mut total = 0;
    let mut blank = 0;
    let mut comment = 0;

    for line in physical_lines(source) {
        total += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank += 1;
        } else if trimmed.starts_with('#') {
            comment += 1;
        }
    }

    (total, blank, comment)
}

/// Split on `\n`, `\r\n` or a bare `\r`; a final terminator adds no line
fn physical_lines(source: &str) -> impl Iterator<Item = &str> {
    let mut rest = source;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(|c: char| c == '\n' || c == '\r') {
            Some(i) => {
                let line = &rest[..i];
                let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[i + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

/// The file with the most lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestFile {
    pub path: String,
    pub lines: usize,
}

/// Project-wide sums
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectStats {
    pub files: usize,
    pub total_lines: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,
    pub defs: usize,
    pub classes: usize,
    pub imports: usize,
    pub from_imports: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_file: Option<LongestFile>,
    /// Mean line count; absent for an empty file set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_length: Option<f64>,
}

impl ProjectStats {
    /// Sum per-file stats given in path order.
    ///
    /// On a tie for the longest file the first one wins.
    pub fn aggregate<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a FileStats)>,
    {
        let mut total = Self::default();

        for (path, stats) in files {
            total.files += 1;
            total.total_lines += stats.lines;
            total.blank_lines += stats.blank;
            total.comment_lines += stats.comments;
            total.defs += stats.defs;
            total.classes += stats.classes;
            total.imports += stats.imports;
            total.from_imports += stats.from_imports;

            let longest = total.longest_file.as_ref().map(|l| l.lines).unwrap_or(0);
            if stats.lines > longest {
                total.longest_file = Some(LongestFile {
                    path: path.to_string(),
                    lines: stats.lines,
                });
            }
        }

        if total.files > 0 {
            total.average_length = Some(total.total_lines as f64 / total.files as f64);
        }
        total
    }
}

/// Edge counts per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportBreakdown {
    pub stdlib: usize,
    pub external: usize,
    pub local: usize,
}

impl ImportBreakdown {
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let mut breakdown = Self::default();
        for edge in graph.edges() {
            match edge.edge.classification {
                Classification::StdLib => breakdown.stdlib += 1,
                Classification::External => breakdown.external += 1,
                Classification::Local => breakdown.local += 1,
            }
        }
        breakdown
    }
}
