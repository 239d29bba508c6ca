// Human-readable statistics report

use crate::analysis::{AnalysisResult, ImportBreakdown, ProjectStats};
use crate::error::Result;
use crate::output::listing::NO_FILES;
use crate::output::Renderer;
use std::fmt::Write as _;

/// Plain-text statistics summary
#[derive(Debug, Default)]
pub struct SummaryRenderer;

impl SummaryRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_stats(&self, stats: &ProjectStats, breakdown: &ImportBreakdown, parse_errors: usize) -> String {
        if stats.files == 0 {
            return format!("{}\n", NO_FILES);
        }

        let mut out = String::new();
        out.push_str("Python Code Statistics\n");
        out.push_str("----------------------\n");
        let _ = writeln!(out, "Files scanned: {}", stats.files);
        let _ = writeln!(out, "Total lines: {}", stats.total_lines);
        let _ = writeln!(out, "Blank lines: {}", stats.blank_lines);
        let _ = writeln!(out, "Comment lines: {}", stats.comment_lines);
        let _ = writeln!(out, "def statements: {}", stats.defs);
        let _ = writeln!(out, "class definitions: {}", stats.classes);
        let _ = writeln!(out, "import statements: {}", stats.imports);
        let _ = writeln!(out, "from import statements: {}", stats.from_imports);
        if let Some(longest) = &stats.longest_file {
            let _ = writeln!(out, "Longest file: {} ({} lines)", longest.path, longest.lines);
        }
        if let Some(average) = stats.average_length {
            let _ = writeln!(out, "Average file length: {:.2} lines", average);
        }
        let _ = writeln!(
            out,
            "Imported modules: {} stdlib, {} external, {} local",
            breakdown.stdlib, breakdown.external, breakdown.local
        );
        if parse_errors > 0 {
            let _ = writeln!(out, "Files with syntax errors: {}", parse_errors);
        }
        out
    }
}

impl Renderer for SummaryRenderer {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn file_name(&self) -> &'static str {
        "stats.txt"
    }

    fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        Ok(self.render_stats(&analysis.stats, &analysis.breakdown(), analysis.parse_errors.len()))
    }
}
