// Report renderers over a finished analysis
//
// Renderers only format data already in the graph and statistics; none of
// them reads or parses source files.

pub mod dot;
pub mod interactive;
pub mod json;
pub mod listing;
pub mod summary;

pub use dot::{DotRenderer, SvgRenderer};
pub use interactive::InteractiveRenderer;
pub use json::{AnalysisJsonRenderer, GraphJsonRenderer, StatsJsonRenderer};
pub use listing::ListingRenderer;
pub use summary::SummaryRenderer;

use crate::analysis::AnalysisResult;
use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A single output format
pub trait Renderer {
    /// Short name used in messages
    fn name(&self) -> &'static str;

    /// File name used when writing into a report directory
    fn file_name(&self) -> &'static str;

    fn render(&self, analysis: &AnalysisResult) -> Result<String>;
}

/// Every renderer written by a full report, in write order
pub fn report_renderers(config: &Config) -> Result<Vec<Box<dyn Renderer>>> {
    let rankdir = config.graph.rankdir;
    Ok(vec![
        Box::new(ListingRenderer::new()),
        Box::new(DotRenderer::new().with_rankdir(rankdir)),
        Box::new(SvgRenderer::new(DotRenderer::new().with_rankdir(rankdir))),
        Box::new(InteractiveRenderer::new()?),
        Box::new(GraphJsonRenderer),
        Box::new(StatsJsonRenderer),
        Box::new(AnalysisJsonRenderer),
    ])
}

/// Outcome of writing a report directory
#[derive(Debug, Default)]
pub struct ReportSummary {
    pub written: Vec<PathBuf>,
    /// Renderers that failed, with their error message
    pub skipped: Vec<(String, String)>,
}

impl ReportSummary {
    pub fn summary(&self) -> String {
        let mut s = format!("Wrote {} files", self.written.len());
        if !self.skipped.is_empty() {
            s.push_str(&format!(", skipped {}", self.skipped.len()));
        }
        s
    }
}

/// Write a string to a file, creating parent directories
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::output_write(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| Error::output_write(path, e))
}

/// Run every renderer and write its output into `dir`.
///
/// A renderer that fails is skipped with a warning; a file that cannot be
/// written aborts the report.
pub fn write_report(
    analysis: &AnalysisResult,
    renderers: &[Box<dyn Renderer>],
    dir: &Path,
) -> Result<ReportSummary> {
    std::fs::create_dir_all(dir).map_err(|e| Error::output_write(dir, e))?;

    let mut report = ReportSummary::default();
    for renderer in renderers {
        let content = match renderer.render(analysis) {
            Ok(content) => content,
            Err(e) => {
                warn!(renderer = renderer.name(), "Skipping output: {}", e);
                report.skipped.push((renderer.name().to_string(), e.to_string()));
                continue;
            }
        };
        let path = dir.join(renderer.file_name());
        write_output(&path, &content)?;
        info!(path = %path.display(), "Wrote {}", renderer.name());
        report.written.push(path);
    }
    Ok(report)
}
