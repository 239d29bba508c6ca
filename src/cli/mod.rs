//! CLI module for pymap

mod args;

pub use args::{Args, Command, CommonArgs, GraphFormat};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::config::{CliOverrides, Config, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{
    self, DotRenderer, GraphJsonRenderer, InteractiveRenderer, ListingRenderer, Renderer,
    StatsJsonRenderer, SummaryRenderer, SvgRenderer,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.command.common().verbose);

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    let config = load_config(args.command.common(), report_dir(&args.command))?;

    match args.command {
        Command::Map {
            path,
            output,
            common,
        } => {
            let analysis = analyze(&path, config, common.verbose)?;
            emit(&ListingRenderer::new(), &analysis, output.as_deref())
        }

        Command::Graph {
            path,
            format,
            output,
            common,
        } => {
            let rankdir = config.graph.rankdir;
            let analysis = analyze(&path, config, common.verbose)?;
            let dot = DotRenderer::new().with_rankdir(rankdir);
            let renderer: Box<dyn Renderer> = match format {
                GraphFormat::Dot => Box::new(dot),
                GraphFormat::Svg => Box::new(SvgRenderer::new(dot)),
                GraphFormat::Html => Box::new(InteractiveRenderer::new()?),
                GraphFormat::Json => Box::new(GraphJsonRenderer),
            };
            emit(renderer.as_ref(), &analysis, output.as_deref())
        }

        Command::Stats {
            path,
            json,
            output,
            common,
        } => {
            let analysis = analyze(&path, config, common.verbose)?;
            if json {
                emit(&StatsJsonRenderer, &analysis, output.as_deref())
            } else {
                emit(&SummaryRenderer::new(), &analysis, output.as_deref())
            }
        }

        Command::Report { path, common, .. } => {
            let dir = config.output.directory.clone();
            let renderers = output::report_renderers(&config)?;
            let analysis = analyze(&path, config, common.verbose)?;

            let report = output::write_report(&analysis, &renderers, &dir)?;
            for (name, message) in &report.skipped {
                eprintln!("Skipped {}: {}", name, message);
            }
            println!("{}", report.summary());
            println!("Report written to: {}", dir.display());
            Ok(())
        }
    }
}

fn report_dir(command: &Command) -> Option<PathBuf> {
    match command {
        Command::Report { output, .. } => output.clone(),
        _ => None,
    }
}

/// Config file, then CLI flags on top
fn load_config(common: &CommonArgs, output_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = match &common.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    config.merge_cli(CliOverrides {
        ignore_dirs: common.ignore_dirs.clone(),
        exclude: common.exclude.clone(),
        skip_tests: common.skip_tests,
        merge_init_nodes: common.merge_init_nodes,
        suppress_self_edges: common.suppress_self_edges,
        threads: common.threads,
        output_dir,
    });
    config.validate()?;
    Ok(config)
}

fn analyze(path: &Path, config: Config, verbose: bool) -> Result<AnalysisResult> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }

    let analysis = Analyzer::new(config)?.with_verbose(verbose).analyze(path)?;
    info!(
        files = analysis.files.len(),
        parse_errors = analysis.parse_errors.len(),
        skipped = analysis.skipped.len(),
        "Analysis complete"
    );
    Ok(analysis)
}

/// Render one output to a file or stdout.
///
/// A renderer failure only warns; a write failure is an error.
fn emit(renderer: &dyn Renderer, analysis: &AnalysisResult, output: Option<&Path>) -> Result<()> {
    let content = match renderer.render(analysis) {
        Ok(content) => content,
        Err(e) if !e.is_fatal() => {
            warn!(renderer = renderer.name(), "No output produced: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match output {
        Some(path) => {
            output::write_output(path, &content)?;
            info!(path = %path.display(), "Wrote {}", renderer.name());
        }
        None => print!("{}", content),
    }
    Ok(())
}
