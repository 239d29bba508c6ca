use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pymap.toml";

/// Directory names added to the ignore set when tests are skipped
pub const TEST_DIRS: &[&str] = &["tests", "test"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub graph: GraphConfig,
    pub output: OutputConfig,
}

/// Discovery and parsing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory names skipped wherever they appear in a path
    pub ignore_dirs: Vec<String>,
    /// Skip `tests`/`test` directories as well
    pub skip_tests: bool,
    /// Glob patterns matched against the root-relative path
    pub exclude: Vec<String>,
    /// Source file extensions, without the leading dot
    pub extensions: Vec<String>,
    /// Extra top-level names treated as standard library
    pub extra_stdlib: Vec<String>,
    /// Worker threads for parsing (0 = one per core)
    pub threads: usize,
}

/// Dependency graph settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Give package `__init__` files their package name as node id
    pub merge_init_nodes: bool,
    /// Drop edges from a file to its own module or enclosing package
    pub suppress_self_edges: bool,
    pub rankdir: RankDir,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

/// Graph layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RankDir {
    #[default]
    Lr,
    Tb,
}

impl RankDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankDir::Lr => "LR",
            RankDir::Tb => "TB",
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: [
                "__pycache__",
                ".venv",
                "venv",
                ".git",
                ".tox",
                ".eggs",
                ".mypy_cache",
                ".pytest_cache",
                "node_modules",
                "build",
                "dist",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            skip_tests: false,
            exclude: vec![],
            extensions: vec!["py".to_string()],
            extra_stdlib: vec![],
            threads: 0,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            merge_init_nodes: false,
            suppress_self_edges: false,
            rankdir: RankDir::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("pymap-report"),
        }
    }
}

/// Values given on the command line that override the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ignore_dirs: Vec<String>,
    pub exclude: Vec<String>,
    pub skip_tests: bool,
    pub merge_init_nodes: bool,
    pub suppress_self_edges: bool,
    pub threads: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Effective ignore set, including test directories when requested
    pub fn effective_ignore_dirs(&self) -> Vec<String> {
        let mut dirs = self.ignore_dirs.clone();
        if self.skip_tests {
            for dir in TEST_DIRS {
                if !dirs.iter().any(|d| d == dir) {
                    dirs.push(dir.to_string());
                }
            }
        }
        dirs
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist.
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: CliOverrides) {
        for dir in cli.ignore_dirs {
            if !self.analysis.ignore_dirs.contains(&dir) {
                self.analysis.ignore_dirs.push(dir);
            }
        }

        self.analysis.exclude.extend(cli.exclude);

        if cli.skip_tests {
            self.analysis.skip_tests = true;
        }
        if cli.merge_init_nodes {
            self.graph.merge_init_nodes = true;
        }
        if cli.suppress_self_edges {
            self.graph.suppress_self_edges = true;
        }
        if let Some(threads) = cli.threads {
            self.analysis.threads = threads;
        }
        if let Some(dir) = cli.output_dir {
            self.output.directory = dir;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.analysis.extensions.is_empty() {
            return Err(Error::config_validation(
                "at least one source extension required",
            ));
        }

        if let Some(ext) = self.analysis.extensions.iter().find(|e| e.starts_with('.')) {
            return Err(Error::config_validation(format!(
                "extension '{}' must not start with a dot",
                ext
            )));
        }

        if self.analysis.threads > 512 {
            return Err(Error::config_validation("threads cannot exceed 512"));
        }

        for pattern in &self.analysis.exclude {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }
}
