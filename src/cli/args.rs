//! CLI argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Map the import structure of a Python codebase
#[derive(Parser, Debug)]
#[command(name = "pymap")]
#[command(about = "Map the import structure of a Python codebase")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List each file's imports grouped as stdlib, external and local
    Map {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Describe the file-to-module dependency graph
    Graph {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = GraphFormat::Dot)]
        format: GraphFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Line, definition and import counts
    Stats {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write every output into a directory
    Report {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory (default from config, else ./pymap-report)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Map { common, .. }
            | Command::Graph { common, .. }
            | Command::Stats { common, .. }
            | Command::Report { common, .. } => common,
        }
    }
}

/// Options shared by every mode
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Config file path (default: ./pymap.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory name to ignore (can be repeated)
    #[arg(long = "ignore-dir")]
    pub ignore_dirs: Vec<String>,

    /// Glob pattern to exclude, relative to the root (can be repeated)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Skip `tests` and `test` directories
    #[arg(long)]
    pub skip_tests: bool,

    /// Use the package name as node id for `__init__` files
    #[arg(long)]
    pub merge_init_nodes: bool,

    /// Drop edges from a file to its own module or package
    #[arg(long)]
    pub suppress_self_edges: bool,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Graph output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Graphviz DOT
    Dot,
    /// SVG rendered by Graphviz
    Svg,
    /// Interactive HTML page
    Html,
    /// Nodes and edges as JSON
    Json,
}
