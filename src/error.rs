use std::path::PathBuf;
use thiserror::Error;

/// pymap error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Cannot read source root {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("{renderer} renderer failed: {message}")]
    Render { renderer: String, message: String },

    #[error("Cannot write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),
}

/// Result type alias for pymap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a discovery error for an unreadable root
    pub fn discovery(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Discovery {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }

    /// Create a renderer error
    pub fn render(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Render {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    /// Create an output write error
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts a run instead of being skipped with a warning
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Discovery { .. }
                | Error::PathNotFound(_)
                | Error::OutputWrite { .. }
                | Error::ConfigParse(_)
                | Error::ConfigValidation(_)
                | Error::GlobPattern(_)
        )
    }
}
