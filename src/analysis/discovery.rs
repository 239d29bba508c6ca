// Source file discovery

use crate::error::{Error, Result};
use crate::parser::{decode, TextEncoding};
use glob::Pattern;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourceFile {
    /// Path relative to the scanned root
    pub path: PathBuf,
    /// Canonical absolute path
    pub absolute_path: PathBuf,
}

impl SourceFile {
    /// Read and decode the file's contents
    pub fn read_text(&self) -> Result<(String, TextEncoding)> {
        let bytes = std::fs::read(&self.absolute_path)?;
        Ok(decode(&bytes))
    }

    /// Whether the relative path reaches the file without passing a symlink
    fn is_direct(&self, root: &Path) -> bool {
        root.join(&self.path) == self.absolute_path
    }

    /// Forward-slash relative path, used as the file's node id
    pub fn id(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Walks a root directory and collects source files
pub struct FileDiscoverer {
    ignore_dirs: HashSet<String>,
    exclude: Vec<Pattern>,
    extensions: Vec<String>,
}

impl FileDiscoverer {
    /// Create a discoverer for `.py` files with no ignore rules
    pub fn new() -> Self {
        Self {
            ignore_dirs: HashSet::new(),
            exclude: Vec::new(),
            extensions: vec!["py".to_string()],
        }
    }

    pub fn with_ignore_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set glob patterns matched against root-relative paths
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    /// Discover files under `root`, sorted by relative path.
    ///
    /// Each canonical file is emitted once even when symlinks make it
    /// reachable through several paths. The path without a symlinked
    /// component is kept over any alias, whatever the walk order.
    pub fn discover(&self, root: &Path) -> Result<Vec<SourceFile>> {
        let root = root
            .canonicalize()
            .map_err(|e| Error::discovery(root, e))?;
        std::fs::read_dir(&root).map_err(|e| Error::discovery(&root, e))?;

        let mut found: HashMap<PathBuf, SourceFile> = HashMap::new();

        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_ignored_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.loop_ancestor().is_some() => {
                    debug!("Skipping symlink cycle: {}", e);
                    continue;
                }
                Err(e) => {
                    warn!(
                        path = %e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                        "Skipping unreadable path: {}",
                        e
                    );
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.has_source_extension(entry.path()) {
                continue;
            }

            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            if self.is_excluded(relative) {
                debug!(path = %relative.display(), "Excluded by pattern");
                continue;
            }

            let absolute = match entry.path().canonicalize() {
                Ok(p) => p,
                Err(e) => {
                    warn!(path = %entry.path().display(), "Cannot resolve path: {}", e);
                    continue;
                }
            };
            let file = SourceFile {
                path: relative.to_path_buf(),
                absolute_path: absolute.clone(),
            };
            match found.get(&absolute) {
                Some(kept) if kept.is_direct(&root) || !file.is_direct(&root) => {
                    debug!(path = %relative.display(), "Already discovered through another path");
                }
                _ => {
                    found.insert(absolute, file);
                }
            }
        }

        let mut files: Vec<SourceFile> = found.into_values().collect();
        files.sort();
        Ok(files)
    }

    fn is_ignored_dir(&self, entry: &walkdir::DirEntry) -> bool {
        entry.file_type().is_dir()
            && self
                .ignore_dirs
                .contains(entry.file_name().to_string_lossy().as_ref())
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.extensions.iter().any(|e| ext == e.as_str()))
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

impl Default for FileDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}
