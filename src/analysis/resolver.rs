// Mapping file paths to dotted module names

use std::path::{Component, Path};

/// Name of a package initializer without extension
pub const PACKAGE_INIT: &str = "__init__";

/// Dotted module name for a root-relative source path.
///
/// `pkg/sub/mod.py` is `pkg.sub.mod`; `pkg/sub/__init__.py` is `pkg.sub`;
/// a root-level `__init__.py` has an empty name.
pub fn module_name(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.pop() {
        let stem = Path::new(&last)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(last);
        if stem != PACKAGE_INIT {
            segments.push(stem);
        }
    }

    segments.join(".")
}

/// Whether a path names a package initializer
pub fn is_package_init(relative: &Path) -> bool {
    relative
        .file_stem()
        .map(|s| s == PACKAGE_INIT)
        .unwrap_or(false)
}

/// Absolute name a relative reference points at.
///
/// `file_module` is the importing file's module name and `is_package` says
/// whether that file is a package initializer. Returns `None` when `level`
/// climbs above the root or nothing is left to name.
pub fn resolve_relative(
    file_module: &str,
    is_package: bool,
    level: usize,
    module: &str,
) -> Option<String> {
    if level == 0 {
        return (!module.is_empty()).then(|| module.to_string());
    }

    let mut package: Vec<&str> = if file_module.is_empty() {
        Vec::new()
    } else {
        file_module.split('.').collect()
    };
    if !is_package {
        package.pop();
    }

    let up = level - 1;
    if up > package.len() {
        return None;
    }
    package.truncate(package.len() - up);
    if !module.is_empty() {
        package.push(module);
    }

    let resolved = package.join(".");
    (!resolved.is_empty()).then_some(resolved)
}
