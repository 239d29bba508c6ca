// Set of module names that belong to the scanned tree

use crate::analysis::discovery::SourceFile;
use crate::analysis::resolver::module_name;
use serde::Serialize;
use std::collections::BTreeSet;

/// Every dotted-name prefix of every discovered file's module name.
///
/// Built once from the full file set before any classification happens.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LocalModuleIndex {
    modules: BTreeSet<String>,
}

impl LocalModuleIndex {
    /// Build the index from discovered files
    pub fn build(files: &[SourceFile]) -> Self {
        Self::from_module_names(files.iter().map(|f| module_name(&f.path)))
    }

    /// Build the index from already-resolved module names
    pub fn from_module_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut modules = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if name.is_empty() {
                continue;
            }
            for (i, _) in name.match_indices('.') {
                modules.insert(name[..i].to_string());
            }
            modules.insert(name.to_string());
        }
        Self { modules }
    }

    /// Exact membership
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    /// Whether `module` is a local module or a dotted descendant of one
    pub fn is_local(&self, module: &str) -> bool {
        if module.is_empty() {
            return false;
        }
        module
            .match_indices('.')
            .map(|(i, _)| &module[..i])
            .chain(std::iter::once(module))
            .any(|prefix| self.modules.contains(prefix))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }
}
