// Classifying referenced modules as local, standard library or external

use crate::analysis::index::LocalModuleIndex;
use crate::parser::{ImportDeclaration, ImportKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where a referenced module comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Local,
    StdLib,
    External,
}

impl Classification {
    /// Listing order of the three groups
    pub const ORDERED: [Classification; 3] = [
        Classification::StdLib,
        Classification::External,
        Classification::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Local => "local",
            Classification::StdLib => "stdlib",
            Classification::External => "external",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A distinct `(kind, module)` pair referenced by a file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModuleReference {
    pub kind: ImportKind,
    pub module: String,
}

impl ModuleReference {
    pub fn new(kind: ImportKind, module: &str) -> Self {
        Self {
            kind,
            module: module.to_string(),
        }
    }

    pub fn absolute(module: &str) -> Self {
        Self::new(ImportKind::Absolute, module)
    }

    pub fn relative(level: usize, module: &str) -> Self {
        Self::new(ImportKind::Relative { level }, module)
    }

    /// Node id: leading dots for the relative level, then the module
    pub fn id(&self) -> String {
        format!("{}{}", ".".repeat(self.kind.level()), self.module)
    }
}

impl From<&ImportDeclaration> for ModuleReference {
    fn from(decl: &ImportDeclaration) -> Self {
        Self::new(decl.kind, &decl.module)
    }
}

/// Top-level standard library module names
#[derive(Debug, Clone)]
pub struct StdlibTable {
    names: HashSet<String>,
}

impl StdlibTable {
    /// An explicit table
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// CPython 3 top-level standard library modules
    pub fn python() -> Self {
        Self::new(PYTHON_STDLIB.iter().copied())
    }

    /// Add names on top of the current table
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Check the leading segment of a dotted name
    pub fn contains_top_level(&self, module: &str) -> bool {
        let top_level = module.split('.').next().unwrap_or(module);
        self.names.contains(top_level)
    }
}

impl Default for StdlibTable {
    fn default() -> Self {
        Self::python()
    }
}

/// Classifies module references against a fixed index and stdlib table
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    index: &'a LocalModuleIndex,
    stdlib: &'a StdlibTable,
}

impl<'a> Classifier<'a> {
    pub fn new(index: &'a LocalModuleIndex, stdlib: &'a StdlibTable) -> Self {
        Self { index, stdlib }
    }

    /// First match wins: relative, local, stdlib, external
    pub fn classify(&self, reference: &ModuleReference) -> Classification {
        if reference.kind.is_relative() || self.index.is_local(&reference.module) {
            Classification::Local
        } else if self.stdlib.contains_top_level(&reference.module) {
            Classification::StdLib
        } else {
            Classification::External
        }
    }
}

const PYTHON_STDLIB: &[&str] = &[
    "__future__", "_abc", "_ast", "_collections_abc", "_io", "_thread", "_weakref",
    "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio", "asyncore",
    "atexit", "audioop", "base64", "bdb", "binascii", "binhex", "bisect", "builtins",
    "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs",
    "codeop", "collections", "colorsys", "compileall", "concurrent", "configparser",
    "contextlib", "contextvars", "copy", "copyreg", "cProfile", "crypt", "csv",
    "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis",
    "distutils", "doctest", "email", "encodings", "ensurepip", "enum", "errno",
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "genericpath", "getopt", "getpass", "gettext", "glob", "graphlib",
    "grp", "gzip", "hashlib", "heapq", "hmac", "html", "http", "idlelib", "imaplib",
    "imghdr", "imp", "importlib", "inspect", "io", "ipaddress", "itertools", "json",
    "keyword", "lib2to3", "linecache", "locale", "logging", "lzma", "mailbox",
    "mailcap", "marshal", "math", "mimetypes", "mmap", "modulefinder", "msvcrt",
    "multiprocessing", "netrc", "nis", "nntplib", "ntpath", "numbers", "opcode",
    "operator", "optparse", "os", "ossaudiodev", "pathlib", "pdb", "pickle",
    "pickletools", "pipes", "pkgutil", "platform", "plistlib", "poplib", "posix",
    "posixpath", "pprint", "profile", "pstats", "pty", "pwd", "py_compile", "pyclbr",
    "pydoc", "pyexpat", "queue", "quopri", "random", "re", "readline", "reprlib",
    "resource", "rlcompleter", "runpy", "sched", "secrets", "select", "selectors",
    "shelve", "shlex", "shutil", "signal", "site", "smtpd", "smtplib", "sndhdr",
    "socket", "socketserver", "spwd", "sqlite3", "sre_compile", "sre_constants",
    "sre_parse", "ssl", "stat", "statistics", "string", "stringprep", "struct",
    "subprocess", "sunau", "symtable", "sys", "sysconfig", "syslog", "tabnanny",
    "tarfile", "telnetlib", "tempfile", "termios", "test", "textwrap", "threading",
    "time", "timeit", "tkinter", "token", "tokenize", "tomllib", "trace", "traceback",
    "tracemalloc", "tty", "turtle", "turtledemo", "types", "typing", "unicodedata",
    "unittest", "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref",
    "webbrowser", "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc",
    "zipapp", "zipfile", "zipimport", "zlib", "zoneinfo",
];
