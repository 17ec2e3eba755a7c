//! Language labels by file extension.
//!
//! The table doubles as the allow-list for uploaded files: an extension that is
//! not listed here is not accepted as reviewable text.

use std::path::Path;

/// A reviewable file type.
#[derive(Debug, Clone, Copy)]
pub struct FileType {
    /// Display label passed to providers and the scanner, if the type has one.
    pub label: Option<&'static str>,
    /// Lowercase extensions without the leading dot.
    pub extensions: &'static [&'static str],
}

/// Get the file type for an extension (case-insensitive, leading dot optional).
pub fn file_type_for_extension(extension: &str) -> Option<&'static FileType> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    FILE_TYPES.iter().find(|t| t.extensions.contains(&ext.as_str()))
}

/// Get the file type for a file name or path.
pub fn file_type_for_path(path: impl AsRef<Path>) -> Option<&'static FileType> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(file_type_for_extension)
}

/// Detect a language label from a file name, e.g. `main.py` -> `Python`.
pub fn detect_language(path: impl AsRef<Path>) -> Option<&'static str> {
    file_type_for_path(path).and_then(|t| t.label)
}

/// Whether a file with this name may be submitted for review.
pub fn is_allowed_file(path: impl AsRef<Path>) -> bool {
    file_type_for_path(path).is_some()
}

/// All allowed extensions, in table order.
pub fn allowed_extensions() -> impl Iterator<Item = &'static str> {
    FILE_TYPES.iter().flat_map(|t| t.extensions.iter().copied())
}

static FILE_TYPES: &[FileType] = &[
    FileType {
        label: Some("Python"),
        extensions: &["py", "pyw", "pyi"],
    },
    FileType {
        label: Some("JavaScript"),
        extensions: &["js", "mjs", "cjs", "jsx"],
    },
    FileType {
        label: Some("TypeScript"),
        extensions: &["ts", "tsx"],
    },
    FileType {
        label: Some("Java"),
        extensions: &["java"],
    },
    FileType {
        label: Some("C"),
        extensions: &["c", "h"],
    },
    FileType {
        label: Some("C++"),
        extensions: &["cpp", "cc", "cxx", "hpp", "hh"],
    },
    FileType {
        label: Some("C#"),
        extensions: &["cs"],
    },
    FileType {
        label: Some("Go"),
        extensions: &["go"],
    },
    FileType {
        label: Some("Rust"),
        extensions: &["rs"],
    },
    FileType {
        label: Some("Ruby"),
        extensions: &["rb"],
    },
    FileType {
        label: Some("PHP"),
        extensions: &["php"],
    },
    FileType {
        label: Some("Swift"),
        extensions: &["swift"],
    },
    FileType {
        label: Some("Kotlin"),
        extensions: &["kt", "kts"],
    },
    FileType {
        label: Some("Scala"),
        extensions: &["scala"],
    },
    FileType {
        label: Some("Shell"),
        extensions: &["sh", "bash"],
    },
    FileType {
        label: Some("SQL"),
        extensions: &["sql"],
    },
    FileType {
        label: Some("HTML"),
        extensions: &["html", "htm"],
    },
    FileType {
        label: Some("CSS"),
        extensions: &["css"],
    },
    FileType {
        label: None,
        extensions: &["txt", "md"],
    },
];
