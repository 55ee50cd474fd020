//! Per-language filtering rules.

use crate::domain::Language;

/// Filtering rules for one source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    pub language: Language,

    /// Source-file extension kept by default (with leading dot)
    pub extension: &'static str,

    /// Directory names whose contents are never primary source
    pub excluded_dirs: &'static [&'static str],

    /// Manifest, build and shim filenames, matched as path substrings
    pub excluded_files: &'static [&'static str],

    /// License, CI and doc-generation markers, matched as path substrings
    pub doc_markers: &'static [&'static str],

    /// Imported module names that mark a file as a test module
    pub test_framework_modules: &'static [&'static str],

    /// Whether content-based test detection exists for this language
    pub test_detection_supported: bool,
}

const PYTHON: LanguageProfile = LanguageProfile {
    language: Language::Python,
    extension: ".py",
    excluded_dirs: &[
        "docs",
        "examples",
        "tests",
        "test",
        "scripts",
        "utils",
        "benchmarks",
        "__pycache__",
    ],
    excluded_files: &["hubconf.py", "setup.py"],
    doc_markers: &[".github", ".gitignore", "LICENSE", "stale.py", "gen-card-", "write_model_card"],
    test_framework_modules: &["unittest", "pytest"],
    test_detection_supported: true,
};

const GO: LanguageProfile = LanguageProfile {
    language: Language::Go,
    extension: ".go",
    excluded_dirs: &["docs", "examples", "tests", "test", "scripts", "utils", "benchmarks", "vendor"],
    excluded_files: &["go.mod", "go.sum", "Makefile"],
    doc_markers: &[".github", ".gitignore", "LICENSE"],
    test_framework_modules: &["testing"],
    test_detection_supported: true,
};

// Rust tests live inline in `#[cfg(test)]` modules, so there is no file-level
// import that marks a whole file as a test.
const RUST: LanguageProfile = LanguageProfile {
    language: Language::Rust,
    extension: ".rs",
    excluded_dirs: &["docs", "examples", "tests", "test", "scripts", "utils", "benchmarks", "target"],
    excluded_files: &["Cargo.toml", "Cargo.lock", "build.rs"],
    doc_markers: &[".github", ".gitignore", "LICENSE"],
    test_framework_modules: &[],
    test_detection_supported: false,
};

pub fn profile_for(language: Language) -> &'static LanguageProfile {
    match language {
        Language::Python => &PYTHON,
        Language::Go => &GO,
        Language::Rust => &RUST,
    }
}
