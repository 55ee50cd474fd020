//! Core domain types and models
//!
//! Archive entries, filter decisions, run results and the configuration
//! shared by the library and the CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::fetch::archive::EntryBody;

/// Product attribution written into every artifact header by default.
pub const DEFAULT_PRODUCT_NAME: &str = "MAGIC-Repo2LLM";

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "master";

/// Largest entry body, in bytes, that is read out of an archive.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Source language a run is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Go,
    Rust,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the path classifier decides that a path belongs to tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestPathRule {
    /// Reject any path whose lowercased form contains `test`.
    #[default]
    Substring,
    /// Reject only test-named directories and test-named files.
    Segment,
}

/// One record extracted from a repository archive.
#[derive(Debug)]
pub struct ArchiveEntry {
    /// Path as stored in the archive, including the synthetic top-level folder
    pub path: String,

    /// Entry body, read only once the path has been accepted
    pub body: EntryBody,

    /// Whether the archive marks this entry as a directory
    pub is_directory: bool,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), body: EntryBody::Loaded(Ok(bytes.into())), is_directory: false }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self { path: path.into(), body: EntryBody::Loaded(Ok(Vec::new())), is_directory: true }
    }

    /// Path with the synthetic top-level archive folder removed.
    pub fn cleaned_path(&self) -> &str {
        clean_archive_path(&self.path)
    }
}

/// Strip the first `/`-separated component (e.g. `repo-main/`) from an archive path.
pub fn clean_archive_path(path: &str) -> &str {
    match path.split_once('/') {
        Some((_, rest)) => rest,
        None => "",
    }
}

/// Why an entry did not make it into the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    EmptyPath,
    WrongExtension,
    ExcludedDir,
    ExcludedFile,
    HiddenPath,
    TestPathSubstring,
    TestContent,
    DecodeError,
    TooLarge,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::EmptyPath => "empty-path",
            SkipReason::WrongExtension => "wrong-extension",
            SkipReason::ExcludedDir => "excluded-dir",
            SkipReason::ExcludedFile => "excluded-file",
            SkipReason::HiddenPath => "hidden-path",
            SkipReason::TestPathSubstring => "test-path-substring",
            SkipReason::TestContent => "test-content",
            SkipReason::DecodeError => "decode-error",
            SkipReason::TooLarge => "too-large",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entry outcome of filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Included,
    Skipped(SkipReason),
}

impl FilterDecision {
    pub fn is_included(self) -> bool {
        matches!(self, FilterDecision::Included)
    }
}

/// A file that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub cleaned_path: String,
    pub content: String,
}

/// Counters collected during one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Directory entries seen in the archive
    pub directories: usize,

    /// Non-directory entries skipped, by reason
    #[serde(default)]
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl RunStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

/// Output of one pipeline run, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub concatenated_text: String,
    pub processed_count: usize,
    pub total_entries: usize,
    pub repo_name: String,

    /// Cleaned paths of the included files, in archive order
    pub files: Vec<String>,

    pub stats: RunStats,
}

/// Size and token metrics of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub token_count: usize,
    pub byte_size_kb: f64,
}

/// What the whole fetch-and-process flow hands back to its caller.
///
/// `content` is `None` when no artifact could be produced (fetch or archive
/// failure); the log sink holds the details.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoBundle {
    pub repo_name: String,
    pub content: Option<String>,
    pub processed_count: usize,
    pub total_entries: usize,
    pub run: Option<RunResult>,
}

impl RepoBundle {
    pub fn failed(repo_name: String) -> Self {
        Self { repo_name, content: None, processed_count: 0, total_entries: 0, run: None }
    }

    pub fn from_run(run: RunResult) -> Self {
        Self {
            repo_name: run.repo_name.clone(),
            content: Some(run.concatenated_text.clone()),
            processed_count: run.processed_count,
            total_entries: run.total_entries,
            run: Some(run),
        }
    }
}

/// Main configuration for repo2llm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Input source
    #[serde(default)]
    pub repo_url: Option<String>,

    #[serde(default = "default_branch")]
    pub branch: String,

    // Filtering options
    #[serde(default)]
    pub language: Language,

    /// Source extension to keep; defaults to the language profile's extension
    #[serde(default)]
    pub extension: Option<String>,

    #[serde(default)]
    pub test_path_rule: TestPathRule,

    // Output options
    #[serde(default = "default_product_name")]
    pub product_name: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    // Fetching
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Entries larger than this are skipped without being decompressed
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Config {
    /// Extension in effect for this configuration, always dot-prefixed.
    pub fn effective_extension(&self) -> String {
        match self.extension.as_deref().map(str::trim) {
            Some(ext) if !ext.is_empty() => normalize_extension(ext),
            _ => crate::classify::profile_for(self.language).extension.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: None,
            branch: default_branch(),
            language: Language::default(),
            extension: None,
            test_path_rule: TestPathRule::default(),
            product_name: default_product_name(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Add a leading dot when missing (`py` -> `.py`).
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    if trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{trimmed}")
    }
}

// Default value functions for serde
fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_product_name() -> String {
    DEFAULT_PRODUCT_NAME.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}
