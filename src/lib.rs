//! Repo2LLM: flatten a repository snapshot into one LLM-ready text file
//!
//! The library downloads (or reads) a repository zip, keeps the files that
//! look like primary source for one language, drops test modules by
//! inspecting their imports, and concatenates the survivors under a metadata
//! header. Token and size metrics are computed on the result.

pub mod classify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod utils;

pub use domain::{ArchiveEntry, Config, Language, Metrics, RepoBundle, RunResult};
pub use metrics::compute_metrics;
pub use pipeline::{process_repository, run, LogSink, PipelineEvent, PipelineOptions};
