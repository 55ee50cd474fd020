//! Progress events and the sinks that receive them.

use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One notification from a run, delivered in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    FetchStarted { location: String },
    FetchFailed { error: String },
    FetchSucceeded,
    ArchiveUnreadable { error: String },
    EntriesFound { total: usize },
    DecodeFailed { path: String, error: String },
    FileTooLarge { path: String, limit: u64 },
    TestFileSkipped { path: String },
    FileProcessed { path: String },
    Completed { processed: usize, total: usize },
}

impl PipelineEvent {
    pub fn severity(&self) -> Severity {
        match self {
            PipelineEvent::FetchFailed { .. } | PipelineEvent::ArchiveUnreadable { .. } => {
                Severity::Error
            }
            PipelineEvent::DecodeFailed { .. } | PipelineEvent::FileTooLarge { .. } => {
                Severity::Warning
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::FetchStarted { location } => {
                write!(f, "Attempting to download from: {location}")
            }
            PipelineEvent::FetchFailed { error } => {
                write!(f, "Error: Failed to download the repository. {error}")
            }
            PipelineEvent::FetchSucceeded => f.write_str("Download successful. Processing files..."),
            PipelineEvent::ArchiveUnreadable { error } => {
                write!(f, "Error: Could not open the repository archive. {error}")
            }
            PipelineEvent::EntriesFound { total } => {
                write!(f, "Found {total} total files in the archive.")
            }
            PipelineEvent::DecodeFailed { path, error } => {
                write!(f, "Skipping (read/decode error): {path} - {error}")
            }
            PipelineEvent::FileTooLarge { path, limit } => {
                write!(f, "Skipping (larger than {limit} bytes): {path}")
            }
            PipelineEvent::TestFileSkipped { path } => write!(f, "Skipping (test file): {path}"),
            PipelineEvent::FileProcessed { path } => write!(f, "Processing: {path}"),
            PipelineEvent::Completed { processed, total } => write!(
                f,
                "Processing complete. Processed {processed} files out of {total} archive entries."
            ),
        }
    }
}

/// Receiver for pipeline events, typically a log view or terminal.
pub trait LogSink {
    fn push(&mut self, event: PipelineEvent);
}

impl LogSink for Vec<PipelineEvent> {
    fn push(&mut self, event: PipelineEvent) {
        Vec::push(self, event);
    }
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn push(&mut self, event: PipelineEvent) {
        (**self).push(event);
    }
}

/// Forwards every event to `tracing` at a level matching its severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn push(&mut self, event: PipelineEvent) {
        match event.severity() {
            Severity::Info => info!("{event}"),
            Severity::Warning => warn!("{event}"),
            Severity::Error => error!("{event}"),
        }
    }
}
