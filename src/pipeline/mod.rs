//! Filtering and assembly pipeline
//!
//! [`run`] walks archive entries in order, keeps the ones that look like
//! primary source and are not test modules, and concatenates them under a
//! metadata header. [`process_repository`] wraps it with fetching and
//! archive reading.

pub mod events;

pub use events::{LogSink, PipelineEvent, Severity, TracingSink};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::classify::{classify_path, is_source_extension, is_test_file, profile_for, LanguageProfile};
use crate::domain::{
    ArchiveEntry, Config, FilterDecision, Language, ProcessedFile, RepoBundle,
    RunResult, RunStats, SkipReason, TestPathRule,
};
use crate::fetch::{read_zip_entries, ArchiveError, ArchiveFetcher, RepoRequest};
use crate::render::{push_file_section, render_header, repo_name_from_url};
use crate::utils::decode_utf8_strict;

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub language: Language,

    /// Dot-prefixed extension every kept file must end with
    pub extension: String,

    pub test_path_rule: TestPathRule,
    pub product_name: String,

    /// Entries larger than this are skipped unread
    pub max_file_bytes: u64,

    /// Timestamp written into the header
    pub processed_at: NaiveDateTime,
}

impl PipelineOptions {
    pub fn from_config(config: &Config, processed_at: NaiveDateTime) -> Self {
        Self {
            language: config.language,
            extension: config.effective_extension(),
            test_path_rule: config.test_path_rule,
            product_name: config.product_name.clone(),
            max_file_bytes: config.max_file_bytes,
            processed_at,
        }
    }

    pub fn profile(&self) -> &'static LanguageProfile {
        profile_for(self.language)
    }
}

/// Filter and concatenate `entries`. Never fails: every problem with a single
/// entry becomes a counted skip.
pub fn run<I, S>(
    entries: I,
    request: &RepoRequest,
    options: &PipelineOptions,
    sink: &mut S,
) -> RunResult
where
    I: IntoIterator<Item = ArchiveEntry>,
    S: LogSink + ?Sized,
{
    let profile = options.profile();
    let mut text = render_header(
        request.repo_url(),
        request.branch(),
        options.processed_at,
        &options.product_name,
    );
    let mut stats = RunStats::default();
    let mut files = Vec::new();
    let mut total_entries = 0usize;

    for entry in entries {
        total_entries += 1;
        if entry.is_directory {
            stats.directories += 1;
            continue;
        }

        match admit(entry, profile, options, sink) {
            Ok(file) => {
                sink.push(PipelineEvent::FileProcessed { path: file.cleaned_path.clone() });
                push_file_section(&mut text, &file);
                files.push(file.cleaned_path);
            }
            Err(reason) => stats.record_skip(reason),
        }
    }

    let processed_count = files.len();
    sink.push(PipelineEvent::Completed { processed: processed_count, total: total_entries });

    RunResult {
        concatenated_text: text,
        processed_count,
        total_entries,
        repo_name: repo_name_from_url(request.repo_url()),
        files,
        stats,
    }
}

fn admit<S>(
    entry: ArchiveEntry,
    profile: &LanguageProfile,
    options: &PipelineOptions,
    sink: &mut S,
) -> Result<ProcessedFile, SkipReason>
where
    S: LogSink + ?Sized,
{
    let cleaned = entry.cleaned_path().to_string();
    if cleaned.is_empty() {
        return Err(SkipReason::EmptyPath);
    }

    // Path rejections are routine; they are counted but not reported to the sink.
    if !is_source_extension(&cleaned, &options.extension) {
        return Err(SkipReason::WrongExtension);
    }
    if let FilterDecision::Skipped(reason) =
        classify_path(&cleaned, profile, options.test_path_rule)
    {
        debug!(path = %cleaned, %reason, "path filtered");
        return Err(reason);
    }

    let decoded = match entry.body.read(options.max_file_bytes) {
        Ok(bytes) => decode_utf8_strict(&bytes).map_err(|err| err.to_string()),
        Err(ArchiveError::TooLarge { limit }) => {
            sink.push(PipelineEvent::FileTooLarge { path: cleaned, limit });
            return Err(SkipReason::TooLarge);
        }
        Err(err) => Err(err.to_string()),
    };
    let content = match decoded {
        Ok(content) => content,
        Err(error) => {
            sink.push(PipelineEvent::DecodeFailed { path: cleaned, error });
            return Err(SkipReason::DecodeError);
        }
    };

    if is_test_file(&content, profile) {
        sink.push(PipelineEvent::TestFileSkipped { path: cleaned });
        return Err(SkipReason::TestContent);
    }

    Ok(ProcessedFile { cleaned_path: cleaned, content })
}

/// Fetch, unpack and process one repository.
///
/// Fetch and archive failures are reported to `sink` and produce a bundle
/// whose `content` is `None`.
pub fn process_repository<F, S>(
    request: &RepoRequest,
    fetcher: &F,
    options: &PipelineOptions,
    sink: &mut S,
) -> RepoBundle
where
    F: ArchiveFetcher + ?Sized,
    S: LogSink + ?Sized,
{
    let repo_name = repo_name_from_url(request.repo_url());

    sink.push(PipelineEvent::FetchStarted { location: fetcher.location(request) });
    let bytes = match fetcher.fetch(request) {
        Ok(bytes) => bytes,
        Err(err) => {
            sink.push(PipelineEvent::FetchFailed { error: err.to_string() });
            return RepoBundle::failed(repo_name);
        }
    };
    sink.push(PipelineEvent::FetchSucceeded);

    let entries = match read_zip_entries(bytes) {
        Ok(entries) => entries,
        Err(err) => {
            sink.push(PipelineEvent::ArchiveUnreadable { error: err.to_string() });
            return RepoBundle::failed(repo_name);
        }
    };
    sink.push(PipelineEvent::EntriesFound { total: entries.len() });

    RepoBundle::from_run(run(entries, request, options, sink))
}
