//! Path-only heuristics for spotting primary source files.

use crate::classify::profile::LanguageProfile;
use crate::domain::{FilterDecision, SkipReason, TestPathRule};

/// Exact suffix match against the run's single target extension.
pub fn is_source_extension(path: &str, extension: &str) -> bool {
    path.ends_with(extension)
}

/// Whether `path` looks like primary source under the default (substring) test rule.
pub fn is_likely_useful_file(path: &str, profile: &LanguageProfile) -> bool {
    classify_path(path, profile, TestPathRule::Substring).is_included()
}

/// Decide from the cleaned path alone whether a file is worth keeping.
pub fn classify_path(path: &str, profile: &LanguageProfile, rule: TestPathRule) -> FilterDecision {
    let segments: Vec<&str> = path.split('/').collect();

    if segments.iter().any(|segment| segment.starts_with('.')) {
        return FilterDecision::Skipped(SkipReason::HiddenPath);
    }

    if looks_like_test_path(path, &segments, rule) {
        return FilterDecision::Skipped(SkipReason::TestPathSubstring);
    }

    // Only directory components count; the last segment is the file itself.
    let dirs = &segments[..segments.len().saturating_sub(1)];
    if dirs.iter().any(|dir| profile.excluded_dirs.contains(dir)) {
        return FilterDecision::Skipped(SkipReason::ExcludedDir);
    }

    if profile.excluded_files.iter().any(|name| path.contains(name)) {
        return FilterDecision::Skipped(SkipReason::ExcludedFile);
    }

    if profile.doc_markers.iter().any(|marker| path.contains(marker)) {
        return FilterDecision::Skipped(SkipReason::ExcludedFile);
    }

    FilterDecision::Included
}

fn looks_like_test_path(path: &str, segments: &[&str], rule: TestPathRule) -> bool {
    match rule {
        TestPathRule::Substring => path.to_lowercase().contains("test"),
        TestPathRule::Segment => {
            let Some((file_name, dirs)) = segments.split_last() else {
                return false;
            };
            let test_dir = dirs.iter().any(|dir| {
                let dir = dir.to_lowercase();
                dir == "test" || dir == "tests" || dir == "testing"
            });
            test_dir || is_test_file_name(&file_name.to_lowercase())
        }
    }
}

fn is_test_file_name(file_name: &str) -> bool {
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    stem == "conftest" || stem.starts_with("test_") || stem.ends_with("_test") || stem.ends_with("_tests")
}
