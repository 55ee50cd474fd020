//! Artifact text and naming.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ProcessedFile;

/// Fallback identifier when the URL is not a recognisable GitHub URL.
pub const FALLBACK_REPO_NAME: &str = "repository";

const RULE: &str = "# ========================================";

static GITHUB_REPO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com[/:]([^/]+)/([^/.]+)").expect("valid GitHub URL regex")
});

/// `<owner>_<repo>` for GitHub-style URLs (https or ssh form).
pub fn repo_name_from_url(url: &str) -> String {
    match GITHUB_REPO.captures(url) {
        Some(caps) => format!("{}_{}", &caps[1], caps[2].trim_end_matches(".git")),
        None => FALLBACK_REPO_NAME.to_string(),
    }
}

/// Metadata block that opens every artifact, blank line included.
pub fn render_header(
    repo_url: &str,
    branch: &str,
    processed_at: NaiveDateTime,
    product_name: &str,
) -> String {
    format!(
        "{RULE}\n# Repository: {repo_url}\n# Branch/Tag: {branch}\n# Processed: {}\n# Processed by: {product_name}\n{RULE}\n\n",
        processed_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Append one file section: provenance comment, raw content, blank-line separator.
pub fn push_file_section(out: &mut String, file: &ProcessedFile) {
    out.push_str("# File: ");
    out.push_str(&file.cleaned_path);
    out.push('\n');
    out.push_str(&file.content);
    out.push_str("\n\n");
}

/// `<owner>_<repo>_<branch>_<YYYYMMDD_HHMMSS>.txt`
pub fn output_file_name(repo_name: &str, branch: &str, processed_at: NaiveDateTime) -> String {
    let branch = branch.replace(['/', '\\'], "-");
    format!("{repo_name}_{branch}_{}.txt", processed_at.format("%Y%m%d_%H%M%S"))
}
