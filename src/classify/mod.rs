//! File classification: path heuristics and import-based test detection

pub mod imports;
pub mod path;
pub mod profile;

pub use imports::{extract_imports, ImportParseError};
pub use path::{classify_path, is_likely_useful_file, is_source_extension};
pub use profile::{profile_for, LanguageProfile};

use tracing::debug;

/// Whether `content` imports one of the profile's test-framework modules.
///
/// Parse failures count as "not a test": a malformed file stays in the
/// artifact rather than stopping the run.
pub fn is_test_file(content: &str, profile: &LanguageProfile) -> bool {
    if !profile.test_detection_supported {
        return false;
    }

    match extract_imports(profile.language, content) {
        Ok(modules) => {
            profile.test_framework_modules.iter().any(|module| modules.contains(*module))
        }
        Err(err) => {
            debug!(language = %profile.language, error = %err, "import scan failed; keeping file");
            false
        }
    }
}
