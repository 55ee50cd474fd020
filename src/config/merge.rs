//! CLI argument merging with config

use crate::domain::{Config, Language, TestPathRule};
use std::path::PathBuf;

#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub language: Option<Language>,
    pub extension: Option<String>,
    pub test_path_rule: Option<TestPathRule>,
    pub product_name: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub max_file_bytes: Option<u64>,
}

pub fn merge_cli_with_config(mut base_config: Config, cli: CliOverrides) -> Config {
    if let Some(repo_url) = cli.repo_url {
        base_config.repo_url = Some(repo_url);
    }
    if let Some(branch) = cli.branch {
        base_config.branch = branch;
    }

    if let Some(language) = cli.language {
        // A configured extension belongs to the configured language.
        if language != base_config.language && cli.extension.is_none() {
            base_config.extension = None;
        }
        base_config.language = language;
    }
    if let Some(extension) = cli.extension {
        base_config.extension = Some(extension);
    }
    if let Some(test_path_rule) = cli.test_path_rule {
        base_config.test_path_rule = test_path_rule;
    }

    if let Some(product_name) = cli.product_name {
        base_config.product_name = product_name;
    }
    if let Some(output_dir) = cli.output_dir {
        base_config.output_dir = output_dir;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        base_config.timeout_secs = timeout_secs;
    }
    if let Some(max_file_bytes) = cli.max_file_bytes {
        base_config.max_file_bytes = max_file_bytes;
    }

    base_config
}
