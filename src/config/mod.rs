//! Configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, `repo2llm.toml` and
//! `.repo2llm.yml` in the working directory, an explicit `--config` file, then
//! `REPO2LLM_*` environment variables. CLI flags are applied afterwards with
//! [`merge_cli_with_config`].

mod merge;

pub use merge::{merge_cli_with_config, CliOverrides};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::Path;

use crate::domain::Config;

pub const CONFIG_FILE_TOML: &str = "repo2llm.toml";
pub const CONFIG_FILE_YAML: &str = ".repo2llm.yml";
pub const ENV_PREFIX: &str = "REPO2LLM_";

pub fn load_config(anchor: &Path, explicit: Option<&Path>) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(anchor.join(CONFIG_FILE_TOML)))
        .merge(Yaml::file(anchor.join(CONFIG_FILE_YAML)));

    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        figment = if is_yaml {
            figment.merge(Yaml::file(path))
        } else {
            figment.merge(Toml::file(path))
        };
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .with_context(|| format!("Invalid configuration (anchored at {})", anchor.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, TestPathRule};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let dir = TempDir::new().expect("temp dir");
        let config = load_config(dir.path(), None).expect("defaults load");
        assert_eq!(config.branch, "master");
        assert_eq!(config.language, Language::Python);
    }

    #[test]
    fn toml_file_in_anchor_is_picked_up() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join(CONFIG_FILE_TOML),
            "branch = \"main\"\nlanguage = \"go\"\ntest_path_rule = \"segment\"\n",
        )
        .expect("write config");

        let config = load_config(dir.path(), None).expect("config loads");
        assert_eq!(config.branch, "main");
        assert_eq!(config.language, Language::Go);
        assert_eq!(config.test_path_rule, TestPathRule::Segment);
        assert_eq!(config.effective_extension(), ".go");
    }

    #[test]
    fn explicit_yaml_overrides_anchor_toml() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_TOML), "product_name = \"FromToml\"\n")
            .expect("write toml");
        let explicit = dir.path().join("custom.yaml");
        fs::write(&explicit, "product_name: FromYaml\ntimeout_secs: 5\n").expect("write yaml");

        let config = load_config(dir.path(), Some(&explicit)).expect("config loads");
        assert_eq!(config.product_name, "FromYaml");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = load_config(dir.path(), Some(&dir.path().join("nope.toml")))
            .expect_err("missing config");
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_TOML), "language = \"cobol\"\n").expect("write");
        assert!(load_config(dir.path(), None).is_err());
    }
}
