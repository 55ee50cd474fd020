//! Process command implementation

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::console::ConsoleSink;
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{Language, TestPathRule};
use crate::fetch::{HttpFetcher, LocalArchiveFetcher, RepoRequest};
use crate::metrics::{compute_metrics, ENCODING_NAME};
use crate::pipeline::{process_repository, PipelineOptions};
use crate::render::output_file_name;
use crate::utils::format_with_commas;

#[derive(Args)]
pub struct ProcessArgs {
    /// GitHub repository URL (e.g. https://github.com/owner/repo)
    #[arg(short = 'r', long, value_name = "URL")]
    pub repo: Option<String>,

    /// Branch or tag to download
    #[arg(long = "ref", value_name = "REF")]
    pub ref_: Option<String>,

    /// Read the snapshot from a local zip instead of downloading it
    #[arg(short = 'a', long, value_name = "ZIP")]
    pub archive: Option<PathBuf>,

    /// Path to config file (repo2llm.toml or .repo2llm.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source language profile: python|go|rust
    #[arg(short = 'l', long, value_name = "LANG")]
    pub language: Option<String>,

    /// Keep only files with this extension (defaults to the language's)
    #[arg(short = 'x', long, value_name = "EXT")]
    pub ext: Option<String>,

    /// How test paths are recognised: substring|segment
    #[arg(long, value_name = "RULE")]
    pub test_path_rule: Option<String>,

    /// Name written to the "Processed by" header line
    #[arg(long, value_name = "NAME")]
    pub product_name: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip archive entries larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// Directory for the output file
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the artifact to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Print a JSON summary instead of the human-readable one
    #[arg(long, conflicts_with = "stdout")]
    pub json: bool,

    /// Only print warnings and errors while processing
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: ProcessArgs) -> Result<()> {
    let start_time = Instant::now();

    let cwd = std::env::current_dir()?;
    let file_config = load_config(&cwd, args.config.as_deref())?;

    let language = args.language.as_deref().map(parse_language).transpose()?;
    let test_path_rule = args.test_path_rule.as_deref().map(parse_test_path_rule).transpose()?;

    let cli_overrides = CliOverrides {
        repo_url: args.repo.clone(),
        branch: args.ref_.clone(),
        language,
        extension: args.ext.clone(),
        test_path_rule,
        product_name: args.product_name.clone(),
        output_dir: args.output_dir.clone(),
        timeout_secs: args.timeout,
        max_file_bytes: args.max_file_bytes,
    };
    let merged = merge_cli_with_config(file_config, cli_overrides);

    let Some(repo_url) = merged.repo_url.as_deref() else {
        anyhow::bail!("--repo must be specified (or set repo_url in the config file)");
    };
    let request = RepoRequest::new(repo_url, &merged.branch)?;

    let processed_at = Local::now().naive_local();
    let options = PipelineOptions::from_config(&merged, processed_at);

    let mut sink = ConsoleSink::new(args.quiet || args.json);
    let bundle = match args.archive.as_ref() {
        Some(path) => {
            process_repository(&request, &LocalArchiveFetcher::new(path), &options, &mut sink)
        }
        None => {
            let fetcher = HttpFetcher::new(Duration::from_secs(merged.timeout_secs))?;
            process_repository(&request, &fetcher, &options, &mut sink)
        }
    };
    drop(sink);

    let Some(content) = bundle.content.as_deref() else {
        anyhow::bail!("Failed to process repository. Check log for details.");
    };

    let metrics = compute_metrics(content);
    let file_name = output_file_name(&bundle.repo_name, request.branch(), processed_at);

    let output_path = if args.stdout {
        print!("{content}");
        None
    } else {
        fs::create_dir_all(&merged.output_dir).with_context(|| {
            format!("Failed to create output directory {}", merged.output_dir.display())
        })?;
        let path = merged.output_dir.join(&file_name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Some(path)
    };

    let skipped = bundle.run.as_ref().map(|run| run.stats.skipped.clone()).unwrap_or_default();

    if args.json {
        let summary = json!({
            "repository": request.repo_url(),
            "branch": request.branch(),
            "repo_name": bundle.repo_name,
            "language": options.language,
            "extension": options.extension,
            "processed_files": bundle.processed_count,
            "total_entries": bundle.total_entries,
            "skipped": skipped,
            "token_count": metrics.token_count,
            "encoding": ENCODING_NAME,
            "size_kb": (metrics.byte_size_kb * 100.0).round() / 100.0,
            "output_file": output_path.as_ref().map(|p| p.display().to_string()),
            "processing_time_seconds": start_time.elapsed().as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    // Keep stdout clean for the artifact itself when --stdout is used.
    let report = |line: String| {
        if args.stdout {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    report(String::new());
    report("Repository processed!".to_string());
    report(String::new());
    report(format!("  Repository:      {} ({})", request.repo_url(), request.branch()));
    report(format!("  Files included:  {}", bundle.processed_count));
    report(format!("  Archive entries: {}", bundle.total_entries));
    if !skipped.is_empty() {
        report("  Files skipped:".to_string());
        for (reason, count) in &skipped {
            report(format!("    {:<20} {count}", format!("{reason}:")));
        }
    }
    report(format!(
        "  Total tokens:    {} ({ENCODING_NAME})",
        format_with_commas(metrics.token_count as u64)
    ));
    report(format!("  File size:       {:.2} KB", metrics.byte_size_kb));
    report(format!("  Processing time: {:.2}s", start_time.elapsed().as_secs_f64()));
    if let Some(path) = output_path {
        report(String::new());
        report(format!("Output file: {}", path.display()));
    }

    Ok(())
}

fn parse_language(language: &str) -> Result<Language> {
    match language.to_ascii_lowercase().as_str() {
        "python" | "py" => Ok(Language::Python),
        "go" | "golang" => Ok(Language::Go),
        "rust" | "rs" => Ok(Language::Rust),
        invalid => anyhow::bail!("Invalid language '{invalid}'. Use: python|go|rust"),
    }
}

fn parse_test_path_rule(rule: &str) -> Result<TestPathRule> {
    match rule.to_ascii_lowercase().as_str() {
        "substring" => Ok(TestPathRule::Substring),
        "segment" => Ok(TestPathRule::Segment),
        invalid => anyhow::bail!("Invalid test path rule '{invalid}'. Use: substring|segment"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_language, parse_test_path_rule};
    use crate::domain::{Language, TestPathRule};

    #[test]
    fn parses_language_aliases() {
        assert_eq!(parse_language("Python").expect("python"), Language::Python);
        assert_eq!(parse_language("golang").expect("go"), Language::Go);
        assert_eq!(parse_language("rs").expect("rust"), Language::Rust);
        let err = parse_language("cobol").expect_err("unknown language");
        assert!(err.to_string().contains("Invalid language 'cobol'"));
    }

    #[test]
    fn parses_test_path_rules() {
        assert_eq!(parse_test_path_rule("SEGMENT").expect("segment"), TestPathRule::Segment);
        assert!(parse_test_path_rule("glob").is_err());
    }
}
