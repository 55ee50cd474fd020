//! Metrics command implementation

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use crate::metrics::{compute_metrics, ENCODING_NAME};
use crate::utils::format_with_commas;

#[derive(Args)]
pub struct MetricsArgs {
    /// Text file to measure
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print metrics as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MetricsArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let metrics = compute_metrics(&text);

    if args.json {
        let value = json!({
            "file": args.file.display().to_string(),
            "token_count": metrics.token_count,
            "encoding": ENCODING_NAME,
            "size_kb": (metrics.byte_size_kb * 100.0).round() / 100.0,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("File:         {}", args.file.display());
        println!(
            "Total tokens: {} ({ENCODING_NAME})",
            format_with_commas(metrics.token_count as u64)
        );
        println!("File size:    {:.2} KB", metrics.byte_size_kb);
    }

    Ok(())
}
