//! repo2llm: flatten a GitHub repository into a single LLM-ready text file
//!
//! Downloads a branch snapshot, keeps the likely-useful source files, and
//! writes them out as one concatenated artifact with token and size metrics.

use anyhow::Result;

fn main() -> Result<()> {
    repo2llm::cli::run()
}
