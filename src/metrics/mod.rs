//! Token and size metrics for a finished artifact.

use tiktoken_rs::CoreBPE;
use tracing::warn;

use crate::domain::Metrics;

/// Name of the encoding token counts are reported in.
pub const ENCODING_NAME: &str = "cl100k_base";

/// A loaded cl100k_base encoder, reusable across texts.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { bpe: tiktoken_rs::cl100k_base()? })
    }

    /// Token count with special-token strings treated as ordinary text.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// UTF-8 size of `text` in KiB.
pub fn byte_size_kb(text: &str) -> f64 {
    text.len() as f64 / 1024.0
}

/// Token count and size of `text`; a tokenizer that fails to load yields zero tokens.
pub fn compute_metrics(text: &str) -> Metrics {
    let token_count = match TokenCounter::new() {
        Ok(counter) => counter.count(text),
        Err(err) => {
            warn!(error = %err, "could not load {ENCODING_NAME} encoding; reporting 0 tokens");
            0
        }
    };
    Metrics { token_count, byte_size_kb: byte_size_kb(text) }
}
