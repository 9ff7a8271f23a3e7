//! Token-window chunker.
//!
//! Slides fixed-size windows over the cl100k_base subword encoding of the
//! input and decodes each window back to text.

use super::{Chunker, ChunkingConfig};
use crate::error::{LeseError, Result};
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Fixed-window token chunker over the cl100k_base vocabulary.
pub struct TokenChunker {
    bpe: CoreBPE,
}

impl TokenChunker {
    /// Create a token chunker, loading the cl100k_base vocabulary.
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| LeseError::Chunking(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Chunker for TokenChunker {
    fn chunk(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let toks = self.bpe.encode_ordinary(text);
        let spans = window_spans(toks.len(), config.target_size, config.effective_overlap());

        let mut out = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            let segment = self
                .bpe
                .decode(toks[start..end].to_vec())
                .map_err(|e| LeseError::Chunking(format!("Token decode failed: {e}")))?;
            out.push(segment);
        }
        Ok(out)
    }
}

/// Window spans over a token sequence of length `total`.
///
/// The window start advances by `target_size - overlap` each step and the
/// loop ends once the start reaches the end of the sequence, so the final
/// window may be shorter than `target_size` but is never empty. `overlap`
/// must already be below `target_size` (see `ChunkingConfig::effective_overlap`).
fn window_spans(total: usize, target_size: usize, overlap: usize) -> Vec<(usize, usize)> {
    if total == 0 || target_size == 0 {
        return Vec::new();
    }
    let step = target_size - overlap;

    let mut spans = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + target_size).min(total);
        spans.push((start, end));
        start += step;
    }
    spans
}
