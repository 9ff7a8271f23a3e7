//! Page-text chunking strategies.
//!
//! Provides different strategies for splitting a page's text into
//! overlapping segments sized for embedding.

mod sentence;
mod token;

pub use sentence::SentenceChunker;
pub use token::TokenChunker;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Sentence-boundary packing, sized in characters.
    Sentence,
    /// Fixed token windows over a subword vocabulary.
    Token,
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentence" => Ok(ChunkingStrategy::Sentence),
            "token" => Ok(ChunkingStrategy::Token),
            _ => Err(format!("Unknown chunking strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingStrategy::Sentence => write!(f, "sentence"),
            ChunkingStrategy::Token => write!(f, "token"),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Target chunk size: characters for sentence chunking, tokens for
    /// token chunking.
    pub target_size: usize,
    /// Overlap carried from the previous chunk, in the same unit.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_size: 800,
            overlap: 120,
        }
    }
}

impl ChunkingConfig {
    /// Overlap actually applied. An overlap at or above the target size
    /// would stall the token window, so such configurations degrade to
    /// no overlap.
    pub fn effective_overlap(&self) -> usize {
        if self.overlap >= self.target_size {
            0
        } else {
            self.overlap
        }
    }
}

/// Trait for chunking implementations.
///
/// Chunkers are pure text transforms; callers filter out any chunks that
/// trim to empty before indexing.
pub trait Chunker: Send + Sync {
    /// Split one page's text into ordered chunk strings.
    fn chunk(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<String>>;
}

/// Create a chunker based on the strategy.
pub fn create_chunker(strategy: ChunkingStrategy) -> Result<Box<dyn Chunker>> {
    match strategy {
        ChunkingStrategy::Sentence => Ok(Box::new(SentenceChunker::new())),
        ChunkingStrategy::Token => Ok(Box::new(TokenChunker::new()?)),
    }
}
