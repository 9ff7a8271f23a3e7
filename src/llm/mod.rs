//! Language model abstraction for answer generation.

mod openai;

pub use openai::OpenAIChat;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for generative language model implementations.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate freeform text for `prompt`.
    ///
    /// An empty completion is returned as an empty string, not an error;
    /// callers decide what an empty answer means.
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}
