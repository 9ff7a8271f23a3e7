//! Plain-text document source.
//!
//! Reads the file as UTF-8; form feeds mark page boundaries, so a file
//! without them is one page.

use super::{split_pages, DocumentSource, Page};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Plain-text extraction source for .txt/.md inputs.
pub struct TextSource;

impl TextSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for TextSource {
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(split_pages(&raw))
    }
}
