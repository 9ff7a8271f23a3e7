//! Document page extraction.
//!
//! Text extraction itself is delegated to external tooling; this module only
//! defines the page-oriented interface the ingestion pipeline consumes.

mod pdf;
mod text;

pub use pdf::PdfSource;
pub use text::TextSource;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// One page of extracted document text.
///
/// `number` is 1-based. `text` may be empty for image-only pages.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// Trait for document page extraction implementations.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Extract the pages of the document at `path`, in order.
    async fn extract(&self, path: &Path) -> Result<Vec<Page>>;
}

/// Pick an extraction source based on the file extension.
///
/// PDFs go through `pdftotext`; everything else is read as plain text.
pub fn source_for_path(path: &Path) -> Box<dyn DocumentSource> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => Box::new(PdfSource::new()),
        _ => Box::new(TextSource::new()),
    }
}

/// Display name used as the `source` metadata for a document's chunks.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Split raw extracted text into pages on form-feed boundaries.
///
/// `pdftotext` emits a form feed after each page; plain-text documents may
/// use the same convention. Input without form feeds is a single page.
pub(crate) fn split_pages(raw: &str) -> Vec<Page> {
    let mut parts: Vec<&str> = raw.split('\u{c}').collect();
    // A trailing form feed leaves an empty final part
    if parts.last().is_some_and(|p| p.trim().is_empty()) && parts.len() > 1 {
        parts.pop();
    }
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| Page {
            number: (i + 1) as u32,
            text: part.trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_split_pages_single() {
        let pages = split_pages("just one page of text");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].text, "just one page of text");
    }

    #[test]
    fn test_split_pages_form_feeds() {
        let pages = split_pages("first\u{c}second\u{c}third\u{c}");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].number, 3);
        assert_eq!(pages[2].text, "third");
    }

    #[test]
    fn test_split_pages_keeps_empty_interior_page() {
        // An image-only page extracts as empty text but keeps its number
        let pages = split_pages("first\u{c}\u{c}third");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].text, "");
        assert_eq!(pages[2].number, 3);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&PathBuf::from("/tmp/docs/paper.pdf")), "paper.pdf");
    }
}
