//! PDF page extraction via pdftotext.
//!
//! Uses the poppler `pdftotext` tool rather than parsing PDF internals here;
//! pages arrive separated by form feeds on stdout.

use super::{split_pages, DocumentSource, Page};
use crate::error::{LeseError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// PDF extraction source backed by `pdftotext`.
pub struct PdfSource;

impl PdfSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for PdfSource {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        info!("Extracting text from {}", path.display());

        let result = Command::new("pdftotext")
            .arg("-enc").arg("UTF-8")
            .arg("-q")
            .arg(path)
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LeseError::ToolNotFound("pdftotext".into()));
            }
            Err(e) => {
                return Err(LeseError::Extraction(format!(
                    "pdftotext execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LeseError::ToolFailed(format!("pdftotext: {stderr}")));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let pages = split_pages(&raw);
        debug!("Extracted {} pages", pages.len());
        Ok(pages)
    }
}
