//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print indexed source info.
    pub fn source_info(source: &str, chunks: u32, max_page: Option<u32>) {
        let pages = match max_page {
            Some(p) => format!("{} pages", p),
            None => "pages unknown".to_string(),
        };
        println!(
            "  {} {} ({} chunks, {})",
            style("*").cyan(),
            style(source).bold(),
            chunks,
            pages
        );
    }

    /// Print a search result.
    pub fn search_result(source: &str, page: Option<u32>, score: f32, content: &str) {
        let page_str = match page {
            Some(p) => format!("p.{}", p),
            None => "p.?".to_string(),
        };
        println!(
            "\n{} {} {} (distance: {:.3})",
            style(">>").green(),
            style(source).bold(),
            style(&page_str).cyan(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Print a citation entry.
    pub fn citation(index: usize, source: &str, page: Option<u32>, score: Option<f32>) {
        let page_str = match page {
            Some(p) => format!("p.{}", p),
            None => "p.?".to_string(),
        };
        let score_str = score
            .map(|s| format!(" (distance: {:.3})", s))
            .unwrap_or_default();
        println!(
            "  {} {} {}{}",
            style(format!("[{}]", index)).cyan(),
            style(source).bold(),
            page_str,
            score_str
        );
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("multi\nline", 20), "multi line");
        assert_eq!(content_preview("abcdefgh", 4), "abcd...");
    }
}
