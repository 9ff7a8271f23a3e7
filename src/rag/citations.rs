//! Citation-marker alignment between the generated answer and its context.

use super::Citation;
use crate::vector_store::RetrievedBlock;
use regex::Regex;
use std::collections::HashSet;

/// Distinct `[n]` markers in the answer, in order of first appearance.
pub fn markers_used(answer_text: &str) -> Vec<usize> {
    let marker = Regex::new(r"\[(\d+)\]").expect("Invalid regex");

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for cap in marker.captures_iter(answer_text) {
        if let Ok(n) = cap[1].parse::<usize>() {
            if seen.insert(n) {
                out.push(n);
            }
        }
    }
    out
}

/// Map the markers the model used back to the enumerated context blocks.
///
/// Marker `[n]` refers to the n-th block (1-based). Markers outside the
/// valid range are silently ignored; an answer with no valid markers yields
/// no citations even when context was supplied.
pub fn align_citations(answer_text: &str, blocks: &[RetrievedBlock]) -> Vec<Citation> {
    markers_used(answer_text)
        .into_iter()
        .filter(|&n| n >= 1 && n <= blocks.len())
        .map(|n| {
            let block = &blocks[n - 1];
            Citation {
                source: block.source.clone(),
                page: block.page,
                chunk_id: block.id.clone(),
                score: Some(block.score),
            }
        })
        .collect()
}
