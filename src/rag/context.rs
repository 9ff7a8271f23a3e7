//! Context formatting for the generation prompt.

use crate::vector_store::RetrievedBlock;

/// Render retrieved blocks as the enumerated CONTEXT section of the prompt.
///
/// Blocks are numbered [1]..[k] in the order given — post-diversification
/// order, not re-sorted by distance — so the model's `[n]` markers map
/// straight back to positions in the slice.
pub fn format_context_for_prompt(blocks: &[RetrievedBlock]) -> String {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let page = block
                .page
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "[{}] (source: {}, page: {}, id: {}, score: {:.4})\n{}",
                i + 1,
                block.source,
                page,
                block.id,
                block.score,
                block.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, page: Option<u32>, score: f32) -> RetrievedBlock {
        RetrievedBlock {
            id: id.to_string(),
            text: format!("content of {}", id),
            source: "paper.pdf".to_string(),
            page,
            score,
        }
    }

    #[test]
    fn test_blocks_are_enumerated_from_one() {
        let blocks = vec![block("aa", Some(3), 0.12), block("bb", None, 0.5)];
        let context = format_context_for_prompt(&blocks);

        assert!(context.contains("[1] (source: paper.pdf, page: 3, id: aa, score: 0.1200)"));
        assert!(context.contains("[2] (source: paper.pdf, page: -, id: bb, score: 0.5000)"));
        assert!(context.contains("content of aa"));
    }

    #[test]
    fn test_order_is_preserved_not_distance_sorted() {
        // Diversification can put a worse-scoring block first; the
        // enumeration must follow the given order.
        let blocks = vec![block("worse", Some(1), 0.9), block("better", Some(2), 0.1)];
        let context = format_context_for_prompt(&blocks);

        let pos_worse = context.find("id: worse").unwrap();
        let pos_better = context.find("id: better").unwrap();
        assert!(pos_worse < pos_better);
    }

    #[test]
    fn test_empty_blocks_render_empty() {
        assert!(format_context_for_prompt(&[]).is_empty());
    }
}
