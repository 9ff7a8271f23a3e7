//! RAG answer generation.

use super::{align_citations, context::format_context_for_prompt, Answer};
use crate::config::{Prompts, RagSettings};
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::vector_store::{QueryOptions, VectorIndex};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Retrieval breadth for summary-like questions.
const SUMMARY_MIN_K: usize = 10;
/// Relevance floor for summary-like questions (distance filter widened,
/// not tightened, to trade precision for coverage).
const SUMMARY_MIN_RELEVANCE: f32 = 1.2;

/// Guidance shown when retrieval comes back empty; no model call is made.
const NO_CONTEXT_ANSWER: &str = "I couldn't retrieve any relevant context from your \
indexed documents. Please confirm the documents were ingested, the collection name \
is correct, and try increasing top-k or raising the min relevance (max distance) \
threshold.";

/// Per-question overrides for [`RagEngine::ask`].
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Number of context blocks to retrieve; settings default when None.
    pub top_k: Option<usize>,
    /// Maximum cosine distance for retrieved blocks; settings default when None.
    pub min_relevance: Option<f32>,
}

/// RAG engine for question answering.
pub struct RagEngine {
    index: VectorIndex,
    llm: Arc<dyn LanguageModel>,
    prompts: Prompts,
    settings: RagSettings,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(index: VectorIndex, llm: Arc<dyn LanguageModel>, settings: RagSettings) -> Self {
        Self {
            index,
            llm,
            prompts: Prompts::default(),
            settings,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// The index this engine retrieves from.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Ask a question and get a cited Markdown answer.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str, opts: &AskOptions) -> Result<Answer> {
        info!("Processing question: {}", question);

        // Smart retrieval knobs: summary questions pull more context and
        // loosen the distance filter for breadth.
        let summary_mode = is_summary_like(question);
        let mut k = opts.top_k.unwrap_or(self.settings.top_k);
        let mut min_relevance = opts.min_relevance.or(self.settings.min_relevance);
        if summary_mode {
            debug!("Summary-like question, widening retrieval");
            k = k.max(SUMMARY_MIN_K);
            min_relevance = Some(min_relevance.unwrap_or(1.0).max(SUMMARY_MIN_RELEVANCE));
        }

        let query_opts = QueryOptions {
            k,
            min_relevance,
            diversify: self.settings.diversify,
            per_page_cap: self.settings.per_page_cap,
        };
        let blocks = self.index.query(question, &query_opts).await?;

        if blocks.is_empty() {
            return Ok(Answer {
                answer: NO_CONTEXT_ANSWER.to_string(),
                citations: Vec::new(),
                confidence: Some(0.0),
            });
        }

        // Build prompt and generate
        let context = format_context_for_prompt(&blocks);
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context);
        vars.insert("question".to_string(), question.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.rag.template, &vars);

        let raw = self
            .llm
            .generate(&prompt, self.settings.max_tokens, self.settings.temperature)
            .await?;

        // Citations stay hidden unless the model explicitly cited blocks
        let citations = align_citations(&raw, &blocks);
        debug!("{} blocks retrieved, {} cited", blocks.len(), citations.len());

        Ok(Answer {
            answer: raw,
            citations,
            confidence: None,
        })
    }
}

/// Heuristic classifier for questions that ask about the document broadly.
pub fn is_summary_like(question: &str) -> bool {
    const SUMMARY_PATTERNS: [&str; 6] = [
        r"\bsummar(y|ise|ize)\b",
        r"\boverview\b",
        r"\bwhat('s| is) this (pdf|document) about\b",
        r"\btl;dr\b",
        r"\bhigh-level\b",
        r"\babstract\b",
    ];

    let q = question.to_lowercase();
    SUMMARY_PATTERNS
        .iter()
        .any(|p| Regex::new(p).expect("Invalid regex").is_match(&q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::vector_store::{ChunkRecord, IndexRecord, MemoryVectorStore, VectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Embedder returning a fixed vector for queries; never used for documents.
    struct StubEmbedder {
        query_vec: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.query_vec.clone()).collect())
        }

        async fn embed_query(&self, _text: &str) -> crate::Result<Vec<f32>> {
            Ok(self.query_vec.clone())
        }

        fn dimensions(&self) -> usize {
            self.query_vec.len()
        }
    }

    /// Language model that records calls and replays a canned answer.
    struct MockLlm {
        reply: String,
        called: AtomicBool,
        last_prompt: Mutex<String>,
    }

    impl MockLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                called: AtomicBool::new(false),
                last_prompt: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl crate::llm::LanguageModel for MockLlm {
        async fn generate(
            &self,
            prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> crate::Result<String> {
            self.called.store(true, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            Ok(self.reply.clone())
        }
    }

    fn record(text: &str, page: Option<u32>, embedding: Vec<f32>) -> IndexRecord {
        IndexRecord::new(
            ChunkRecord::new(text.to_string(), "doc.pdf".to_string(), page),
            embedding,
        )
    }

    async fn engine_with(
        records: Vec<IndexRecord>,
        query_vec: Vec<f32>,
        llm: Arc<MockLlm>,
        settings: RagSettings,
    ) -> RagEngine {
        let store = Arc::new(MemoryVectorStore::new());
        if !records.is_empty() {
            store.add("test", &records).await.unwrap();
        }
        let embedder = Arc::new(StubEmbedder { query_vec });
        let index = VectorIndex::new(store, embedder, "test");
        RagEngine::new(index, llm, settings)
    }

    #[test]
    fn test_is_summary_like() {
        assert!(is_summary_like("Give me a summary of chapter 2"));
        assert!(is_summary_like("Summarize the key findings"));
        assert!(is_summary_like("What is this document about?"));
        assert!(is_summary_like("TL;DR please"));
        assert!(is_summary_like("A high-level overview"));
        assert!(is_summary_like("Where is the abstract?"));

        assert!(!is_summary_like("What is the boiling point of water?"));
        assert!(!is_summary_like("Who wrote section 3?"));
    }

    #[tokio::test]
    async fn test_empty_retrieval_short_circuits_without_llm_call() {
        let llm = Arc::new(MockLlm::new("should never be seen"));
        // One record at distance ~0.29 from the query, filtered by
        // min_relevance = 0.0
        let records = vec![record("far away", Some(1), vec![1.0, 0.5])];
        let engine = engine_with(
            records,
            vec![1.0, 0.0],
            llm.clone(),
            RagSettings::default(),
        )
        .await;

        let opts = AskOptions {
            top_k: None,
            min_relevance: Some(0.0),
        };
        let answer = engine.ask("what does it say?", &opts).await.unwrap();

        assert!(answer.answer.contains("couldn't retrieve any relevant context"));
        assert!(answer.citations.is_empty());
        assert_eq!(answer.confidence, Some(0.0));
        assert!(!llm.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_citations_follow_marker_order() {
        let llm = Arc::new(MockLlm::new("Both agree [1], as does [3]; again [1]."));
        let records = vec![
            record("alpha", Some(1), vec![1.0, 0.0]),
            record("beta", Some(2), vec![0.9, 0.1]),
            record("gamma", Some(3), vec![0.8, 0.2]),
        ];
        let engine = engine_with(
            records,
            vec![1.0, 0.0],
            llm.clone(),
            RagSettings::default(),
        )
        .await;

        let answer = engine.ask("who agrees?", &AskOptions::default()).await.unwrap();

        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].page, Some(1));
        assert_eq!(answer.citations[1].page, Some(3));
        assert!(answer.confidence.is_none());
        assert!(llm.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_uncited_answer_has_no_citations() {
        let llm = Arc::new(MockLlm::new("The document discusses fish migration."));
        let records = vec![record("salmon", Some(1), vec![1.0, 0.0])];
        let engine = engine_with(
            records,
            vec![1.0, 0.0],
            llm,
            RagSettings::default(),
        )
        .await;

        let answer = engine.ask("what fish?", &AskOptions::default()).await.unwrap();
        assert!(answer.citations.is_empty());
        assert!(!answer.answer.is_empty());
    }

    #[tokio::test]
    async fn test_empty_model_output_is_not_an_error() {
        let llm = Arc::new(MockLlm::new(""));
        let records = vec![record("alpha", Some(1), vec![1.0, 0.0])];
        let engine = engine_with(
            records,
            vec![1.0, 0.0],
            llm,
            RagSettings::default(),
        )
        .await;

        let answer = engine.ask("anything?", &AskOptions::default()).await.unwrap();
        assert_eq!(answer.answer, "");
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_summary_question_widens_retrieval() {
        let llm = Arc::new(MockLlm::new("Overview [1]."));
        // 12 records spread over pages, all within distance 1.2
        let records: Vec<IndexRecord> = (0..12)
            .map(|i| {
                record(
                    &format!("chunk {}", i),
                    Some((i % 6 + 1) as u32),
                    vec![1.0, i as f32 * 0.05],
                )
            })
            .collect();
        let engine = engine_with(
            records,
            vec![1.0, 0.0],
            llm.clone(),
            RagSettings::default(),
        )
        .await;

        let answer = engine
            .ask("Give me a summary of this.", &AskOptions::default())
            .await
            .unwrap();
        assert!(!answer.answer.is_empty());

        // Default top_k is 5; summary mode raises it to 10
        let prompt = llm.last_prompt.lock().unwrap().clone();
        let blocks_in_prompt = prompt.matches("(source:").count();
        assert_eq!(blocks_in_prompt, 10);
    }

    #[tokio::test]
    async fn test_prompt_contains_context_and_question() {
        let llm = Arc::new(MockLlm::new("ok"));
        let records = vec![record("the answer is 42", Some(7), vec![1.0, 0.0])];
        let engine = engine_with(
            records,
            vec![1.0, 0.0],
            llm.clone(),
            RagSettings::default(),
        )
        .await;

        engine
            .ask("what is the answer?", &AskOptions::default())
            .await
            .unwrap();

        let prompt = llm.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("the answer is 42"));
        assert!(prompt.contains("what is the answer?"));
        assert!(prompt.contains("CONTEXT"));
    }
}
