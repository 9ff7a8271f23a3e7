//! Lese - PDF Question Answering with RAG
//!
//! A local-first CLI tool for indexing PDF documents and asking questions
//! about their content.
//!
//! The name "Lese" comes from the Norwegian/Scandinavian word for "read."
//!
//! # Overview
//!
//! Lese allows you to:
//! - Ingest PDF (and plain-text) documents into a local vector index
//! - Ask questions and get AI-powered Markdown answers with citations
//! - Search the index semantically for relevant passages
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `document` - Document page extraction (PDF, plain text)
//! - `chunking` - Page-text chunking strategies
//! - `embedding` - Embedding generation
//! - `llm` - Language model abstraction
//! - `vector_store` - Vector index and storage backends
//! - `rag` - Retrieval, prompting, and citation alignment
//! - `orchestrator` - Ingestion pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use lese::config::Settings;
//! use lese::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Index a PDF, then ask about it
//!     let count = orchestrator
//!         .ingest(&["paper.pdf".into()], "pdf_rag", true)
//!         .await?;
//!     println!("Indexed {} chunks", count);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod vector_store;

pub use error::{LeseError, Result};
