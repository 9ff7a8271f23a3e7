//! CLI module for Lese.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lese - PDF Question Answering with RAG
///
/// A local-first CLI tool for indexing PDF documents and asking questions
/// about their content. The name "Lese" comes from the Norwegian/Scandinavian
/// word for "read."
#[derive(Parser, Debug)]
#[command(name = "lese")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, chunk, embed, and index documents
    Ingest {
        /// PDF or plain-text files to ingest
        paths: Vec<String>,

        /// Target collection name
        #[arg(short = 'n', long)]
        collection: Option<String>,

        /// Wipe the collection first so only these documents remain
        #[arg(short, long)]
        reset: bool,

        /// Chunking strategy (sentence, token)
        #[arg(long)]
        chunker: Option<String>,

        /// Target chunk size (characters for sentence, tokens for token)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Overlap carried between consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },

    /// Ask a question and get a cited answer from your documents
    Ask {
        /// The question to ask
        question: String,

        /// Collection to retrieve from
        #[arg(short = 'n', long)]
        collection: Option<String>,

        /// Number of context blocks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum cosine distance for retrieved blocks (lower = stricter)
        #[arg(long)]
        min_relevance: Option<f32>,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,

        /// Show the text of the cited chunks below the answer
        #[arg(long)]
        sources: bool,

        /// Print the full answer object as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the index for relevant passages (no answer generation)
    Search {
        /// Search query
        query: String,

        /// Collection to search
        #[arg(short = 'n', long)]
        collection: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Maximum cosine distance for results (lower = stricter)
        #[arg(long)]
        min_relevance: Option<f32>,

        /// Return plain top-k by distance instead of page-diversified results
        #[arg(long)]
        no_diversify: bool,
    },

    /// List indexed documents
    List {
        /// Collection to list
        #[arg(short = 'n', long)]
        collection: Option<String>,
    },

    /// Delete all records in a collection
    Reset {
        /// Collection to reset
        #[arg(short = 'n', long)]
        collection: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
