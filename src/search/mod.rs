//! Embedding-similarity search over the resume.
//!
//! # Architecture
//!
//! ```text
//! ResumeData::documents() ─┐                     ┌─ ApiEmbedder (/v1/embeddings)
//!   or embeddings.json ────┼─▶ VectorStoreBuilder │
//!                          │        │ build()     └─ PrecomputedEmbedder (table → fallback)
//!                          ▼        ▼                     │
//!                     SearchBackend { store, embedder } ◀─┘
//!                          │
//!                          └─ search(query) → top-k SearchResult
//! ```

pub mod backend;
pub mod embedder;
pub mod precomputed;
pub mod store;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use backend::SearchBackend;
pub use embedder::{ApiEmbedder, EmbedError, Embedder};
pub use precomputed::{load_entries, PrecomputedEmbedder, PrecomputedEntry};
pub use store::{cosine_similarity, Document, SearchResult, VectorStore, VectorStoreBuilder};

// ---------------------------------------------------------------------------
// SearchError
// ---------------------------------------------------------------------------

/// Errors raised while building or querying the search index.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("vector store not initialized or empty")]
    EmptyStore,

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("failed to load embeddings: {0}")]
    Load(String),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("similarity search is disabled")]
    Disabled,
}
