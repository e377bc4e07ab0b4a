//! Ready-to-query similarity search: an embedder paired with a frozen store.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{SearchConfig, SearchMode};
use crate::resume::{ResumeData, ResumeDocument};

use super::embedder::{ApiEmbedder, Embedder};
use super::precomputed::{load_entries, PrecomputedEmbedder};
use super::store::{SearchResult, VectorStore, VectorStoreBuilder};
use super::SearchError;

/// An initialised search backend. Construction is the only way to get one,
/// so holding a `SearchBackend` means the index is ready.
pub struct SearchBackend {
    embedder: Arc<dyn Embedder>,
    store: VectorStore,
    top_k: usize,
}

impl SearchBackend {
    pub fn new(embedder: Arc<dyn Embedder>, store: VectorStore, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Build the backend described by `config`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Disabled`] when `config.mode` is `Disabled`.
    /// - [`SearchError::Load`] when the pre-computed table cannot be read.
    /// - [`SearchError::EmptyStore`] when no document could be embedded.
    pub async fn initialize(config: &SearchConfig, resume: &ResumeData) -> Result<Self, SearchError> {
        let live: Option<Arc<dyn Embedder>> = if config.embedder.enabled {
            Some(Arc::new(ApiEmbedder::from_config(&config.embedder)))
        } else {
            None
        };

        match config.mode {
            SearchMode::Disabled => Err(SearchError::Disabled),
            SearchMode::Precomputed => {
                let timeout = Duration::from_secs(config.embedder.timeout_secs.max(1) * 3);
                let entries = load_entries(&config.precomputed_source, timeout).await?;

                let mut builder = VectorStoreBuilder::new();
                for entry in &entries {
                    if let Err(e) =
                        builder.add(entry.text.clone(), entry.source.clone(), entry.embedding.clone())
                    {
                        log::warn!("search: skipping table row {:?}: {e}", entry.text);
                    }
                }
                if builder.is_empty() {
                    return Err(SearchError::EmptyStore);
                }

                let embedder = Arc::new(PrecomputedEmbedder::new(&entries, live));
                log::info!(
                    "search: loaded {} pre-computed documents from {}",
                    builder.len(),
                    config.precomputed_source
                );
                Ok(Self::new(embedder, builder.build(), config.top_k))
            }
            SearchMode::Live => {
                let embedder = live.ok_or(SearchError::Disabled)?;
                Self::from_documents(embedder, &resume.documents(), config.top_k).await
            }
        }
    }

    /// Embed every document through `embedder`. Documents that fail to embed
    /// are skipped.
    pub async fn from_documents(
        embedder: Arc<dyn Embedder>,
        documents: &[ResumeDocument],
        top_k: usize,
    ) -> Result<Self, SearchError> {
        let mut builder = VectorStoreBuilder::new();
        let mut first_error = None;

        for doc in documents {
            let added = match embedder.embed(&doc.text).await {
                Ok(vector) => builder.add(doc.text.clone(), doc.source.clone(), vector),
                Err(e) => Err(SearchError::Embed(e)),
            };
            if let Err(e) = added {
                log::debug!("search: document {:?} skipped: {e}", doc.source);
                first_error.get_or_insert(e);
            }
        }

        if builder.is_empty() {
            return Err(first_error.unwrap_or(SearchError::EmptyStore));
        }

        log::info!(
            "search: embedded {}/{} documents",
            builder.len(),
            documents.len()
        );
        Ok(Self::new(embedder, builder.build(), top_k))
    }

    /// [`initialize`](Self::initialize), retried up to `config.init_attempts`
    /// times with `config.init_retry_delay_ms` between attempts.
    pub async fn initialize_with_retry(
        config: &SearchConfig,
        resume: &ResumeData,
    ) -> Result<Self, SearchError> {
        let attempts = config.init_attempts.max(1);
        let mut attempt = 1;
        loop {
            match Self::initialize(config, resume).await {
                Ok(backend) => return Ok(backend),
                Err(SearchError::Disabled) => return Err(SearchError::Disabled),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    log::warn!("search: initialisation attempt {attempt}/{attempts} failed: {e}");
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(config.init_retry_delay_ms)).await;
                }
            }
        }
    }

    /// Embed `query` and return the nearest documents.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let vector = self.embedder.embed(query).await?;
        self.store.search(&vector, self.top_k)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
