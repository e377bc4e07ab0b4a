//! Pre-computed embedding tables.
//!
//! The table is a JSON array of `{ "text", "embedding", "source" }` objects
//! generated offline with the same model the live endpoint serves, read from
//! disk or fetched over HTTP at startup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::embedder::{EmbedError, Embedder};
use super::SearchError;

/// One row of a pre-computed table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrecomputedEntry {
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub source: String,
}

/// Load a table from a filesystem path or an `http(s)://` URL.
pub async fn load_entries(
    source: &str,
    timeout: Duration,
) -> Result<Vec<PrecomputedEntry>, SearchError> {
    let body = if source.starts_with("http://") || source.starts_with("https://") {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        client
            .get(source)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SearchError::Load(format!("{source}: {e}")))?
            .text()
            .await
            .map_err(|e| SearchError::Load(format!("{source}: {e}")))?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| SearchError::Load(format!("{source}: {e}")))?
    };

    parse_entries(&body)
}

pub fn parse_entries(json: &str) -> Result<Vec<PrecomputedEntry>, SearchError> {
    serde_json::from_str(json).map_err(|e| SearchError::Load(format!("invalid table: {e}")))
}

/// Lookup key: trimmed, lowercased, single-spaced.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// PrecomputedEmbedder
// ---------------------------------------------------------------------------

/// Serves vectors for texts already present in the table and delegates
/// everything else to an optional live embedder.
pub struct PrecomputedEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Option<Arc<dyn Embedder>>,
}

impl PrecomputedEmbedder {
    pub fn new(entries: &[PrecomputedEntry], fallback: Option<Arc<dyn Embedder>>) -> Self {
        let table = entries
            .iter()
            .map(|e| (normalize(&e.text), e.embedding.clone()))
            .collect();
        Self { table, fallback }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl Embedder for PrecomputedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if let Some(vector) = self.table.get(&normalize(text)) {
            return Ok(vector.clone());
        }
        match &self.fallback {
            Some(live) => live.embed(text).await,
            None => Err(EmbedError::Unavailable(text.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
