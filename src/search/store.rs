//! Brute-force cosine-similarity index over resume fragments.
//!
//! The index is built once and never mutated afterwards:
//!
//! ```text
//! VectorStoreBuilder::add(..) ──▶ build() ──▶ VectorStore::search(query, k)
//! ```
//!
//! A builder cannot be searched, which is how "uninitialised" is ruled out
//! at compile time. Search is O(N·D); the corpus is a few hundred fragments.

use super::SearchError;

// ---------------------------------------------------------------------------
// Document / SearchResult
// ---------------------------------------------------------------------------

/// An embedded text fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub source: String,
    pub embedding: Vec<f32>,
}

/// One ranked hit returned by [`VectorStore::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub text: String,
    pub source: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

// ---------------------------------------------------------------------------
// cosine_similarity
// ---------------------------------------------------------------------------

/// Cosine similarity of two equal-length vectors.
///
/// Returns `0.0` when either vector has zero magnitude.
///
/// ```
/// use talking_resume::search::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.3, 0.4]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    // Overflowing norms give inf / inf.
    if sim.is_nan() {
        return 0.0;
    }
    sim.clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// VectorStoreBuilder
// ---------------------------------------------------------------------------

/// Collects documents before the index is frozen.
#[derive(Debug, Default)]
pub struct VectorStoreBuilder {
    documents: Vec<Document>,
    dimension: Option<usize>,
}

impl VectorStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. The first embedding fixes the index dimension.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        source: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Result<(), SearchError> {
        if embedding.is_empty() {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension.unwrap_or(1),
                actual: 0,
            });
        }
        match self.dimension {
            Some(expected) if expected != embedding.len() => {
                return Err(SearchError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(embedding.len()),
        }
        self.documents.push(Document {
            text: text.into(),
            source: source.into(),
            embedding,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Freeze the collection into a searchable store.
    pub fn build(self) -> VectorStore {
        VectorStore {
            dimension: self.dimension.unwrap_or(0),
            documents: self.documents,
        }
    }
}

// ---------------------------------------------------------------------------
// VectorStore
// ---------------------------------------------------------------------------

/// Immutable, searchable set of embedded documents.
#[derive(Debug, Clone)]
pub struct VectorStore {
    documents: Vec<Document>,
    dimension: usize,
}

impl VectorStore {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rank every document against `query` and return the best `top_k`,
    /// highest similarity first. Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>, SearchError> {
        if self.documents.is_empty() {
            return Err(SearchError::EmptyStore);
        }
        if query.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, cosine_similarity(query, &doc.embedding)))
            .collect();

        // `sort_by` is stable, so ties stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| {
                let doc = &self.documents[i];
                SearchResult {
                    text: doc.text.clone(),
                    source: doc.source.clone(),
                    score,
                }
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store(vectors: &[(&str, Vec<f32>)]) -> VectorStore {
        let mut builder = VectorStoreBuilder::new();
        for (text, v) in vectors {
            builder.add(*text, "test", v.clone()).unwrap();
        }
        builder.build()
    }

    // ---- cosine_similarity ---

    #[test]
    fn self_similarity_is_one() {
        let v = [0.3, -1.2, 4.0, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 2.0, 0.0], &[5.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn opposite_is_minus_one() {
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn overflowing_norms_score_zero() {
        let huge = [f32::MAX, f32::MAX];
        assert_eq!(cosine_similarity(&huge, &huge), 0.0);
    }

    // ---- builder ---

    #[test]
    fn builder_rejects_dimension_mismatch() {
        let mut builder = VectorStoreBuilder::new();
        builder.add("a", "s", vec![1.0, 0.0]).unwrap();
        let err = builder.add("b", "s", vec![1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn builder_rejects_empty_embedding() {
        let mut builder = VectorStoreBuilder::new();
        assert!(builder.add("a", "s", Vec::new()).is_err());
        assert!(builder.is_empty());
    }

    // ---- search ---

    #[test]
    fn search_empty_store_fails() {
        let empty = VectorStoreBuilder::new().build();
        assert!(matches!(
            empty.search(&[1.0], 3).unwrap_err(),
            SearchError::EmptyStore
        ));
    }

    #[test]
    fn search_rejects_wrong_query_dimension() {
        let s = store(&[("a", vec![1.0, 0.0])]);
        assert!(matches!(
            s.search(&[1.0, 0.0, 0.0], 1).unwrap_err(),
            SearchError::DimensionMismatch { .. }
        ));
    }

    #[test]
    fn search_ranks_by_similarity() {
        let s = store(&[
            ("east", vec![1.0, 0.0]),
            ("north", vec![0.0, 1.0]),
            ("north-east", vec![1.0, 1.0]),
        ]);
        let results = s.search(&[0.1, 1.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["north", "north-east", "east"]);
    }

    #[test]
    fn search_returns_min_of_k_and_len_sorted() {
        let s = store(&[
            ("a", vec![1.0, 0.2, 0.0]),
            ("b", vec![0.1, 1.0, 0.3]),
            ("c", vec![0.0, 0.0, 1.0]),
            ("d", vec![-1.0, 0.5, 0.5]),
        ]);
        for k in 0..6 {
            let results = s.search(&[0.4, 0.4, 0.2], k).unwrap();
            assert_eq!(results.len(), k.min(4));
            assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn ties_keep_insertion_order() {
        let s = store(&[
            ("first", vec![1.0, 0.0]),
            ("second", vec![2.0, 0.0]),
            ("third", vec![3.0, 0.0]),
        ]);
        let results = s.search(&[1.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn non_finite_embeddings_rank_last_without_panicking() {
        let s = store(&[
            ("overflow", vec![f32::MAX, f32::MAX]),
            ("nan", vec![f32::NAN, 1.0]),
            ("east", vec![1.0, 0.0]),
        ]);
        let results = s.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(results[0].text, "east");
        assert_eq!(results.len(), 3);
    }
}
