//! Top-level response resolution: similarity search, then keyword rules.

use std::sync::{Arc, OnceLock};

use crate::resume::{QaPair, ResumeData, QA_SOURCE};
use crate::search::{SearchBackend, SearchError, SearchResult};

use super::intent::{identify_intent, Intent};
use super::templates;

/// Which resolution path is currently available, shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Keyword and template matching only.
    Word,
    /// A similarity search backend is attached.
    Vector,
}

impl MatchMode {
    pub fn label(self) -> &'static str {
        match self {
            MatchMode::Word => "word",
            MatchMode::Vector => "vector",
        }
    }
}

/// Maps transcript text to a spoken answer.
///
/// The search backend is attached once, after background initialisation
/// finishes; until then every query goes through keyword resolution.
pub struct Responder {
    resume: Arc<ResumeData>,
    qa_pairs: Vec<QaPair>,
    search: OnceLock<Arc<SearchBackend>>,
    min_similarity: Option<f32>,
    answer_only: bool,
}

impl Responder {
    pub fn new(resume: Arc<ResumeData>) -> Self {
        let qa_pairs = resume.qa_pairs();
        Self {
            resume,
            qa_pairs,
            search: OnceLock::new(),
            min_similarity: None,
            answer_only: false,
        }
    }

    /// Ignore search hits scoring below `threshold`.
    pub fn with_min_similarity(mut self, threshold: Option<f32>) -> Self {
        self.min_similarity = threshold;
        self
    }

    /// Reduce Q&A search hits to their answer part.
    pub fn with_answer_only(mut self, answer_only: bool) -> Self {
        self.answer_only = answer_only;
        self
    }

    /// Attach the search backend. Returns `false` if one was already set.
    pub fn attach_search(&self, backend: Arc<SearchBackend>) -> bool {
        self.search.set(backend).is_ok()
    }

    pub fn match_mode(&self) -> MatchMode {
        if self.search.get().is_some() {
            MatchMode::Vector
        } else {
            MatchMode::Word
        }
    }

    /// Resolve `text` to an answer. Never fails: every error path falls
    /// through to keyword resolution and finally to the default message.
    pub async fn respond(&self, text: &str) -> String {
        if let Some(backend) = self.search.get() {
            match self.search_answer(backend, text).await {
                Ok(Some(answer)) => return answer,
                Ok(None) => log::debug!("respond: no search hit above threshold"),
                Err(e) => log::debug!("respond: search unavailable, using keywords: {e}"),
            }
        }
        self.resolve_keywords(text)
    }

    /// Q&A pairs, then topic templates, then the default message.
    pub fn resolve_keywords(&self, text: &str) -> String {
        match identify_intent(text, &self.qa_pairs) {
            Intent::Direct { answer } => answer,
            Intent::Template(topic) => templates::render(topic, &self.resume),
        }
    }

    async fn search_answer(
        &self,
        backend: &SearchBackend,
        text: &str,
    ) -> Result<Option<String>, SearchError> {
        let results = backend.search(text).await?;
        let Some(best) = results.into_iter().next() else {
            return Ok(None);
        };
        if let Some(threshold) = self.min_similarity {
            if best.score < threshold {
                return Ok(None);
            }
        }
        log::debug!(
            "respond: best match from {:?} (score {:.3})",
            best.source,
            best.score
        );
        if self.answer_only {
            return Ok(Some(answer_text(best)));
        }
        Ok(Some(best.text))
    }
}

/// Q&A documents are stored as `"Q: … A: …"`; speak only the answer.
fn answer_text(result: SearchResult) -> String {
    if result.source == QA_SOURCE {
        if let Some((_, answer)) = result.text.split_once(" A: ") {
            return answer.trim().to_string();
        }
    }
    result.text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
