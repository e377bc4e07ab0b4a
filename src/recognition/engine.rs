//! Core `SpeechRecognizer` trait.
//!
//! # Overview
//!
//! [`SpeechRecognizer`] is the interface the controller drives. It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn SpeechRecognizer>`.
//!
//! A session is opened with [`start`](SpeechRecognizer::start). While it runs,
//! the backend may push [`RecognitionEvent`]s (interim results, errors, end)
//! over the channel it was constructed with. [`stop`](SpeechRecognizer::stop)
//! closes the session and returns whatever final results were still pending.
//!
//! [`MockRecognizer`] (available under `#[cfg(test)]`) records calls and
//! returns scripted results.
//!
//! [`RecognitionEvent`]: super::RecognitionEvent

use async_trait::async_trait;
use thiserror::Error;

use super::event::RecognitionResult;

// ---------------------------------------------------------------------------
// RecognitionError
// ---------------------------------------------------------------------------

/// All errors that can arise from the recognition subsystem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecognitionError {
    /// `start` was called while a session is already open.
    #[error("recognition already started")]
    AlreadyStarted,

    /// No recognition backend is usable (no model, no microphone).
    #[error("speech recognition unavailable: {0}")]
    Unavailable(String),

    /// The GGML model file was not found at the given path.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a `WhisperContext` or `WhisperState`.
    #[error("whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// An error occurred during the inference pass.
    #[error("transcription error: {0}")]
    Transcription(String),
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech recognizers.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Open a session.
    ///
    /// Returns [`RecognitionError::AlreadyStarted`] if one is already open.
    fn start(&self) -> Result<(), RecognitionError>;

    /// Close the session and flush pending final results.
    ///
    /// Stopping an idle recognizer returns `Ok(vec![])`.
    async fn stop(&self) -> Result<Vec<RecognitionResult>, RecognitionError>;

    /// Close the session and discard anything pending.
    fn abort(&self);

    fn is_active(&self) -> bool;
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockRecognizer;

#[cfg(test)]
mod mock {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// A test double that returns scripted results from `stop`.
    pub struct MockRecognizer {
        active: AtomicBool,
        start_error: Mutex<Option<RecognitionError>>,
        stop_results: Mutex<VecDeque<Vec<RecognitionResult>>>,
        starts: AtomicUsize,
        stops: AtomicUsize,
        aborts: AtomicUsize,
    }

    impl MockRecognizer {
        /// Every `stop` returns no results.
        pub fn new() -> Self {
            Self {
                active: AtomicBool::new(false),
                start_error: Mutex::new(None),
                stop_results: Mutex::new(VecDeque::new()),
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                aborts: AtomicUsize::new(0),
            }
        }

        /// Successive `stop` calls return these final transcripts.
        pub fn with_finals(self, transcripts: &[&str]) -> Self {
            *self.stop_results.lock().unwrap() = transcripts
                .iter()
                .map(|t| vec![RecognitionResult::final_(*t)])
                .collect();
            self
        }

        /// Every `start` fails with `error`.
        pub fn failing_start(self, error: RecognitionError) -> Self {
            *self.start_error.lock().unwrap() = Some(error);
            self
        }

        pub fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }

        pub fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }

        pub fn aborts(&self) -> usize {
            self.aborts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpeechRecognizer for MockRecognizer {
        fn start(&self) -> Result<(), RecognitionError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = self.start_error.lock().unwrap().clone() {
                return Err(e);
            }
            if self.active.swap(true, Ordering::SeqCst) {
                return Err(RecognitionError::AlreadyStarted);
            }
            Ok(())
        }

        async fn stop(&self) -> Result<Vec<RecognitionResult>, RecognitionError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if !self.active.swap(false, Ordering::SeqCst) {
                return Ok(Vec::new());
            }
            Ok(self
                .stop_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }

        fn abort(&self) {
            self.aborts.fetch_add(1, Ordering::SeqCst);
            self.active.store(false, Ordering::SeqCst);
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_session_lifecycle() {
        let rec = MockRecognizer::new().with_finals(&["hello there"]);
        rec.start().unwrap();
        assert!(rec.is_active());
        assert_eq!(rec.start(), Err(RecognitionError::AlreadyStarted));

        let results = rec.stop().await.unwrap();
        assert_eq!(results, vec![RecognitionResult::final_("hello there")]);
        assert!(!rec.is_active());
    }

    #[tokio::test]
    async fn stop_when_idle_returns_nothing() {
        let rec = MockRecognizer::new().with_finals(&["unused"]);
        assert!(rec.stop().await.unwrap().is_empty());
    }

    #[test]
    fn box_dyn_recognizer_compiles() {
        let rec: Box<dyn SpeechRecognizer> = Box::new(MockRecognizer::new());
        rec.abort();
        assert!(!rec.is_active());
    }
}
