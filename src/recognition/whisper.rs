//! Local Whisper recognizer: record while the mic is held, transcribe on
//! release.
//!
//! Whisper is not a streaming recognizer, so a session produces no interim
//! results. [`stop`](SpeechRecognizer::stop) drains the capture buffer,
//! runs inference on `spawn_blocking` and returns one final result per
//! Whisper segment.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::capture::{CaptureBuffer, TARGET_RATE};
use super::engine::{RecognitionError, SpeechRecognizer};
use super::event::RecognitionResult;

/// Maximum audio handed to Whisper: 60 s × 16 000 Hz.
const MAX_AUDIO_SAMPLES: usize = 960_000;

/// CPU threads for inference, capped at 8.
fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// WhisperTranscriber
// ---------------------------------------------------------------------------

/// A loaded GGML model. A fresh `WhisperState` is created per call so one
/// transcriber can be shared across threads.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    language: String,
    n_threads: i32,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("language", &self.language)
            .field("n_threads", &self.n_threads)
            .finish_non_exhaustive()
    }
}

// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs; the model
// weights are read-only after loading.
unsafe impl Send for WhisperTranscriber {}
unsafe impl Sync for WhisperTranscriber {}

impl WhisperTranscriber {
    /// Load a GGML model from `model_path`.
    ///
    /// # Errors
    ///
    /// - [`RecognitionError::ModelNotFound`] when `model_path` does not exist.
    /// - [`RecognitionError::ContextInit`] when whisper-rs rejects the file.
    pub fn load(model_path: impl AsRef<Path>, language: &str) -> Result<Self, RecognitionError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(RecognitionError::ModelNotFound(path.display().to_string()));
        }
        let path_str = path.to_str().ok_or_else(|| {
            RecognitionError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| RecognitionError::ContextInit(e.to_string()))?;

        Ok(Self {
            ctx,
            language: language.to_string(),
            n_threads: optimal_threads(),
        })
    }

    /// Transcribe 16 kHz mono audio into trimmed, non-empty segment texts.
    pub fn transcribe(&self, audio: &[f32]) -> Result<Vec<String>, RecognitionError> {
        let audio = &audio[..audio.len().min(MAX_AUDIO_SAMPLES)];

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        let lang = (self.language != "auto").then_some(self.language.as_str());
        params.set_language(lang);
        params.set_n_threads(self.n_threads);
        params.set_print_progress(false);
        params.set_print_realtime(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| RecognitionError::ContextInit(e.to_string()))?;
        state
            .full(params, audio)
            .map_err(|e| RecognitionError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| RecognitionError::Transcription(e.to_string()))?;

        let mut segments = Vec::with_capacity(n_segments.max(0) as usize);
        for i in 0..n_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| RecognitionError::Transcription(format!("segment {i}: {e}")))?;
            let text = text.trim();
            if !text.is_empty() {
                segments.push(text.to_string());
            }
        }
        Ok(segments)
    }
}

// ---------------------------------------------------------------------------
// WhisperRecognizer
// ---------------------------------------------------------------------------

pub struct WhisperRecognizer {
    transcriber: Option<Arc<WhisperTranscriber>>,
    capture: CaptureBuffer,
    active: AtomicBool,
    min_samples: usize,
}

impl WhisperRecognizer {
    /// `transcriber` is `None` when the model could not be loaded; every
    /// `start` then fails with [`RecognitionError::Unavailable`].
    pub fn new(
        transcriber: Option<Arc<WhisperTranscriber>>,
        capture: CaptureBuffer,
        min_recording_secs: f32,
    ) -> Self {
        Self {
            transcriber,
            capture,
            active: AtomicBool::new(false),
            min_samples: (min_recording_secs.max(0.0) * TARGET_RATE as f32) as usize,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    fn start(&self) -> Result<(), RecognitionError> {
        if self.transcriber.is_none() {
            return Err(RecognitionError::Unavailable("no Whisper model loaded".into()));
        }
        if !self.capture.device_ready() {
            return Err(RecognitionError::Unavailable("no microphone".into()));
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(RecognitionError::AlreadyStarted);
        }
        self.capture.begin();
        log::debug!("recognition: session started");
        Ok(())
    }

    async fn stop(&self) -> Result<Vec<RecognitionResult>, RecognitionError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let audio = self.capture.finish();
        log::debug!(
            "recognition: session stopped, {:.2}s of audio",
            audio.len() as f32 / TARGET_RATE as f32
        );
        if audio.len() < self.min_samples {
            return Ok(Vec::new());
        }

        let Some(transcriber) = self.transcriber.clone() else {
            return Ok(Vec::new());
        };
        let segments = tokio::task::spawn_blocking(move || transcriber.transcribe(&audio))
            .await
            .map_err(|e| RecognitionError::Transcription(format!("inference task failed: {e}")))??;

        Ok(segments.into_iter().map(RecognitionResult::final_).collect())
    }

    fn abort(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.capture.discard();
            log::debug!("recognition: session aborted");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let result = WhisperTranscriber::load("/nonexistent/ggml-base.en.bin", "en");
        assert!(
            matches!(result, Err(RecognitionError::ModelNotFound(_))),
            "expected ModelNotFound, got: {result:?}"
        );
    }

    #[test]
    fn start_without_model_is_unavailable() {
        let rec = WhisperRecognizer::new(None, CaptureBuffer::new(), 0.5);
        assert!(matches!(rec.start(), Err(RecognitionError::Unavailable(_))));
        assert!(!rec.is_active());
    }

    #[tokio::test]
    async fn stop_when_idle_is_empty() {
        let rec = WhisperRecognizer::new(None, CaptureBuffer::new(), 0.5);
        assert!(rec.stop().await.unwrap().is_empty());
        rec.abort();
        assert!(!rec.is_active());
    }

    #[test]
    fn optimal_threads_in_range() {
        let n = optimal_threads();
        assert!((1..=8).contains(&n), "optimal_threads returned {n}");
    }
}
