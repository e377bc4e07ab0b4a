//! Speech-to-text: microphone capture and the recognizer interface.
//!
//! # Architecture
//!
//! ```text
//! cpal input stream ──▶ CaptureBuffer (mono, capped at 60 s)
//!                            │
//! controller ──start/stop──▶ Arc<dyn SpeechRecognizer>
//!                            │    └─ WhisperRecognizer (16 kHz, spawn_blocking)
//!                            ▼
//!                  Vec<RecognitionResult>  +  RecognitionEvent stream
//! ```

pub mod capture;
pub mod engine;
pub mod event;
pub mod whisper;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use capture::{AudioCapture, CaptureBuffer, CaptureError, StreamHandle};
pub use engine::{RecognitionError, SpeechRecognizer};
pub use event::{RecognitionErrorKind, RecognitionEvent, RecognitionResult};
pub use whisper::{WhisperRecognizer, WhisperTranscriber};

#[cfg(test)]
pub use engine::MockRecognizer;
