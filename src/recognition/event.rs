//! Events a recognizer emits while a session is running.

use std::fmt;

/// One hypothesis for a stretch of speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub text: String,
    /// Final results are never revised; interim ones are replaced by the
    /// next event.
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Error codes reported by a recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    Network,
    Aborted,
    AudioCapture,
    ServiceNotAllowed,
    NoSpeech,
    NotAllowed,
    Other(String),
}

impl RecognitionErrorKind {
    /// Errors worth restarting the session for while the mic is held.
    pub fn is_restartable(&self) -> bool {
        matches!(self, Self::ServiceNotAllowed | Self::AudioCapture | Self::Aborted)
    }

    /// Parse a wire-style error code such as `"audio-capture"`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "network" => Self::Network,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "no-speech" => Self::NoSpeech,
            "not-allowed" => Self::NotAllowed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Network => "network",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::NoSpeech => "no-speech",
            Self::NotAllowed => "not-allowed",
            Self::Other(code) => code,
        };
        f.write_str(code)
    }
}

/// Asynchronous notifications from a running recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// New or revised results, oldest first.
    Results(Vec<RecognitionResult>),
    Error(RecognitionErrorKind),
    /// The session stopped on its own.
    End,
}
