//! Core `SpeechSynthesizer` trait and the utterance it speaks.
//!
//! # Overview
//!
//! [`SpeechSynthesizer`] is the interface the [`SpeechPlayer`] drives. It is
//! object-safe and `Send + Sync` so it can be shared as
//! `Arc<dyn SpeechSynthesizer>` between the playback loop and the keep-alive
//! task.
//!
//! [`MockSynthesizer`] (available under `#[cfg(test)]`) replays a scripted
//! sequence of results and records every utterance it was given.
//!
//! [`SpeechPlayer`]: crate::speech::SpeechPlayer

use async_trait::async_trait;
use thiserror::Error;

use super::device::KeepAliveStrategy;
use super::voice::Voice;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// All errors that can arise while speaking an utterance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// The utterance was cut off by a cancel or by another utterance.
    #[error("speech was interrupted")]
    Interrupted,

    /// The engine is still occupied with earlier speech.
    #[error("speech engine is busy")]
    Busy,

    #[error("speech engine failed: {0}")]
    Engine(String),

    /// No synthesizer is installed on this machine.
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Utterance
// ---------------------------------------------------------------------------

/// One piece of text plus the voice settings to speak it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub lang: String,
    /// 1.0 is the engine's normal speed.
    pub rate: f32,
    /// 1.0 is the engine's normal pitch.
    pub pitch: f32,
    /// 0.0 (silent) ..= 1.0 (full).
    pub volume: f32,
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for text-to-speech engines.
///
/// # Contract
///
/// - [`speak`](Self::speak) resolves when the utterance has finished playing.
/// - [`cancel`](Self::cancel) stops the utterance in flight, whose `speak`
///   call then returns [`SynthesisError::Interrupted`].
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Voices installed on this engine. May be empty.
    async fn voices(&self) -> Vec<Voice>;

    async fn speak(&self, utterance: Utterance) -> Result<(), SynthesisError>;

    fn cancel(&self);

    fn is_speaking(&self) -> bool;

    /// Utterances queued behind the current one.
    fn is_pending(&self) -> bool {
        false
    }

    fn is_busy(&self) -> bool {
        self.is_speaking() || self.is_pending()
    }

    /// Nudge the engine so long playback is not dropped. Engines that never
    /// stall keep the default no-op.
    async fn keep_alive(&self, _strategy: KeepAliveStrategy) {}
}

// Compile-time assertion: Box<dyn SpeechSynthesizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechSynthesizer>) {}
};

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockSynthesizer;
