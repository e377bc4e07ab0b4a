//! Speech output: chunking, voice selection and resilient playback.
//!
//! # Architecture
//!
//! ```text
//! answer text
//!     │
//!     ▼
//! SpeechPlayer::speak ──▶ chunker::chunk_text (budget from DeviceProfile)
//!     │
//!     ├─▶ voice::select_voice
//!     ├─▶ keep-alive ticker (KeepAliveStrategy)
//!     └─▶ Arc<dyn SpeechSynthesizer>::speak, one chunk at a time
//!              └─ CommandSynthesizer (say / espeak-ng)
//! ```

pub mod chunker;
pub mod command;
pub mod device;
pub mod player;
pub mod synth;
pub mod voice;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chunker::{chunk_text, effective_chunk_length};
pub use command::{CommandEngine, CommandSynthesizer};
pub use device::{DeviceProfile, KeepAliveStrategy, PlaybackTiming};
pub use player::{PlaybackOutcome, SpeechOptions, SpeechPlayer};
pub use synth::{SpeechSynthesizer, SynthesisError, Utterance};
pub use voice::{select_voice, Voice};

#[cfg(test)]
pub use synth::MockSynthesizer;
