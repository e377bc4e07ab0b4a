//! Interaction pipeline: state machine, transcript and recovery policy.
//!
//! This module wires speech recognition → response resolution → speech
//! output and exposes the shared state the UI reads every frame.
//!
//! # Architecture
//!
//! ```text
//! egui mic button ─┐
//!                  ├─ ControllerEvent (mpsc) ─▶ Controller::run   ← async tokio task
//! recognizer ──────┘                                │
//!                                                   ├─ TranscriptBuffer
//!                                                   ├─ recovery::decide
//!                                                   ├─ Responder::respond   (spawned)
//!                                                   └─ SpeechPlayer::speak  (spawned)
//!
//! SharedState (Arc<Mutex<AppState>>) ◀── published after every event, read by egui
//! ```

pub mod controller;
pub mod recovery;
pub mod state;
pub mod transcript;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{Controller, ControllerError, ControllerEvent, RESPONSE_FAILURE};
pub use recovery::{decide, RecoveryAction, RecoveryDecision};
pub use state::{new_shared_state, AppState, InteractionState, SharedState};
pub use transcript::TranscriptBuffer;
