//! Interaction states and the shared application state the UI reads.
//!
//! [`InteractionState`] is owned by the controller task; the UI only sees
//! the copy kept in [`AppState`] behind [`SharedState`].

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::respond::MatchMode;

// ---------------------------------------------------------------------------
// InteractionState
// ---------------------------------------------------------------------------

/// States of the press-to-talk interaction.
///
/// ```text
/// Default ──press──▶ Listening
/// Listening ──release (+300 ms), transcript──▶ Responding
/// Listening ──release, no transcript──▶ Default
/// Responding ──answer shown / error──▶ Default   (speech keeps playing)
/// Responding ──press──▶ Listening             (response and speech cancelled)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Default,
    Listening,
    Responding,
}

impl InteractionState {
    pub fn label(&self) -> &'static str {
        match self {
            InteractionState::Default => "Default",
            InteractionState::Listening => "Listening",
            InteractionState::Responding => "Responding",
        }
    }

    /// Returns `true` while the mic is open or an answer is in flight.
    pub fn is_busy(&self) -> bool {
        !matches!(self, InteractionState::Default)
    }

    /// Accessible label for the microphone button.
    pub fn mic_label(&self) -> &'static str {
        match self {
            InteractionState::Default => "Press to speak",
            InteractionState::Listening => "Recording. Press to stop.",
            InteractionState::Responding => "Press to cancel and speak again",
        }
    }

    /// Accessible label for the result panel, if the state overrides it.
    pub fn panel_label(&self) -> Option<&'static str> {
        match self {
            InteractionState::Default => None,
            InteractionState::Listening => Some("Listening for speech input"),
            InteractionState::Responding => Some("Processing your request, please wait"),
        }
    }

    /// Text shown in the result panel on entering the state.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            InteractionState::Default => None,
            InteractionState::Listening => Some("Listening"),
            InteractionState::Responding => Some("Thinking"),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the UI renders. Mutated only by the controller task (and the
/// search initialiser for `match_mode`).
pub struct AppState {
    pub interaction: InteractionState,

    /// Text in the result panel: placeholder, live transcript or answer.
    pub panel_text: String,

    /// Transient status line (reconnecting, error hints).
    pub notice: Option<String>,

    /// A recognition session is open.
    pub recording: bool,

    /// An answer is being spoken.
    pub speaking: bool,

    pub match_mode: MatchMode,

    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            interaction: InteractionState::Default,
            panel_text: String::new(),
            notice: None,
            recording: false,
            speaking: false,
            match_mode: MatchMode::Word,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Lock with `.lock().unwrap()` for a short critical section; do **not**
/// hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

pub fn new_shared_state(config: AppConfig) -> SharedState {
    Arc::new(Mutex::new(AppState::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
