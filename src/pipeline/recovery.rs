//! What to do when a recognition session reports an error while listening.

use crate::recognition::RecognitionErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Restart recognition immediately (network retry budget not spent).
    Retry,
    /// Restart recognition because the user is still holding the button.
    Restart,
    /// Give up on the session and answer the partial transcript.
    Flush,
    /// Give up on the session and return to `Default`.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryDecision {
    pub action: RecoveryAction,
    /// Status line for the UI.
    pub notice: String,
    /// Network retry counter after this decision.
    pub retries: u32,
}

const NETWORK_NOTICE: &str =
    "Network connection issue. Please check your internet connection and try again.";

/// Decide how to recover from `kind`.
///
/// `retries` is the number of network retries already spent in this
/// session. Any non-network error resets the counter.
pub fn decide(
    kind: &RecognitionErrorKind,
    retries: u32,
    max_retries: u32,
    recording: bool,
    transcript_empty: bool,
) -> RecoveryDecision {
    let give_up = if transcript_empty {
        RecoveryAction::Reset
    } else {
        RecoveryAction::Flush
    };

    if *kind == RecognitionErrorKind::Network {
        if retries < max_retries {
            let retries = retries + 1;
            return RecoveryDecision {
                action: RecoveryAction::Retry,
                notice: format!("Reconnecting... ({retries}/{max_retries})"),
                retries,
            };
        }
        return RecoveryDecision {
            action: give_up,
            notice: NETWORK_NOTICE.to_string(),
            retries: 0,
        };
    }

    if recording && kind.is_restartable() {
        return RecoveryDecision {
            action: RecoveryAction::Restart,
            notice: format!("Error: {kind}. Attempting to restart..."),
            retries: 0,
        };
    }

    RecoveryDecision {
        action: give_up,
        notice: format!("Error: {kind}. Please try again."),
        retries: 0,
    }
}
