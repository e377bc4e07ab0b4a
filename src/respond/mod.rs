//! Transcript → answer resolution.
//!
//! # Resolution order
//!
//! ```text
//! transcript
//!    │
//!    ├─▶ SearchBackend attached?  ── top hit ──▶ answer (Q&A prefix stripped)
//!    │        │ error / no hit
//!    ├─▶ Q&A pair keyword overlap ─────────────▶ canned answer
//!    ├─▶ topic keyword sets ───────────────────▶ template(resume fields)
//!    └─▶ DEFAULT_RESPONSE
//! ```

pub mod intent;
pub mod responder;
pub mod templates;

pub use intent::{classify_topic, identify_intent, match_qa_pair, Intent, Topic};
pub use responder::{MatchMode, Responder};
pub use templates::DEFAULT_RESPONSE;
