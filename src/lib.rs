//! Talking resume: ask questions out loud, hear answers from a resume.
//!
//! Speech is captured and transcribed locally ([`recognition`]), matched
//! against the resume by similarity search or keyword rules ([`respond`],
//! [`search`]), shown in an egui window ([`app`]) and read back through the
//! system speech engine ([`speech`]). [`pipeline`] owns the interaction
//! state machine that ties these together.

pub mod app;
pub mod config;
pub mod pipeline;
pub mod recognition;
pub mod respond;
pub mod resume;
pub mod search;
pub mod speech;
