//! Sequential chunk playback with retry and keep-alive.
//!
//! ```text
//! speak(text, cancel)
//!   ├─ chunk_text(text, budget)
//!   ├─ select_voice(synth.voices())
//!   ├─ synth.cancel()                  reset anything left over
//!   ├─ spawn keep-alive ticker ──────── ticks only while synth.is_speaking()
//!   └─ for each chunk:
//!        speak ─ Ok ─────────────────▶ next chunk (after inter-chunk delay)
//!              ─ Err on last chunk ──▶ done
//!              ─ Interrupted ────────▶ cancel, wait 500 ms, retry
//!              ─ Busy ───────────────▶ cancel, wait 300 ms, retry
//!              ─ other ──────────────▶ wait 150 ms, skip
//! ```
//!
//! Cancelling the token passed to [`SpeechPlayer::speak`] stops the engine
//! and the keep-alive ticker, and the call returns
//! [`PlaybackOutcome::Cancelled`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SpeechConfig;

use super::chunker::{chunk_text, effective_chunk_length};
use super::device::{DeviceProfile, KeepAliveStrategy, PlaybackTiming};
use super::synth::{SpeechSynthesizer, SynthesisError, Utterance};
use super::voice::{select_voice, Voice};

/// Voice settings applied to every chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Replaces the device chunk budget.
    pub chunk_length: Option<usize>,
}

impl SpeechOptions {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            lang: config.lang.clone(),
            rate: config.rate,
            pitch: config.pitch,
            volume: config.volume,
            chunk_length: config.chunk_length,
        }
    }
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self::from_config(&SpeechConfig::default())
    }
}

/// How a [`SpeechPlayer::speak`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every chunk was attempted. `skipped` counts chunks given up on.
    Completed { spoken: usize, skipped: usize },
    Cancelled,
}

pub struct SpeechPlayer {
    synth: Arc<dyn SpeechSynthesizer>,
    profile: DeviceProfile,
    options: SpeechOptions,
    timing: PlaybackTiming,
    max_retries: u32,
}

impl SpeechPlayer {
    pub fn new(
        synth: Arc<dyn SpeechSynthesizer>,
        profile: DeviceProfile,
        options: SpeechOptions,
        max_retries: u32,
    ) -> Self {
        Self {
            synth,
            profile,
            options,
            timing: PlaybackTiming::for_profile(&profile),
            max_retries,
        }
    }

    pub fn from_config(synth: Arc<dyn SpeechSynthesizer>, config: &SpeechConfig) -> Self {
        Self::new(
            synth,
            DeviceProfile::from_setting(config.device),
            SpeechOptions::from_config(config),
            config.max_retries,
        )
    }

    pub fn with_timing(mut self, timing: PlaybackTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Speak `text` to completion or until `cancel` fires.
    pub async fn speak(&self, text: &str, cancel: CancellationToken) -> PlaybackOutcome {
        let budget =
            effective_chunk_length(self.profile.chunk_length(), self.options.chunk_length, text);
        let chunks = chunk_text(text, budget);
        if chunks.is_empty() {
            return PlaybackOutcome::Completed {
                spoken: 0,
                skipped: 0,
            };
        }
        log::debug!("speech: {} chunk(s), budget {budget}", chunks.len());

        let voices = self.synth.voices().await;
        let voice = select_voice(&voices).cloned();
        if let Some(v) = &voice {
            log::debug!("speech: using voice {:?} ({})", v.name, v.lang);
        }

        self.synth.cancel();

        let keep_alive = cancel.child_token();
        let ticker = spawn_keep_alive(Arc::clone(&self.synth), self.profile, keep_alive.clone());

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                self.synth.cancel();
                PlaybackOutcome::Cancelled
            }
            outcome = self.play_chunks(&chunks, voice.as_ref()) => outcome,
        };

        keep_alive.cancel();
        let _ = ticker.await;
        outcome
    }

    fn utterance(&self, text: &str, voice: Option<&Voice>) -> Utterance {
        Utterance {
            text: text.to_string(),
            voice: voice.cloned(),
            lang: self.options.lang.clone(),
            rate: self.options.rate,
            pitch: self.options.pitch,
            volume: self.options.volume,
        }
    }

    async fn play_chunks(&self, chunks: &[String], voice: Option<&Voice>) -> PlaybackOutcome {
        let last = chunks.len() - 1;
        let mut spoken = 0;
        let mut skipped = 0;

        for (index, chunk) in chunks.iter().enumerate() {
            let mut retries = 0;
            loop {
                let err = match self.synth.speak(self.utterance(chunk, voice)).await {
                    Ok(()) => {
                        spoken += 1;
                        break;
                    }
                    Err(e) => e,
                };

                if index == last {
                    log::debug!("speech: final chunk failed ({err}), finishing");
                    skipped += 1;
                    break;
                }

                let retry_after = match err {
                    SynthesisError::Interrupted => Some(self.timing.interrupted_retry),
                    SynthesisError::Busy => Some(self.timing.busy_retry),
                    _ if self.synth.is_busy() => Some(self.timing.busy_retry),
                    _ => None,
                };

                match retry_after {
                    Some(delay) => {
                        self.synth.cancel();
                        sleep(delay).await;
                        if retries < self.max_retries {
                            retries += 1;
                            log::debug!(
                                "speech: chunk {} {err}, retry {retries}/{}",
                                index + 1,
                                self.max_retries
                            );
                            continue;
                        }
                    }
                    None => sleep(self.timing.skip_delay).await,
                }

                log::warn!("speech: skipping chunk {} after error: {err}", index + 1);
                skipped += 1;
                break;
            }

            if index < last {
                sleep(self.timing.inter_chunk).await;
            }
        }

        PlaybackOutcome::Completed { spoken, skipped }
    }
}

/// Periodically nudge the synthesizer while it is speaking.
fn spawn_keep_alive(
    synth: Arc<dyn SpeechSynthesizer>,
    profile: DeviceProfile,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = profile.keep_alive_interval();
        let mut primary = interval_at(Instant::now() + period, period);
        primary.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stagger_period = profile.staggered_keep_alive_interval();
        let mut staggered = stagger_period.map(|p| {
            let mut tick = interval_at(Instant::now() + p, p);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tick
        });

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = primary.tick() => {
                    if synth.is_speaking() {
                        synth.keep_alive(profile.keep_alive_strategy()).await;
                    }
                }
                Some(_) = async {
                    match staggered.as_mut() {
                        Some(tick) => Some(tick.tick().await),
                        None => None,
                    }
                } => {
                    if synth.is_speaking() {
                        synth.keep_alive(KeepAliveStrategy::SilentUtterance).await;
                    }
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
