//! Interaction controller: the single task that owns the state machine.
//!
//! [`Controller`] consumes [`ControllerEvent`]s from the UI (and forwarded
//! recognizer events) in order. Anything slow runs in a spawned task that
//! reports back over an internal channel, tagged with an id so stale
//! reports from cancelled tasks are ignored.
//!
//! # Flow
//!
//! ```text
//! MicPressed
//!   └─▶ cancel response + speech, reset transcript, recognizer.start   [Listening]
//!
//! RecognitionEvent::Results ──▶ TranscriptBuffer::apply, panel shows transcript
//! RecognitionEvent::Error   ──▶ recovery::decide (retry / restart / flush / reset)
//! RecognitionEvent::End     ──▶ restart if held, else schedule transition
//!
//! MicReleased
//!   └─▶ recognizer.stop (flush finals)
//!         ├─ empty transcript → Default
//!         └─ spawn debounce timer (300 ms)
//!               └─ TransitionElapsed, still Listening
//!                     └─ spawn Responder::respond                       [Responding]
//!                           └─ ResponseReady → show answer               [Default]
//!                                 └─ spawn SpeechPlayer::speak
//!                                       └─ SpeechFinished
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::RecognitionConfig;
use crate::recognition::{RecognitionError, RecognitionEvent, SpeechRecognizer};
use crate::respond::Responder;
use crate::speech::{PlaybackOutcome, SpeechPlayer};

use super::recovery::{self, RecoveryAction};
use super::state::{InteractionState, SharedState};
use super::transcript::TranscriptBuffer;

/// Shown in the result panel when the response task fails.
pub const RESPONSE_FAILURE: &str = "Sorry, I couldn't generate a response.";

// ---------------------------------------------------------------------------
// Events and errors
// ---------------------------------------------------------------------------

/// Inputs to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The mic button (or Space/Enter while focused) went down.
    MicPressed,
    /// The mic button was released or the pointer left it.
    MicReleased,
    /// Forwarded from the recognition backend.
    Recognition(RecognitionEvent),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("response task failed: {0}")]
    ResponseTask(String),
}

/// Reports from spawned tasks.
#[derive(Debug)]
enum TaskReport {
    TransitionElapsed {
        id: u64,
    },
    ResponseReady {
        id: u64,
        result: Result<String, ControllerError>,
    },
    SpeechFinished {
        id: u64,
        outcome: PlaybackOutcome,
    },
}

/// A spawned task the controller may need to cancel.
#[derive(Debug)]
struct PendingTask {
    id: u64,
    cancel: CancellationToken,
}

impl PendingTask {
    fn matches(slot: &Option<PendingTask>, id: u64) -> bool {
        slot.as_ref().is_some_and(|task| task.id == id)
    }
}

fn cancel_slot(slot: &mut Option<PendingTask>) -> bool {
    match slot.take() {
        Some(task) => {
            task.cancel.cancel();
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller {
    state: SharedState,
    recognizer: Arc<dyn SpeechRecognizer>,
    responder: Arc<Responder>,
    /// `None` when spoken answers are disabled.
    player: Option<Arc<SpeechPlayer>>,

    interaction: InteractionState,
    transcript: TranscriptBuffer,
    panel_text: String,
    notice: Option<String>,
    /// The user is holding the mic button.
    holding: bool,
    network_retries: u32,
    max_network_retries: u32,
    transition_delay: Duration,

    transition: Option<PendingTask>,
    response: Option<PendingTask>,
    speech: Option<PendingTask>,
    next_id: u64,

    report_tx: mpsc::UnboundedSender<TaskReport>,
    report_rx: mpsc::UnboundedReceiver<TaskReport>,
}

impl Controller {
    pub fn new(
        state: SharedState,
        recognizer: Arc<dyn SpeechRecognizer>,
        responder: Arc<Responder>,
        player: Option<Arc<SpeechPlayer>>,
        config: &RecognitionConfig,
    ) -> Self {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        Self {
            state,
            recognizer,
            responder,
            player,
            interaction: InteractionState::Default,
            transcript: TranscriptBuffer::new(),
            panel_text: String::new(),
            notice: None,
            holding: false,
            network_retries: 0,
            max_network_retries: config.max_network_retries,
            transition_delay: Duration::from_millis(config.state_change_delay_ms),
            transition: None,
            response: None,
            speech: None,
            next_id: 0,
            report_tx,
            report_rx,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `events` closes. Spawned tasks still in flight are
    /// cancelled on exit.
    pub async fn run(mut self, mut events: mpsc::Receiver<ControllerEvent>) {
        self.publish();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                Some(report) = self.report_rx.recv() => self.handle_report(report),
            }
            self.publish();
        }

        cancel_slot(&mut self.transition);
        cancel_slot(&mut self.response);
        cancel_slot(&mut self.speech);
        self.recognizer.abort();
        log::info!("controller: event channel closed, shutting down");
    }

    async fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::MicPressed => self.on_pressed(),
            ControllerEvent::MicReleased => self.on_released().await,
            ControllerEvent::Recognition(event) => self.on_recognition(event),
        }
    }

    fn handle_report(&mut self, report: TaskReport) {
        match report {
            TaskReport::TransitionElapsed { id } => {
                if !PendingTask::matches(&self.transition, id) {
                    return;
                }
                self.transition = None;
                if self.interaction == InteractionState::Listening {
                    self.process_transcript();
                }
            }
            TaskReport::ResponseReady { id, result } => {
                if !PendingTask::matches(&self.response, id) {
                    log::debug!("controller: dropping stale response {id}");
                    return;
                }
                self.response = None;
                if self.interaction == InteractionState::Responding {
                    self.deliver(result);
                }
            }
            TaskReport::SpeechFinished { id, outcome } => {
                if PendingTask::matches(&self.speech, id) {
                    self.speech = None;
                }
                log::debug!("controller: speech {id} finished: {outcome:?}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mic button
    // -----------------------------------------------------------------------

    fn on_pressed(&mut self) {
        self.holding = true;

        if self.interaction == InteractionState::Listening {
            if cancel_slot(&mut self.transition) {
                log::debug!("controller: press cancelled pending transition");
            }
            if !self.recognizer.is_active() {
                self.start_recognition();
            }
            return;
        }

        if cancel_slot(&mut self.response) {
            log::info!("controller: press cancelled in-flight response");
        }
        if cancel_slot(&mut self.speech) {
            log::info!("controller: press cancelled speech");
        }

        self.transcript.reset();
        self.network_retries = 0;
        self.notice = None;
        self.enter(InteractionState::Listening);
        self.start_recognition();
    }

    async fn on_released(&mut self) {
        if !self.holding {
            return;
        }
        self.holding = false;
        if self.interaction != InteractionState::Listening {
            return;
        }

        match self.recognizer.stop().await {
            Ok(results) if !results.is_empty() => {
                self.transcript.apply(&results);
                self.show_transcript();
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("controller: recognizer stop failed: {e}");
                self.notice = Some(ControllerError::from(e).to_string());
            }
        }

        if self.transcript.is_empty() {
            cancel_slot(&mut self.transition);
            self.reset_to_default();
        } else {
            self.schedule_transition();
        }
    }

    // -----------------------------------------------------------------------
    // Recognition events
    // -----------------------------------------------------------------------

    fn on_recognition(&mut self, event: RecognitionEvent) {
        if self.interaction != InteractionState::Listening {
            log::debug!("controller: ignoring {event:?} outside Listening");
            return;
        }

        match event {
            RecognitionEvent::Results(results) => {
                self.transcript.apply(&results);
                self.show_transcript();
            }
            RecognitionEvent::Error(kind) => {
                log::warn!("controller: recognition error: {kind}");
                let decision = recovery::decide(
                    &kind,
                    self.network_retries,
                    self.max_network_retries,
                    self.holding,
                    self.transcript.is_empty(),
                );
                self.network_retries = decision.retries;
                self.notice = Some(decision.notice);
                match decision.action {
                    RecoveryAction::Retry | RecoveryAction::Restart => {
                        self.recognizer.abort();
                        if self.holding {
                            self.start_recognition();
                        } else {
                            self.on_session_end();
                        }
                    }
                    RecoveryAction::Flush => {
                        self.recognizer.abort();
                        cancel_slot(&mut self.transition);
                        self.process_transcript();
                    }
                    RecoveryAction::Reset => {
                        self.recognizer.abort();
                        cancel_slot(&mut self.transition);
                        self.reset_to_default();
                    }
                }
            }
            RecognitionEvent::End => {
                if self.holding {
                    log::debug!("controller: recognition ended while held, restarting");
                    self.start_recognition();
                } else {
                    self.on_session_end();
                }
            }
        }
    }

    /// Backup for a missed release: answer what we have.
    fn on_session_end(&mut self) {
        if self.transition.is_none() && !self.transcript.is_empty() {
            self.schedule_transition();
        }
    }

    fn start_recognition(&mut self) {
        match self.recognizer.start() {
            Ok(()) | Err(RecognitionError::AlreadyStarted) => {}
            Err(e) => {
                log::warn!("controller: could not start recognition: {e}");
                self.notice = Some(e.to_string());
                cancel_slot(&mut self.transition);
                if self.transcript.is_empty() {
                    self.reset_to_default();
                } else {
                    self.process_transcript();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn schedule_transition(&mut self) {
        if self.transition.is_some() {
            return;
        }
        let id = self.next_id();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let delay = self.transition_delay;
        let tx = self.report_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(TaskReport::TransitionElapsed { id });
                }
            }
        });
        self.transition = Some(PendingTask { id, cancel });
    }

    /// Hand the transcript to the responder and enter `Responding`.
    fn process_transcript(&mut self) {
        let text = self.transcript.full().trim().to_string();
        if text.is_empty() {
            self.reset_to_default();
            return;
        }
        if self.recognizer.is_active() {
            self.recognizer.abort();
        }

        log::info!("controller: responding to {text:?}");
        self.enter(InteractionState::Responding);

        let id = self.next_id();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let responder = Arc::clone(&self.responder);
        let tx = self.report_tx.clone();

        tokio::spawn(async move {
            let mut task = tokio::spawn(async move { responder.respond(&text).await });
            tokio::select! {
                _ = token.cancelled() => task.abort(),
                joined = &mut task => {
                    let result = joined.map_err(|e| ControllerError::ResponseTask(e.to_string()));
                    let _ = tx.send(TaskReport::ResponseReady { id, result });
                }
            }
        });
        self.response = Some(PendingTask { id, cancel });
    }

    /// Show the answer, return to `Default` and start speaking it.
    fn deliver(&mut self, result: Result<String, ControllerError>) {
        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("controller: {e}");
                self.panel_text = RESPONSE_FAILURE.to_string();
                self.interaction = InteractionState::Default;
                return;
            }
        };

        self.panel_text = answer.clone();
        self.interaction = InteractionState::Default;

        let Some(player) = self.player.clone() else {
            return;
        };
        cancel_slot(&mut self.speech);
        let id = self.next_id();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.report_tx.clone();

        tokio::spawn(async move {
            let outcome = player.speak(&answer, token).await;
            let _ = tx.send(TaskReport::SpeechFinished { id, outcome });
        });
        self.speech = Some(PendingTask { id, cancel });
    }

    fn enter(&mut self, next: InteractionState) {
        log::debug!(
            "controller: {} → {}",
            self.interaction.label(),
            next.label()
        );
        self.interaction = next;
        if let Some(text) = next.placeholder() {
            self.panel_text = text.to_string();
        }
    }

    fn reset_to_default(&mut self) {
        self.recognizer.abort();
        self.transcript.reset();
        self.interaction = InteractionState::Default;
        if self.panel_text.trim() == "Listening" {
            self.panel_text.clear();
        }
    }

    fn show_transcript(&mut self) {
        if !self.transcript.is_empty() {
            self.panel_text = self.transcript.full();
        }
    }

    /// Copy the controller's view into the shared state for the UI.
    fn publish(&self) {
        let mut st = self.state.lock().unwrap();
        st.interaction = self.interaction;
        st.panel_text.clone_from(&self.panel_text);
        st.notice.clone_from(&self.notice);
        st.recording = self.recognizer.is_active();
        st.speaking = self.speech.is_some();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::pipeline::new_shared_state;
    use crate::recognition::{MockRecognizer, RecognitionErrorKind, RecognitionResult};
    use crate::resume::{ResumeData, ResumeDocument, Skills};
    use crate::search::{EmbedError, Embedder, SearchBackend};
    use async_trait::async_trait;
    use crate::speech::{
        DeviceProfile, MockSynthesizer, PlaybackTiming, SpeechOptions, SpeechPlayer,
    };

    const STEP: Duration = Duration::from_millis(40);

    struct Harness {
        state: SharedState,
        recognizer: Arc<MockRecognizer>,
        synth: Arc<MockSynthesizer>,
        tx: mpsc::Sender<ControllerEvent>,
    }

    /// Stored documents (prefixed `doc:`) embed at once; queries take
    /// `query_delay`.
    struct SlowEmbedder {
        query_delay: Duration,
    }

    #[async_trait]
    impl Embedder for SlowEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            if !text.starts_with("doc:") {
                tokio::time::sleep(self.query_delay).await;
            }
            Ok(vec![1.0, 0.0])
        }
    }

    async fn slow_backend(query_delay: Duration) -> Arc<SearchBackend> {
        let docs = vec![ResumeDocument {
            text: "doc: Ada Lovelace wrote the first program.".into(),
            source: "Summary".into(),
        }];
        let embedder = Arc::new(SlowEmbedder { query_delay });
        Arc::new(SearchBackend::from_documents(embedder, &docs, 3).await.unwrap())
    }

    impl Harness {
        fn start(recognizer: MockRecognizer, synth: MockSynthesizer) -> Self {
            Self::start_with_search(recognizer, synth, None)
        }

        fn start_with_search(
            recognizer: MockRecognizer,
            synth: MockSynthesizer,
            search: Option<Arc<SearchBackend>>,
        ) -> Self {
            let mut config = AppConfig::default();
            config.recognition.state_change_delay_ms = 5;
            config.recognition.max_network_retries = 2;

            let state = new_shared_state(config.clone());
            let recognizer = Arc::new(recognizer);
            let synth = Arc::new(synth);

            let resume = ResumeData {
                name: "Ada Lovelace".into(),
                title: "Analytical Engineer".into(),
                skills: Skills::List(vec!["Rust".into(), "Mathematics".into()]),
                ..ResumeData::default()
            };
            let responder = Arc::new(Responder::new(Arc::new(resume)));
            if let Some(backend) = search {
                responder.attach_search(backend);
            }
            let player = SpeechPlayer::new(
                synth.clone(),
                DeviceProfile::DESKTOP,
                SpeechOptions::default(),
                1,
            )
            .with_timing(PlaybackTiming::immediate());

            let controller = Controller::new(
                state.clone(),
                recognizer.clone(),
                responder,
                Some(Arc::new(player)),
                &config.recognition,
            );
            let (tx, rx) = mpsc::channel(16);
            tokio::spawn(controller.run(rx));

            Self {
                state,
                recognizer,
                synth,
                tx,
            }
        }

        async fn send(&self, event: ControllerEvent) {
            self.tx.send(event).await.unwrap();
            tokio::time::sleep(STEP).await;
        }

        fn interaction(&self) -> InteractionState {
            self.state.lock().unwrap().interaction
        }

        fn panel(&self) -> String {
            self.state.lock().unwrap().panel_text.clone()
        }

        fn notice(&self) -> Option<String> {
            self.state.lock().unwrap().notice.clone()
        }
    }

    #[tokio::test]
    async fn press_enters_listening() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;

        assert_eq!(h.interaction(), InteractionState::Listening);
        assert_eq!(h.panel(), "Listening");
        assert!(h.recognizer.is_active());
        assert!(h.state.lock().unwrap().recording);
    }

    #[tokio::test]
    async fn release_with_empty_transcript_returns_to_default() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::MicReleased).await;

        assert_eq!(h.interaction(), InteractionState::Default);
        assert_eq!(h.panel(), "");
        assert!(h.synth.spoken_texts().is_empty());
    }

    #[tokio::test]
    async fn skills_question_is_answered_and_spoken() {
        let h = Harness::start(
            MockRecognizer::new().with_finals(&["What are your skills?"]),
            MockSynthesizer::new(),
        );
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::MicReleased).await;
        tokio::time::sleep(STEP).await;

        assert_eq!(h.interaction(), InteractionState::Default);
        let panel = h.panel();
        assert!(panel.starts_with("My key skills include"), "got {panel:?}");
        assert!(panel.contains("Rust"));

        let spoken = h.synth.spoken_texts().join(" ");
        assert!(spoken.contains("Mathematics"), "spoken: {spoken:?}");
    }

    #[tokio::test]
    async fn interim_results_are_shown_and_used() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::Recognition(RecognitionEvent::Results(vec![
            RecognitionResult::final_("what is"),
            RecognitionResult::interim("your name"),
        ])))
        .await;
        assert_eq!(h.panel(), "what is your name");

        h.send(ControllerEvent::MicReleased).await;
        tokio::time::sleep(STEP).await;
        assert_eq!(h.panel(), "My name is Ada Lovelace.");
    }

    #[tokio::test]
    async fn press_during_debounce_keeps_listening() {
        let h = Harness::start(
            MockRecognizer::new().with_finals(&["tell me about"]),
            MockSynthesizer::new(),
        );
        h.send(ControllerEvent::MicPressed).await;
        // Release and press again before the debounce timer can fire.
        h.tx.send(ControllerEvent::MicReleased).await.unwrap();
        h.send(ControllerEvent::MicPressed).await;

        assert_eq!(h.interaction(), InteractionState::Listening);
        assert!(h.recognizer.is_active());
        assert_eq!(h.panel(), "tell me about ");
        assert_eq!(h.recognizer.starts(), 2);
    }

    #[tokio::test]
    async fn press_while_speaking_cancels_speech() {
        let h = Harness::start(
            MockRecognizer::new().with_finals(&["What is your name?"]),
            MockSynthesizer::new().with_play_time(Duration::from_secs(5)),
        );
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::MicReleased).await;
        tokio::time::sleep(STEP).await;
        assert!(h.state.lock().unwrap().speaking);

        h.send(ControllerEvent::MicPressed).await;
        assert_eq!(h.interaction(), InteractionState::Listening);
        assert!(!h.state.lock().unwrap().speaking);
        assert!(h.synth.cancel_count() >= 1);
    }

    #[tokio::test]
    async fn press_while_responding_cancels_response() {
        let h = Harness::start_with_search(
            MockRecognizer::new().with_finals(&["Who are you?"]),
            MockSynthesizer::new(),
            Some(slow_backend(Duration::from_millis(300)).await),
        );
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::MicReleased).await;
        assert_eq!(h.interaction(), InteractionState::Responding);
        assert_eq!(h.panel(), "Thinking");

        h.send(ControllerEvent::MicPressed).await;
        assert_eq!(h.interaction(), InteractionState::Listening);
        assert_eq!(h.panel(), "Listening");

        // Past the point where the search would have answered.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(h.interaction(), InteractionState::Listening);
        assert_eq!(h.panel(), "Listening");
        assert!(h.synth.spoken_texts().is_empty());
        assert!(h.recognizer.is_active());
    }

    #[tokio::test]
    async fn end_after_release_answers_once() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::Recognition(RecognitionEvent::Results(vec![
            RecognitionResult::final_("what is your name"),
        ])))
        .await;
        h.tx.send(ControllerEvent::MicReleased).await.unwrap();
        h.send(ControllerEvent::Recognition(RecognitionEvent::End))
            .await;
        tokio::time::sleep(STEP).await;

        assert_eq!(h.interaction(), InteractionState::Default);
        assert_eq!(h.panel(), "My name is Ada Lovelace.");
        assert_eq!(h.synth.spoken_texts(), vec!["My name is Ada Lovelace."]);
    }

    #[tokio::test]
    async fn end_while_held_restarts_recognition() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;
        h.recognizer.abort();
        h.send(ControllerEvent::Recognition(RecognitionEvent::End))
            .await;

        assert_eq!(h.recognizer.starts(), 2);
        assert!(h.recognizer.is_active());
        assert_eq!(h.interaction(), InteractionState::Listening);
    }

    #[tokio::test]
    async fn network_errors_retry_then_flush() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::Recognition(RecognitionEvent::Results(vec![
            RecognitionResult::final_("what is your name"),
        ])))
        .await;

        let network =
            || ControllerEvent::Recognition(RecognitionEvent::Error(RecognitionErrorKind::Network));
        h.send(network()).await;
        assert_eq!(h.notice().as_deref(), Some("Reconnecting... (1/2)"));
        h.send(network()).await;
        assert_eq!(h.notice().as_deref(), Some("Reconnecting... (2/2)"));
        assert_eq!(h.interaction(), InteractionState::Listening);

        h.send(network()).await;
        tokio::time::sleep(STEP).await;
        assert!(h.notice().unwrap().starts_with("Network connection issue"));
        assert_eq!(h.panel(), "My name is Ada Lovelace.");
        assert_eq!(h.interaction(), InteractionState::Default);
    }

    #[tokio::test]
    async fn unrecoverable_error_with_empty_transcript_resets() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::MicPressed).await;
        h.send(ControllerEvent::Recognition(RecognitionEvent::Error(
            RecognitionErrorKind::NotAllowed,
        )))
        .await;

        assert_eq!(h.interaction(), InteractionState::Default);
        assert_eq!(h.notice().as_deref(), Some("Error: not-allowed. Please try again."));
        assert!(!h.recognizer.is_active());
    }

    #[tokio::test]
    async fn start_failure_returns_to_default() {
        let h = Harness::start(
            MockRecognizer::new()
                .failing_start(RecognitionError::Unavailable("no microphone".into())),
            MockSynthesizer::new(),
        );
        h.send(ControllerEvent::MicPressed).await;

        assert_eq!(h.interaction(), InteractionState::Default);
        assert!(h.notice().unwrap().contains("no microphone"));
    }

    #[tokio::test]
    async fn recognition_events_ignored_when_idle() {
        let h = Harness::start(MockRecognizer::new(), MockSynthesizer::new());
        h.send(ControllerEvent::Recognition(RecognitionEvent::Results(vec![
            RecognitionResult::final_("stray"),
        ])))
        .await;

        assert_eq!(h.interaction(), InteractionState::Default);
        assert_eq!(h.panel(), "");
    }
}
