//! Talking resume window: egui/eframe application.
//!
//! # Architecture
//!
//! [`ResumeApp`] is the top-level [`eframe::App`]. It never mutates the
//! interaction state itself: every frame it reads a snapshot of
//! [`SharedState`] and turns mic-button edges into [`ControllerEvent`]s sent
//! over `events_tx`.
//!
//! # Layout
//!
//! | Area | Content |
//! |------|---------|
//! | Title bar | name, match-mode indicator (`word` / `vector`), settings |
//! | Result panel | "Listening" / live transcript / "Thinking" / answer |
//! | Status line | reconnect notices and recognition errors |
//! | Mic button | press and hold to speak; label follows the state |

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::pipeline::{ControllerEvent, InteractionState, SharedState};
use crate::respond::MatchMode;

/// Frame-local copy of the fields the UI draws.
struct Snapshot {
    interaction: InteractionState,
    panel_text: String,
    notice: Option<String>,
    speaking: bool,
    match_mode: MatchMode,
}

/// eframe application: the talking resume window.
pub struct ResumeApp {
    state: SharedState,
    events_tx: mpsc::Sender<ControllerEvent>,
    /// Title shown in the title bar (the resume owner's name).
    title: String,
    /// Whether the mic button was held on the previous frame.
    mic_held: bool,
    show_settings: bool,
    /// Spinner animation phase (increases each frame).
    spinner_phase: f32,
    config: AppConfig,
}

impl ResumeApp {
    pub fn new(
        state: SharedState,
        events_tx: mpsc::Sender<ControllerEvent>,
        title: impl Into<String>,
        config: AppConfig,
    ) -> Self {
        Self {
            state,
            events_tx,
            title: title.into(),
            mic_held: false,
            show_settings: false,
            spinner_phase: 0.0,
            config,
        }
    }

    fn snapshot(&self) -> Snapshot {
        let st = self.state.lock().unwrap();
        Snapshot {
            interaction: st.interaction,
            panel_text: st.panel_text.clone(),
            notice: st.notice.clone(),
            speaking: st.speaking,
            match_mode: st.match_mode,
        }
    }

    /// Send press/release on edges of the held state.
    fn update_mic(&mut self, held: bool) {
        if held == self.mic_held {
            return;
        }
        self.mic_held = held;
        let event = if held {
            ControllerEvent::MicPressed
        } else {
            ControllerEvent::MicReleased
        };
        if let Err(e) = self.events_tx.try_send(event) {
            log::warn!("ui: could not send mic event: {e}");
        }
    }

    // ── Title bar ────────────────────────────────────────────────────────

    fn draw_title_bar(&mut self, ui: &mut egui::Ui, snap: &Snapshot) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(self.title.as_str())
                    .color(egui::Color32::from_rgb(220, 220, 220))
                    .size(14.0)
                    .strong(),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(
                        egui::Button::new(
                            egui::RichText::new("=")
                                .color(egui::Color32::from_rgb(150, 150, 150))
                                .size(12.0),
                        )
                        .frame(false),
                    )
                    .clicked()
                {
                    self.show_settings = !self.show_settings;
                }

                let (mode_color, mode_hint) = match snap.match_mode {
                    MatchMode::Vector => (
                        egui::Color32::from_rgb(80, 200, 120),
                        "Answers use similarity search",
                    ),
                    MatchMode::Word => (
                        egui::Color32::from_rgb(140, 140, 140),
                        "Answers use keyword matching",
                    ),
                };
                ui.label(
                    egui::RichText::new(snap.match_mode.label())
                        .color(mode_color)
                        .size(11.0),
                )
                .on_hover_text(mode_hint);
            });
        });
    }

    // ── Result panel ─────────────────────────────────────────────────────

    fn draw_panel(&self, ui: &mut egui::Ui, snap: &Snapshot) {
        let color = match snap.interaction {
            InteractionState::Default => egui::Color32::from_rgb(230, 230, 230),
            InteractionState::Listening => egui::Color32::from_rgb(255, 140, 140),
            InteractionState::Responding => egui::Color32::from_rgb(68, 136, 255),
        };

        let text = if snap.interaction == InteractionState::Responding {
            format!("{} {}", self.spinner_char(), snap.panel_text)
        } else if snap.panel_text.is_empty() {
            "Ask me about my experience, skills or education.".to_string()
        } else {
            snap.panel_text.clone()
        };

        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - 70.0).max(40.0))
            .stick_to_bottom(true)
            .show(ui, |ui| {
                let response = ui.label(egui::RichText::new(text.as_str()).color(color).size(14.0));
                if let Some(label) = snap.interaction.panel_label() {
                    response.on_hover_text(label);
                }
            });

        if let Some(notice) = &snap.notice {
            ui.add_space(2.0);
            ui.label(
                egui::RichText::new(notice.as_str())
                    .color(egui::Color32::from_rgb(255, 136, 68))
                    .size(11.0),
            );
        }
    }

    // ── Mic button ───────────────────────────────────────────────────────

    /// Draw the mic button and return whether it is held this frame.
    fn draw_mic(&self, ui: &mut egui::Ui, snap: &Snapshot) -> bool {
        let (fill, caption) = match snap.interaction {
            InteractionState::Default if snap.speaking => {
                (egui::Color32::from_rgb(60, 90, 60), "Speaking")
            }
            InteractionState::Default => (egui::Color32::from_rgb(60, 60, 60), "Hold to speak"),
            InteractionState::Listening => (egui::Color32::from_rgb(170, 40, 40), "Listening"),
            InteractionState::Responding => (egui::Color32::from_rgb(40, 70, 140), "Thinking"),
        };

        let mut held = false;
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(egui::RichText::new(caption).size(15.0))
                .fill(fill)
                .min_size(egui::vec2(ui.available_width() * 0.6, 44.0))
                .sense(egui::Sense::click_and_drag());
            let response = ui
                .add(button)
                .on_hover_text(snap.interaction.mic_label());

            // Leaving the button while pressed counts as a release.
            let pointer_held = response.is_pointer_button_down_on() && response.contains_pointer();
            let key_held = response.has_focus()
                && ui.input(|i| i.key_down(egui::Key::Space) || i.key_down(egui::Key::Enter));
            held = pointer_held || key_held;
        });
        held
    }

    // ── Settings ─────────────────────────────────────────────────────────

    fn draw_settings(&self, ui: &mut egui::Ui) {
        let row = |ui: &mut egui::Ui, text: String| {
            ui.label(
                egui::RichText::new(text)
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(11.0),
            );
        };

        ui.add_space(4.0);
        row(ui, format!("Whisper model: {}", self.config.recognition.model));
        row(ui, format!("Language: {}", self.config.recognition.language));
        row(ui, format!("Search: {:?}", self.config.search.mode));
        row(
            ui,
            format!(
                "Speech: {} ({:?}, rate {:.1})",
                if self.config.speech.enabled { "on" } else { "off" },
                self.config.speech.engine,
                self.config.speech.rate
            ),
        );
        row(ui, format!("Resume: {}", self.config.resume.path.display()));
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn spinner_char(&self) -> char {
        let chars = ['|', '/', '-', '\\'];
        let idx = (self.spinner_phase as usize) % chars.len();
        chars[idx]
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ResumeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snap = self.snapshot();

        self.spinner_phase += 0.08;
        if self.spinner_phase >= 4.0 {
            self.spinner_phase = 0.0;
        }

        // The controller updates shared state from another thread, so poll.
        let repaint = if snap.interaction.is_busy() || self.mic_held {
            Duration::from_millis(33)
        } else {
            Duration::from_millis(100)
        };
        ctx.request_repaint_after(repaint);

        let frame = egui::Frame::new()
            .fill(egui::Color32::from_rgb(30, 30, 30))
            .inner_margin(egui::Margin::same(10));

        let mut held = self.mic_held;
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.draw_title_bar(ui, &snap);
            ui.separator();

            if self.show_settings {
                self.draw_settings(ui);
                return;
            }

            self.draw_panel(ui, &snap);
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                ui.add_space(6.0);
                held = self.draw_mic(ui, &snap);
            });
        });
        self.update_mic(held);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.mic_held {
            let _ = self.events_tx.try_send(ControllerEvent::MicReleased);
        }
        log::info!("talking resume window closing");
    }
}
