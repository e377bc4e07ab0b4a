//! Application entry point: talking resume.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Load the resume dataset (placeholder on failure) and build the
//!    [`Responder`].
//! 5. Spawn search initialisation; attach the backend when it is ready.
//! 6. Start microphone capture and load the Whisper model.
//! 7. Build the speech player (when enabled).
//! 8. Spawn the controller and the recognition-event forwarder.
//! 9. Run [`eframe::run_native`], which blocks the main thread until the
//!    window is closed.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use talking_resume::{
    app::ResumeApp,
    config::{AppConfig, AppPaths},
    pipeline::{new_shared_state, Controller, ControllerEvent, SharedState},
    recognition::{
        AudioCapture, CaptureBuffer, RecognitionEvent, StreamHandle, WhisperRecognizer,
        WhisperTranscriber,
    },
    respond::Responder,
    resume::ResumeData,
    search::{SearchBackend, SearchError},
    speech::{CommandSynthesizer, SpeechPlayer},
};

// ---------------------------------------------------------------------------
// Search initialisation
// ---------------------------------------------------------------------------

/// Build the search backend in the background. Until it is attached every
/// question goes through keyword matching.
async fn init_search(
    config: AppConfig,
    resume: Arc<ResumeData>,
    responder: Arc<Responder>,
    state: SharedState,
) {
    match SearchBackend::initialize_with_retry(&config.search, &resume).await {
        Ok(backend) => {
            let documents = backend.len();
            if responder.attach_search(Arc::new(backend)) {
                state.lock().unwrap().match_mode = responder.match_mode();
                log::info!("search: ready with {documents} documents");
            }
        }
        Err(SearchError::Disabled) => log::info!("search: disabled, using keyword matching"),
        Err(e) => log::warn!("search: unavailable ({e}); using keyword matching"),
    }
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Talking Resume")
        .with_inner_size([width, height])
        .with_min_inner_size([280.0, 220.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("talking resume starting up");

    // 2. Configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();
    config.resume.path = paths.resolve_data_file(&config.resume.path);
    config.search.precomputed_source = paths.resolve_data_source(&config.search.precomputed_source);

    // 3. Tokio runtime (2 worker threads)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Resume data and responder
    let resume = Arc::new(ResumeData::load(&config.resume.path).unwrap_or_else(|e| {
        log::error!("Failed to load resume data: {e}");
        ResumeData::placeholder()
    }));
    let responder = Arc::new(
        Responder::new(Arc::clone(&resume))
            .with_min_similarity(config.search.min_similarity)
            .with_answer_only(config.search.answer_only),
    );
    let shared_state = new_shared_state(config.clone());

    // 5. Search backend, in the background
    rt.spawn(init_search(
        config.clone(),
        Arc::clone(&resume),
        Arc::clone(&responder),
        Arc::clone(&shared_state),
    ));

    // 6. Microphone capture + Whisper
    let (recognition_tx, mut recognition_rx) = mpsc::unbounded_channel::<RecognitionEvent>();
    let capture_buf = CaptureBuffer::new();

    let _stream_handle: Option<StreamHandle> = match AudioCapture::new() {
        Ok(capture) => match capture.start(capture_buf.clone(), recognition_tx) {
            Ok(handle) => {
                log::info!(
                    "Audio capture started ({} Hz, {} ch)",
                    capture.sample_rate(),
                    capture.channels()
                );
                Some(handle)
            }
            Err(e) => {
                log::warn!("Failed to start audio stream: {e}");
                None
            }
        },
        Err(e) => {
            log::warn!("Audio capture unavailable: {e}");
            None
        }
    };

    let model_path = paths.whisper_model(&config.recognition.model);
    let transcriber = match WhisperTranscriber::load(&model_path, &config.recognition.language) {
        Ok(t) => {
            log::info!("Whisper model loaded: {}", model_path.display());
            Some(Arc::new(t))
        }
        Err(e) => {
            log::warn!("Could not load Whisper model: {e}. Speech input is disabled.");
            None
        }
    };
    let recognizer = Arc::new(WhisperRecognizer::new(
        transcriber,
        capture_buf,
        config.recognition.min_recording_secs,
    ));

    // 7. Speech output
    let player = config.speech.enabled.then(|| {
        let synth = Arc::new(CommandSynthesizer::from_setting(config.speech.engine));
        log::info!("Speech output via {:?}", synth.engine());
        Arc::new(SpeechPlayer::from_config(synth, &config.speech))
    });

    // 8. Controller
    let (events_tx, events_rx) = mpsc::channel::<ControllerEvent>(32);
    let controller = Controller::new(
        Arc::clone(&shared_state),
        recognizer,
        responder,
        player,
        &config.recognition,
    );
    rt.spawn(controller.run(events_rx));

    let forward_tx = events_tx.clone();
    rt.spawn(async move {
        while let Some(event) = recognition_rx.recv().await {
            if forward_tx
                .send(ControllerEvent::Recognition(event))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // 9. Build the egui app and run it (blocks until the window is closed)
    let title = if resume.name.is_empty() {
        "Talking Resume".to_string()
    } else {
        resume.name.clone()
    };
    let app = ResumeApp::new(shared_state, events_tx, title, config.clone());
    let options = native_options(&config);

    eframe::run_native(
        "Talking Resume",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
