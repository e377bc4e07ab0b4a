//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SearchMode
// ---------------------------------------------------------------------------

/// Selects where document embeddings come from.
///
/// | Variant     | Documents                         | Query embeddings               |
/// |-------------|-----------------------------------|--------------------------------|
/// | Disabled    | none (keyword resolution only)    | none                           |
/// | Precomputed | JSON table (file or URL)          | table lookup, then endpoint    |
/// | Live        | resume chunks embedded at startup | embeddings endpoint            |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SearchMode {
    Disabled,
    Precomputed,
    Live,
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Precomputed
    }
}

// ---------------------------------------------------------------------------
// EmbedderConfig
// ---------------------------------------------------------------------------

/// Connection settings for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    /// Whether the endpoint may be called at all.
    pub enabled: bool,
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key. `None` for local providers.
    pub api_key: Option<String>,
    /// Embedding model identifier (e.g. `"all-minilm"`, `"text-embedding-3-small"`).
    pub model: String,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "all-minilm".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Settings for the embedding-similarity answer path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub mode: SearchMode,
    /// Path or http(s) URL of the pre-computed `{text, embedding, source}` table.
    pub precomputed_source: String,
    /// Number of nearest documents fetched per query.
    pub top_k: usize,
    /// Minimum cosine similarity the best match must reach to be used.
    /// `None` always uses the best match.
    pub min_similarity: Option<f32>,
    /// Speak only the answer part of a matched `"Q: … A: …"` document.
    /// Off by default: the matched text is returned as stored.
    pub answer_only: bool,
    /// How many times backend initialisation is attempted before giving up.
    pub init_attempts: u32,
    /// Delay between initialisation attempts, in milliseconds.
    pub init_retry_delay_ms: u64,
    pub embedder: EmbedderConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            precomputed_source: "data/embeddings.json".into(),
            top_k: 3,
            min_similarity: None,
            answer_only: false,
            init_attempts: 3,
            init_retry_delay_ms: 2_000,
            embedder: EmbedderConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// Settings for speech recognition and the listening state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Whisper GGML model name (file `ggml-<model>.bin` in the models dir).
    pub model: String,
    /// Speech language as an ISO-639-1 code, or `"auto"`.
    pub language: String,
    /// Network errors retried before the partial transcript is flushed.
    pub max_network_retries: u32,
    /// Debounce between mic release and processing the transcript, in ms.
    pub state_change_delay_ms: u64,
    /// Recordings shorter than this are treated as silence.
    pub min_recording_secs: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model: "base.en".into(),
            language: "en".into(),
            max_network_retries: 3,
            state_change_delay_ms: 300,
            min_recording_secs: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Device class used to tune chunk length and keep-alive cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeviceSetting {
    /// Detect from the build target.
    Auto,
    Ios,
    Mobile,
    Chrome,
    Desktop,
}

impl Default for DeviceSetting {
    fn default() -> Self {
        Self::Auto
    }
}

/// Command-line synthesizer used for speech output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpeechEngine {
    /// `say` on macOS, `espeak-ng` elsewhere.
    Auto,
    Say,
    EspeakNg,
}

impl Default for SpeechEngine {
    fn default() -> Self {
        Self::Auto
    }
}

/// Settings for reading answers aloud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub engine: SpeechEngine,
    pub device: DeviceSetting,
    /// Overrides the device chunk length (still floored at 500 characters).
    pub chunk_length: Option<usize>,
    /// BCP-47 language tag attached to every utterance.
    pub lang: String,
    /// Speaking rate, 1.0 = engine default.
    pub rate: f32,
    /// Voice pitch, 1.0 = engine default.
    pub pitch: f32,
    /// Output volume in `0.0..=1.0`.
    pub volume: f32,
    /// Playback attempts per chunk before it is skipped.
    pub max_retries: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: SpeechEngine::default(),
            device: DeviceSetting::default(),
            chunk_length: None,
            lang: "en-US".into(),
            rate: 1.2,
            pitch: 0.9,
            volume: 1.0,
            max_retries: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// ResumeConfig
// ---------------------------------------------------------------------------

/// Location of the resume dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeConfig {
    pub path: PathBuf,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/resume.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Last saved window position `(x, y)` in screen pixels.
    pub window_position: Option<(f32, f32)>,
    /// Initial window size `(width, height)`.
    pub window_size: (f32, f32),
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_position: None,
            window_size: (440.0, 380.0),
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use talking_resume::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub recognition: RecognitionConfig,
    pub speech: SpeechConfig,
    pub search: SearchConfig,
    pub resume: ResumeConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.recognition.model, loaded.recognition.model);
        assert_eq!(
            original.recognition.max_network_retries,
            loaded.recognition.max_network_retries
        );
        assert_eq!(
            original.recognition.state_change_delay_ms,
            loaded.recognition.state_change_delay_ms
        );

        assert_eq!(original.speech.device, loaded.speech.device);
        assert_eq!(original.speech.rate, loaded.speech.rate);
        assert_eq!(original.speech.pitch, loaded.speech.pitch);
        assert_eq!(original.speech.chunk_length, loaded.speech.chunk_length);

        assert_eq!(original.search.mode, loaded.search.mode);
        assert_eq!(original.search.top_k, loaded.search.top_k);
        assert_eq!(original.search.min_similarity, loaded.search.min_similarity);
        assert_eq!(original.search.embedder.base_url, loaded.search.embedder.base_url);

        assert_eq!(original.resume.path, loaded.resume.path);
        assert_eq!(original.ui.window_size, loaded.ui.window_size);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.search.mode, default.search.mode);
        assert_eq!(config.recognition.language, default.recognition.language);
        assert_eq!(config.speech.lang, default.speech.lang);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.recognition.max_network_retries, 3);
        assert_eq!(cfg.recognition.state_change_delay_ms, 300);
        assert_eq!(cfg.recognition.language, "en");
        assert_eq!(cfg.speech.lang, "en-US");
        assert!((cfg.speech.rate - 1.2).abs() < f32::EPSILON);
        assert!((cfg.speech.pitch - 0.9).abs() < f32::EPSILON);
        assert_eq!(cfg.speech.max_retries, 3);
        assert_eq!(cfg.search.mode, SearchMode::Precomputed);
        assert_eq!(cfg.search.top_k, 3);
        assert!(cfg.search.min_similarity.is_none());
        assert!(!cfg.search.answer_only);
        assert_eq!(cfg.search.embedder.model, "all-minilm");
        assert!(cfg.search.embedder.api_key.is_none());
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.search.mode = SearchMode::Live;
        cfg.search.min_similarity = Some(0.35);
        cfg.search.embedder.base_url = "https://api.openai.com".into();
        cfg.search.embedder.api_key = Some("sk-test".into());
        cfg.speech.device = DeviceSetting::Chrome;
        cfg.speech.chunk_length = Some(800);
        cfg.speech.engine = SpeechEngine::EspeakNg;
        cfg.resume.path = PathBuf::from("/srv/resume.json");
        cfg.ui.window_position = Some((100.0, 200.0));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.search.mode, SearchMode::Live);
        assert_eq!(loaded.search.min_similarity, Some(0.35));
        assert_eq!(loaded.search.embedder.base_url, "https://api.openai.com");
        assert_eq!(loaded.search.embedder.api_key, Some("sk-test".into()));
        assert_eq!(loaded.speech.device, DeviceSetting::Chrome);
        assert_eq!(loaded.speech.chunk_length, Some(800));
        assert_eq!(loaded.speech.engine, SpeechEngine::EspeakNg);
        assert_eq!(loaded.resume.path, PathBuf::from("/srv/resume.json"));
        assert_eq!(loaded.ui.window_position, Some((100.0, 200.0)));
    }
}
