//! Where the app keeps its files.
//!
//! | Kind | Contents | Linux example |
//! |------|----------|---------------|
//! | config | `settings.toml` | `~/.config/talking-resume/` |
//! | data | `resume.json`, `embeddings.json` | `~/.local/share/talking-resume/` |
//! | models | `ggml-<model>.bin` | `~/.local/share/talking-resume/models/` |
//!
//! Relative resume and embedding paths from the settings file are looked up
//! in the working directory first, then in the data dir.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Per-user resume dataset and embedding tables.
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "talking-resume";

    /// Resolve against the platform dirs, falling back to `.` when the
    /// platform has none.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            models_dir: data_dir.join("models"),
            data_dir,
        }
    }

    /// Location of the GGML file for a Whisper model name such as `"base.en"`.
    pub fn whisper_model(&self, model: &str) -> PathBuf {
        self.models_dir.join(format!("ggml-{model}.bin"))
    }

    /// Absolute paths and relative paths that exist from the working
    /// directory are returned unchanged; other relative paths are placed
    /// under [`data_dir`](Self::data_dir).
    pub fn resolve_data_file(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        self.data_dir.join(path)
    }

    /// Like [`resolve_data_file`](Self::resolve_data_file), but http(s)
    /// sources are left alone.
    pub fn resolve_data_source(&self, source: &str) -> String {
        if source.starts_with("http://") || source.starts_with("https://") {
            return source.to_string();
        }
        self.resolve_data_file(Path::new(source))
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.models_dir.starts_with(&paths.data_dir));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
    }

    #[test]
    fn whisper_model_file_name() {
        let paths = AppPaths::new();
        let model = paths.whisper_model("base.en");
        assert!(model.file_name().is_some_and(|n| n == "ggml-base.en.bin"));
        assert!(model.starts_with(&paths.models_dir));
    }

    #[test]
    fn existing_files_resolve_in_place() {
        let dir = tempfile::tempdir().expect("temp dir");
        let resume = dir.path().join("resume.json");
        std::fs::write(&resume, "{}").unwrap();

        let paths = AppPaths::new();
        assert_eq!(paths.resolve_data_file(&resume), resume);
    }

    #[test]
    fn missing_relative_files_resolve_under_data_dir() {
        let paths = AppPaths::new();
        let rel = Path::new("no-such-dir/resume.json");
        assert_eq!(
            paths.resolve_data_file(rel),
            paths.data_dir.join("no-such-dir/resume.json")
        );
    }

    #[test]
    fn urls_are_not_resolved() {
        let paths = AppPaths::new();
        let url = "https://example.com/embeddings.json";
        assert_eq!(paths.resolve_data_source(url), url);
    }
}
