//! `SpeechSynthesizer` backed by a command-line TTS program.
//!
//! | Engine    | Platform | Invocation                                        |
//! |-----------|----------|---------------------------------------------------|
//! | say       | macOS    | `say -r <wpm> [-v <voice>] -f -`                  |
//! | espeak-ng | others   | `espeak-ng -s <wpm> -p <pitch> -a <amp> [-v <lang>] --stdin` |
//!
//! Every utterance runs as a child process; cancelling kills it. The text goes
//! to the child's stdin and never into argv.

use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::SpeechEngine;

use super::synth::{SpeechSynthesizer, SynthesisError, Utterance};
use super::voice::Voice;

/// Words per minute at rate 1.0 for both engines.
const BASE_WPM: f32 = 175.0;

/// Concrete program behind a [`CommandSynthesizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEngine {
    Say,
    EspeakNg,
}

impl CommandEngine {
    pub fn from_setting(setting: SpeechEngine) -> Self {
        match setting {
            SpeechEngine::Say => Self::Say,
            SpeechEngine::EspeakNg => Self::EspeakNg,
            SpeechEngine::Auto if cfg!(target_os = "macos") => Self::Say,
            SpeechEngine::Auto => Self::EspeakNg,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Say => "say",
            Self::EspeakNg => "espeak-ng",
        }
    }

    /// Arguments that speak `utterance` read from stdin.
    pub fn speak_args(self, utterance: &Utterance) -> Vec<String> {
        let wpm = (BASE_WPM * utterance.rate).round().max(1.0) as u32;
        let mut args = Vec::new();
        match self {
            Self::Say => {
                args.extend(["-r".to_string(), wpm.to_string()]);
                if let Some(voice) = &utterance.voice {
                    args.extend(["-v".to_string(), voice.name.clone()]);
                }
                args.extend(["-f".to_string(), "-".to_string()]);
            }
            Self::EspeakNg => {
                let pitch = (utterance.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
                let amplitude = (utterance.volume * 100.0).round().clamp(0.0, 200.0) as u32;
                args.extend([
                    "-s".to_string(),
                    wpm.to_string(),
                    "-p".to_string(),
                    pitch.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                ]);
                if let Some(voice) = &utterance.voice {
                    args.extend(["-v".to_string(), voice.lang.clone()]);
                }
                args.push("--stdin".to_string());
            }
        }
        args
    }

    fn voice_list_args(self) -> &'static [&'static str] {
        match self {
            Self::Say => &["-v", "?"],
            Self::EspeakNg => &["--voices"],
        }
    }

    pub fn parse_voices(self, output: &str) -> Vec<Voice> {
        match self {
            Self::Say => parse_say_voices(output),
            Self::EspeakNg => parse_espeak_voices(output),
        }
    }
}

/// `Daniel              en_GB    # Hello! My name is Daniel.`
fn parse_say_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let spec = line.split('#').next()?.trim();
            let (name, lang) = spec.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            (!name.is_empty()).then(|| Voice::new(name, lang))
        })
        .collect()
}

/// ` 5  en-us           --/M      English_(America)  gmw/en-US`
fn parse_espeak_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_pty, lang, gender, name, ..] => {
                    let name = name.replace('_', " ");
                    // Carry the gender so the male-voice rule can see it.
                    let name = if gender.ends_with("/M") {
                        format!("{name} (male)")
                    } else {
                        name
                    };
                    Some(Voice::new(name, *lang))
                }
                _ => None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CommandSynthesizer
// ---------------------------------------------------------------------------

pub struct CommandSynthesizer {
    engine: CommandEngine,
    speaking: AtomicBool,
    /// Cancelled and replaced by [`cancel`](SpeechSynthesizer::cancel).
    current: Mutex<CancellationToken>,
}

impl CommandSynthesizer {
    pub fn new(engine: CommandEngine) -> Self {
        Self {
            engine,
            speaking: AtomicBool::new(false),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn from_setting(setting: SpeechEngine) -> Self {
        Self::new(CommandEngine::from_setting(setting))
    }

    pub fn engine(&self) -> CommandEngine {
        self.engine
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn voices(&self) -> Vec<Voice> {
        let output = Command::new(self.engine.program())
            .args(self.engine.voice_list_args())
            .stderr(Stdio::null())
            .output()
            .await;
        match output {
            Ok(out) if out.status.success() => {
                self.engine.parse_voices(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                log::warn!("speech: {} voice listing exited with {}", self.engine.program(), out.status);
                Vec::new()
            }
            Err(e) => {
                log::warn!("speech: cannot list voices: {e}");
                Vec::new()
            }
        }
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SynthesisError> {
        let token = self.current.lock().unwrap().clone();
        let program = self.engine.program();

        let mut child = Command::new(program)
            .args(self.engine.speak_args(&utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SynthesisError::Unavailable(program.to_string()),
                _ => SynthesisError::Engine(e.to_string()),
            })?;

        // Dropping stdin closes it, which ends the engine's input.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(utterance.text.as_bytes())
                .await
                .map_err(|e| SynthesisError::Engine(format!("{program} stdin: {e}")))?;
        }

        self.speaking.store(true, Ordering::SeqCst);
        let finished = tokio::select! {
            status = child.wait() => Some(status),
            _ = token.cancelled() => None,
        };
        self.speaking.store(false, Ordering::SeqCst);

        match finished {
            None => {
                let _ = child.start_kill();
                Err(SynthesisError::Interrupted)
            }
            Some(Ok(status)) if status.success() => Ok(()),
            // Killed from outside (e.g. another `say` took the device).
            Some(Ok(status)) if status.code().is_none() => Err(SynthesisError::Interrupted),
            Some(Ok(status)) => Err(SynthesisError::Engine(format!("{program} exited with {status}"))),
            Some(Err(e)) => Err(SynthesisError::Engine(e.to_string())),
        }
    }

    fn cancel(&self) {
        let mut current = self.current.lock().unwrap();
        current.cancel();
        *current = CancellationToken::new();
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(voice: Option<Voice>) -> Utterance {
        Utterance {
            text: "Hello there.".into(),
            voice,
            lang: "en-US".into(),
            rate: 1.2,
            pitch: 0.9,
            volume: 1.0,
        }
    }

    #[test]
    fn say_args() {
        let args = CommandEngine::Say.speak_args(&utterance(Some(Voice::new("Daniel", "en_GB"))));
        assert_eq!(args, vec!["-r", "210", "-v", "Daniel", "-f", "-"]);
    }

    #[test]
    fn espeak_args() {
        let args = CommandEngine::EspeakNg.speak_args(&utterance(None));
        assert_eq!(
            args,
            vec!["-s", "210", "-p", "45", "-a", "100", "--stdin"]
        );
    }

    #[test]
    fn dash_leading_text_never_reaches_argv() {
        let mut u = utterance(None);
        u.text = "- Led the team -v fr".into();
        for engine in [CommandEngine::Say, CommandEngine::EspeakNg] {
            let args = engine.speak_args(&u);
            assert!(
                args.iter().all(|a| !a.contains("Led the team")),
                "{engine:?}: {args:?}"
            );
            assert!(!args.contains(&"fr".to_string()));
        }
    }

    #[test]
    fn parse_say_voice_list() {
        let out = "Alex                en_US    # Most people recognize me by my voice.\n\
                   Bad News            en_US    # The light you see at the end of the tunnel.\n\
                   Amelie              fr_CA    # Bonjour, je m'appelle Amelie.\n";
        let voices = CommandEngine::Say.parse_voices(out);
        assert_eq!(
            voices,
            vec![
                Voice::new("Alex", "en_US"),
                Voice::new("Bad News", "en_US"),
                Voice::new("Amelie", "fr_CA"),
            ]
        );
    }

    #[test]
    fn parse_espeak_voice_list() {
        let out = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                   5  af              --/M      Afrikaans          gmw/af\n \
                   2  en-us           --/F      English_(America)  gmw/en-US            (en 3)\n";
        let voices = CommandEngine::EspeakNg.parse_voices(out);
        assert_eq!(
            voices,
            vec![
                Voice::new("Afrikaans (male)", "af"),
                Voice::new("English (America)", "en-us"),
            ]
        );
    }

    #[test]
    fn auto_engine_follows_platform() {
        let engine = CommandEngine::from_setting(SpeechEngine::Auto);
        if cfg!(target_os = "macos") {
            assert_eq!(engine, CommandEngine::Say);
        } else {
            assert_eq!(engine, CommandEngine::EspeakNg);
        }
        assert_eq!(
            CommandSynthesizer::from_setting(SpeechEngine::EspeakNg).engine(),
            CommandEngine::EspeakNg
        );
    }

    #[test]
    fn idle_synthesizer_is_not_speaking() {
        let synth = CommandSynthesizer::new(CommandEngine::EspeakNg);
        synth.cancel();
        assert!(!synth.is_speaking());
        assert!(!synth.is_busy());
    }
}
