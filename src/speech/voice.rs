//! Installed voices and the preferred-voice rule.

/// A voice offered by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP-47 style tag, e.g. `en-US` (some engines use `en_US`).
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn is_male(&self) -> bool {
        const MALE_NAMES: &[&str] = &[
            "Daniel",
            "David",
            "Google UK English Male",
            "Microsoft David",
            "Microsoft Mark",
            "Microsoft Guy",
            "Alex",
        ];
        let lower = self.name.to_lowercase();
        let tagged_male = lower.contains("male") && !lower.contains("female");
        tagged_male || MALE_NAMES.iter().any(|n| self.name.contains(n))
    }

    fn is_english(&self) -> bool {
        self.lang.starts_with("en-") || self.lang.starts_with("en_")
    }
}

/// Pick the voice to speak with: a male-sounding voice, else the first
/// English voice, else whatever comes first.
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| v.is_male())
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .or_else(|| voices.first())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn male_voice_preferred() {
        let voices = vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Google UK English Female", "en-GB"),
            Voice::new("Daniel", "en-GB"),
        ];
        assert_eq!(select_voice(&voices).unwrap().name, "Daniel");
    }

    #[test]
    fn female_tag_is_not_male() {
        let voices = vec![
            Voice::new("English Female", "en-US"),
            Voice::new("Something Male", "fr-FR"),
        ];
        assert_eq!(select_voice(&voices).unwrap().name, "Something Male");
    }

    #[test]
    fn english_voice_when_no_male_match() {
        let voices = vec![Voice::new("Amelie", "fr-CA"), Voice::new("Karen", "en_AU")];
        assert_eq!(select_voice(&voices).unwrap().name, "Karen");
    }

    #[test]
    fn first_voice_as_last_resort() {
        let voices = vec![Voice::new("Amelie", "fr-CA"), Voice::new("Anna", "de-DE")];
        assert_eq!(select_voice(&voices).unwrap().name, "Amelie");
        assert!(select_voice(&[]).is_none());
    }
}
