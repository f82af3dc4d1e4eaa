//! Voice selection. Each fallback tier is its own function so the chain can
//! be checked step by step.

use serde::Serialize;
use spin_core::Voice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceTier {
    /// The voice the user picked.
    Preferred,
    /// A named high-quality voice for the locale.
    Premium,
    /// A voice synthesized locally for the locale.
    Local,
    /// Any voice for the locale.
    Locale,
    /// Any voice sharing the locale's language.
    Language,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceChoice {
    pub voice: Voice,
    pub tier: VoiceTier,
}

impl VoiceChoice {
    /// True when something other than the user's own pick was used.
    pub fn is_fallback(&self) -> bool {
        self.tier != VoiceTier::Preferred
    }
}

fn normalize_lang(lang: &str) -> String {
    lang.trim().replace('_', "-").to_ascii_lowercase()
}

fn language_of(lang: &str) -> String {
    normalize_lang(lang).split('-').next().unwrap_or_default().to_string()
}

fn matches_locale(voice: &Voice, locale: &str) -> bool {
    normalize_lang(&voice.lang) == normalize_lang(locale)
}

pub fn preferred_voice<'a>(voices: &'a [Voice], preferred: &str) -> Option<&'a Voice> {
    voices.iter().find(|v| v.id == preferred).or_else(|| voices.iter().find(|v| v.name == preferred))
}

/// Tries the premium names in the order given.
pub fn premium_voice<'a>(voices: &'a [Voice], locale: &str, premium_names: &[String]) -> Option<&'a Voice> {
    premium_names
        .iter()
        .find_map(|name| voices.iter().find(|v| &v.name == name && matches_locale(v, locale)))
}

pub fn local_voice<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    voices.iter().find(|v| v.local_service && matches_locale(v, locale))
}

pub fn locale_voice<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    voices.iter().find(|v| matches_locale(v, locale))
}

pub fn language_voice<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    let language = language_of(locale);
    voices.iter().find(|v| language_of(&v.lang) == language)
}

/// Walks the chain: preferred → premium → local → locale → language.
pub fn select_voice(
    voices: &[Voice],
    preferred: Option<&str>,
    locale: &str,
    premium_names: &[String],
) -> Option<VoiceChoice> {
    let choice = |voice: &Voice, tier| Some(VoiceChoice { voice: voice.clone(), tier });

    if let Some(voice) = preferred.and_then(|p| preferred_voice(voices, p)) {
        return choice(voice, VoiceTier::Preferred);
    }
    if let Some(voice) = premium_voice(voices, locale, premium_names) {
        return choice(voice, VoiceTier::Premium);
    }
    if let Some(voice) = local_voice(voices, locale) {
        return choice(voice, VoiceTier::Local);
    }
    if let Some(voice) = locale_voice(voices, locale) {
        return choice(voice, VoiceTier::Locale);
    }
    language_voice(voices, locale).and_then(|voice| choice(voice, VoiceTier::Language))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, lang: &str, local: bool) -> Voice {
        Voice { id: id.to_string(), name: id.to_string(), lang: lang.to_string(), local_service: local }
    }

    fn premium() -> Vec<String> {
        vec!["Samantha".to_string(), "Google US English".to_string()]
    }

    #[test]
    fn test_chain_order() {
        let mut voices = vec![
            voice("Thomas", "fr-FR", true),
            voice("Daniel", "en-GB", true),
            voice("Remote", "en-US", false),
            voice("Local", "en_US", true),
            voice("Google US English", "en-US", false),
            voice("Samantha", "en-US", true),
        ];

        let pick = |voices: &[Voice], preferred| select_voice(voices, preferred, "en-US", &premium()).unwrap();

        let choice = pick(&voices, Some("Thomas"));
        assert_eq!((choice.voice.id.as_str(), choice.tier), ("Thomas", VoiceTier::Preferred));
        assert!(!choice.is_fallback());

        // An unknown preference falls through to the chain.
        let choice = pick(&voices, Some("Missing"));
        assert_eq!((choice.voice.id.as_str(), choice.tier), ("Samantha", VoiceTier::Premium));

        voices.pop();
        let choice = pick(&voices, None);
        assert_eq!((choice.voice.id.as_str(), choice.tier), ("Google US English", VoiceTier::Premium));

        voices.pop();
        let choice = pick(&voices, None);
        assert_eq!((choice.voice.id.as_str(), choice.tier), ("Local", VoiceTier::Local));

        voices.pop();
        let choice = pick(&voices, None);
        assert_eq!((choice.voice.id.as_str(), choice.tier), ("Remote", VoiceTier::Locale));

        voices.pop();
        let choice = pick(&voices, None);
        assert_eq!((choice.voice.id.as_str(), choice.tier), ("Daniel", VoiceTier::Language));
        assert!(choice.is_fallback());

        voices.pop();
        assert!(select_voice(&voices, None, "en-US", &premium()).is_none());
    }

    #[test]
    fn test_premium_requires_locale() {
        let voices = vec![voice("Samantha", "en-AU", true)];
        assert!(premium_voice(&voices, "en-US", &premium()).is_none());
        assert!(language_voice(&voices, "en-US").is_some());
    }
}
