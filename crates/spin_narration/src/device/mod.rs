use std::fmt;
use std::str::FromStr;

mod command;
mod silent;

pub use command::CommandSpeechDevice;
pub use silent::SilentSpeechDevice;

/// Which synthesizer backs the narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEngine {
    /// `say` on macOS, `espeak-ng` elsewhere.
    Auto,
    EspeakNg,
    Say,
    /// Completes every utterance instantly without audio.
    Silent,
}

impl SpeechEngine {
    pub fn resolve(self) -> Self {
        match self {
            SpeechEngine::Auto if cfg!(target_os = "macos") => SpeechEngine::Say,
            SpeechEngine::Auto => SpeechEngine::EspeakNg,
            other => other,
        }
    }

    pub fn program(&self) -> Option<&'static str> {
        match self.resolve() {
            SpeechEngine::EspeakNg => Some("espeak-ng"),
            SpeechEngine::Say => Some("say"),
            _ => None,
        }
    }
}

impl fmt::Display for SpeechEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpeechEngine::Auto => "auto",
            SpeechEngine::EspeakNg => "espeak-ng",
            SpeechEngine::Say => "say",
            SpeechEngine::Silent => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for SpeechEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SpeechEngine::Auto),
            "espeak" | "espeak-ng" => Ok(SpeechEngine::EspeakNg),
            "say" => Ok(SpeechEngine::Say),
            "none" | "silent" => Ok(SpeechEngine::Silent),
            other => Err(format!("Unknown speech engine: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_names() {
        assert_eq!("espeak".parse::<SpeechEngine>().unwrap(), SpeechEngine::EspeakNg);
        assert_eq!("None".parse::<SpeechEngine>().unwrap(), SpeechEngine::Silent);
        assert!("festival".parse::<SpeechEngine>().is_err());
        assert_eq!(SpeechEngine::Silent.program(), None);
        assert!(SpeechEngine::Auto.program().is_some());
    }
}
