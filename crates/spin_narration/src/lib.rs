use std::time::Duration;

pub mod controller;
pub mod device;
pub mod queue;
pub mod session;
pub mod voices;

pub use controller::{NarrationController, NarrationHandle};
pub use device::{CommandSpeechDevice, SilentSpeechDevice, SpeechEngine};
pub use queue::{build_queue, split_sentences};
pub use session::{NarrationSnapshot, Narrator, SpeechSession, SpeechState, Step};
pub use voices::{select_voice, VoiceChoice, VoiceTier};

#[derive(Debug, Clone)]
pub struct NarrationConfig {
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
    /// Pause between units, and between a cancel and the next speak.
    pub settle_delay: Duration,
    /// Tried in order before falling back to any local voice.
    pub premium_voices: Vec<String>,
    pub preferred_voice: Option<String>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
            settle_delay: Duration::from_millis(50),
            premium_voices: ["Samantha", "Alex", "Google US English", "English_(America)"]
                .into_iter()
                .map(String::from)
                .collect(),
            preferred_voice: None,
        }
    }
}

pub mod prelude {
    pub use super::{NarrationConfig, NarrationHandle, Narrator, SpeechState};
    pub use spin_core::{DeviceEvent, SpeechDevice, Voice};
}
