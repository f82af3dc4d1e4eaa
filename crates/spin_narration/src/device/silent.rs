use tokio::sync::mpsc::UnboundedSender;
use spin_core::{DeviceEvent, Result, SpeechDevice, Utterance, Voice};

/// Reports every utterance as started and finished the moment it is spoken.
/// Used when no synthesizer is installed and in tests.
pub struct SilentSpeechDevice {
    events: UnboundedSender<DeviceEvent>,
    voices: Vec<Voice>,
}

impl SilentSpeechDevice {
    pub fn new(events: UnboundedSender<DeviceEvent>) -> Self {
        Self::with_voices(events, Vec::new())
    }

    pub fn with_voices(events: UnboundedSender<DeviceEvent>, voices: Vec<Voice>) -> Self {
        Self { events, voices }
    }
}

impl SpeechDevice for SilentSpeechDevice {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        tracing::debug!("🔇 {}", utterance.text);
        let _ = self.events.send(DeviceEvent::Started(utterance.token));
        let _ = self.events.send(DeviceEvent::Ended(utterance.token));
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel(&mut self) {}

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speaking(&self) -> bool {
        false
    }

    fn pending(&self) -> bool {
        false
    }
}
