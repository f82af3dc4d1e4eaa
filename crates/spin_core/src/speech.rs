use std::fmt;
use serde::{Deserialize, Serialize};
use crate::types::SectionId;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    /// BCP 47 style tag, e.g. `en-US`.
    pub lang: String,
    /// Synthesized on this machine rather than by a network service.
    pub local_service: bool,
}

/// Identifies one queued unit inside one narration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UtteranceToken {
    pub generation: u64,
    pub index: usize,
}

impl fmt::Display for UtteranceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.generation, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub token: UtteranceToken,
    pub section_id: SectionId,
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Lifecycle signals a device reports for each utterance it was handed.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Started(UtteranceToken),
    Ended(UtteranceToken),
    Failed(UtteranceToken, String),
    VoicesChanged,
}

/// A platform speech synthesizer. Only one utterance is active at a time and
/// lifecycle events are delivered out of band through the channel the device
/// was created with.
pub trait SpeechDevice: Send {
    fn speak(&mut self, utterance: Utterance) -> Result<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    /// Drops the active utterance. Late events for it may still arrive.
    fn cancel(&mut self);
    fn voices(&self) -> Vec<Voice>;
    fn speaking(&self) -> bool;
    fn pending(&self) -> bool;
}
