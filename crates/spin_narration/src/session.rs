use std::time::Duration;
use serde::Serialize;
use spin_core::{AnalysisResult, DeviceEvent, NarrationUnit, SectionId, SpeechDevice, Utterance, UtteranceToken, Voice};
use crate::queue::build_queue;
use crate::voices::{select_voice, VoiceChoice};
use crate::NarrationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechState {
    Stopped,
    Playing,
    Paused,
}

/// The one narration session. Replaced wholesale on every start or stop;
/// `generation` tells callbacks of a superseded session apart.
#[derive(Debug, Clone)]
pub struct SpeechSession {
    pub generation: u64,
    pub state: SpeechState,
    pub queue: Vec<NarrationUnit>,
    pub cursor: usize,
    pub active_section: Option<SectionId>,
    in_flight: Option<usize>,
}

impl SpeechSession {
    fn stopped(generation: u64) -> Self {
        Self {
            generation,
            state: SpeechState::Stopped,
            queue: Vec::new(),
            cursor: 0,
            active_section: None,
            in_flight: None,
        }
    }

    fn owns(&self, token: UtteranceToken) -> bool {
        token.generation == self.generation && self.in_flight == Some(token.index)
    }
}

/// What the caller has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    /// Call `speak_next(generation)` once `delay` has passed.
    SpeakAfter { generation: u64, delay: Duration },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationSnapshot {
    pub state: SpeechState,
    pub active_section: Option<SectionId>,
    pub cursor: usize,
    pub queue_len: usize,
    pub generation: u64,
    pub voice: Option<VoiceChoice>,
    pub voices: Vec<Voice>,
    pub preferred_voice: Option<String>,
    pub last_error: Option<String>,
}

/// Owns the speech device and drives it through one session at a time.
///
/// Everything here runs on a single task: transitions are plain `&mut self`
/// calls, device events come back through `handle_event`, and the caller is
/// responsible for honouring the delays returned in `Step`.
pub struct Narrator<D: SpeechDevice> {
    device: D,
    session: SpeechSession,
    config: NarrationConfig,
    voices: Vec<Voice>,
    preferred_voice: Option<String>,
    voice: Option<VoiceChoice>,
    last_error: Option<String>,
}

impl<D: SpeechDevice> Narrator<D> {
    pub fn new(device: D, config: NarrationConfig) -> Self {
        let voices = device.voices();
        let preferred_voice = config.preferred_voice.clone();
        Self {
            device,
            session: SpeechSession::stopped(0),
            config,
            voices,
            preferred_voice,
            voice: None,
            last_error: None,
        }
    }

    pub fn session(&self) -> &SpeechSession {
        &self.session
    }

    pub fn state(&self) -> SpeechState {
        self.session.state
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn preferred_voice(&self) -> Option<&str> {
        self.preferred_voice.as_deref()
    }

    pub fn snapshot(&self) -> NarrationSnapshot {
        NarrationSnapshot {
            state: self.session.state,
            active_section: self.session.active_section,
            cursor: self.session.cursor,
            queue_len: self.session.queue.len(),
            generation: self.session.generation,
            voice: self.voice.clone(),
            voices: self.voices.clone(),
            preferred_voice: self.preferred_voice.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Cancels the device and replaces the session with a fresh stopped one
    /// under a new generation, so every outstanding callback becomes stale.
    fn teardown(&mut self) {
        if self.device.speaking() || self.device.pending() {
            tracing::debug!("Cancelling speech of generation {}", self.session.generation);
        }
        self.device.cancel();
        self.session = SpeechSession::stopped(self.session.generation + 1);
    }

    fn refresh_voice(&mut self) {
        self.voice = select_voice(
            &self.voices,
            self.preferred_voice.as_deref(),
            &self.config.locale,
            &self.config.premium_voices,
        );
        match &self.voice {
            Some(choice) if choice.is_fallback() => {
                tracing::info!("🗣️ Using voice {} ({:?} fallback)", choice.voice.name, choice.tier)
            }
            Some(choice) => tracing::info!("🗣️ Using voice {}", choice.voice.name),
            None => tracing::warn!("⚠️ No voice for {}, using the device default", self.config.locale),
        }
    }

    pub fn set_preferred_voice(&mut self, voice_id: Option<String>) {
        self.preferred_voice = voice_id;
        self.refresh_voice();
    }

    /// Starts narrating `result`. Without a result this is a no-op returning
    /// `None`. A running session is torn down first.
    pub fn start(&mut self, result: Option<&AnalysisResult>) -> Option<Step> {
        let result = result?;

        self.teardown();
        self.last_error = None;

        let queue = build_queue(result);
        if queue.is_empty() {
            tracing::warn!("⚠️ Nothing to narrate for \"{}\"", result.title());
            return None;
        }

        self.refresh_voice();
        tracing::info!("▶️ Narrating \"{}\" ({} units)", result.title(), queue.len());
        self.session.queue = queue;
        self.session.state = SpeechState::Playing;

        // Let the cancel settle before the first speak.
        Some(Step::SpeakAfter { generation: self.session.generation, delay: self.config.settle_delay })
    }

    /// Hands the unit under the cursor to the device. Calls from an older
    /// generation, while paused, or while a unit is still in flight do nothing.
    pub fn speak_next(&mut self, generation: u64) -> Step {
        let session = &self.session;
        if generation != session.generation || session.state != SpeechState::Playing || session.in_flight.is_some() {
            return Step::Idle;
        }
        if session.cursor >= session.queue.len() {
            self.finish();
            return Step::Idle;
        }

        let unit = &session.queue[session.cursor];
        let utterance = Utterance {
            token: UtteranceToken { generation, index: session.cursor },
            section_id: unit.section_id,
            text: unit.text.clone(),
            voice: self.voice.as_ref().map(|c| c.voice.clone()),
            rate: self.config.rate,
            pitch: self.config.pitch,
        };
        let index = session.cursor;

        match self.device.speak(utterance) {
            Ok(()) => self.session.in_flight = Some(index),
            Err(spin_core::Error::NarrationDeviceError(reason)) => self.fail(reason),
            Err(e) => self.fail(e.to_string()),
        }
        Step::Idle
    }

    pub fn handle_event(&mut self, event: DeviceEvent) -> Step {
        match event {
            DeviceEvent::Started(token) => {
                if !self.session.owns(token) {
                    tracing::debug!("Ignoring stale start for {}", token);
                    return Step::Idle;
                }
                self.session.active_section = self.session.queue.get(token.index).map(|u| u.section_id);
                Step::Idle
            }
            DeviceEvent::Ended(token) => {
                if !self.session.owns(token) {
                    tracing::debug!("Ignoring stale end for {}", token);
                    return Step::Idle;
                }
                self.session.in_flight = None;
                self.session.cursor = token.index + 1;
                if self.session.cursor >= self.session.queue.len() {
                    self.finish();
                    return Step::Idle;
                }
                match self.session.state {
                    SpeechState::Playing => Step::SpeakAfter {
                        generation: self.session.generation,
                        delay: self.config.settle_delay,
                    },
                    // Resume schedules the next unit.
                    _ => Step::Idle,
                }
            }
            DeviceEvent::Failed(token, reason) => {
                if !self.session.owns(token) {
                    tracing::debug!("Ignoring stale error for {}: {}", token, reason);
                    return Step::Idle;
                }
                self.fail(reason);
                Step::Idle
            }
            DeviceEvent::VoicesChanged => {
                self.voices = self.device.voices();
                tracing::debug!("Voice list changed ({} voices)", self.voices.len());
                self.refresh_voice();
                Step::Idle
            }
        }
    }

    /// Only valid while playing. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        if self.session.state != SpeechState::Playing {
            return false;
        }
        self.device.pause();
        self.session.state = SpeechState::Paused;
        tracing::info!("⏸️ Narration paused");
        true
    }

    /// Only valid while paused; `None` otherwise.
    pub fn resume(&mut self) -> Option<Step> {
        if self.session.state != SpeechState::Paused {
            return None;
        }
        self.session.state = SpeechState::Playing;
        tracing::info!("⏯️ Narration resumed");
        if self.session.in_flight.is_some() {
            self.device.resume();
            Some(Step::Idle)
        } else {
            // The unit ended while paused; pick up at the cursor.
            Some(Step::SpeakAfter { generation: self.session.generation, delay: Duration::ZERO })
        }
    }

    pub fn toggle_pause(&mut self) -> Option<Step> {
        match self.session.state {
            SpeechState::Playing => self.pause().then_some(Step::Idle),
            SpeechState::Paused => self.resume(),
            SpeechState::Stopped => None,
        }
    }

    /// Valid from any state. Stopping an already stopped narrator is a no-op
    /// returning `false`.
    pub fn stop(&mut self) -> bool {
        if self.session.state == SpeechState::Stopped && self.session.queue.is_empty() {
            return false;
        }
        self.teardown();
        tracing::info!("⏹️ Narration stopped");
        true
    }

    fn finish(&mut self) {
        tracing::info!("🏁 Narration finished");
        self.session = SpeechSession::stopped(self.session.generation);
    }

    fn fail(&mut self, reason: String) {
        let error = spin_core::Error::NarrationDeviceError(reason);
        tracing::error!("❌ {}", error);
        self.last_error = Some(error.user_message());
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use spin_core::{Perspective, PerspectiveKind, Spectrum, Subject, TopicHeadline, ANALYSIS_SCHEMA_VERSION};
    use crate::voices::VoiceTier;

    #[derive(Debug, Default)]
    struct Calls {
        spoken: Vec<UtteranceToken>,
        cancels: usize,
        pauses: usize,
        resumes: usize,
    }

    struct FakeDevice {
        calls: Arc<Mutex<Calls>>,
        voices: Arc<Mutex<Vec<Voice>>>,
        fail_speak: bool,
    }

    impl SpeechDevice for FakeDevice {
        fn speak(&mut self, utterance: Utterance) -> spin_core::Result<()> {
            if self.fail_speak {
                return Err(spin_core::Error::NarrationDeviceError("synth crashed".to_string()));
            }
            self.calls.lock().unwrap().spoken.push(utterance.token);
            Ok(())
        }
        fn pause(&mut self) {
            self.calls.lock().unwrap().pauses += 1;
        }
        fn resume(&mut self) {
            self.calls.lock().unwrap().resumes += 1;
        }
        fn cancel(&mut self) {
            self.calls.lock().unwrap().cancels += 1;
        }
        fn voices(&self) -> Vec<Voice> {
            self.voices.lock().unwrap().clone()
        }
        fn speaking(&self) -> bool {
            false
        }
        fn pending(&self) -> bool {
            false
        }
    }

    fn narrator(fail_speak: bool) -> (Narrator<FakeDevice>, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let voices = vec![Voice { id: "v1".into(), name: "Samantha".into(), lang: "en-US".into(), local_service: true }];
        let device = FakeDevice { calls: calls.clone(), voices: Arc::new(Mutex::new(voices)), fail_speak };
        let config = NarrationConfig { settle_delay: Duration::ZERO, ..NarrationConfig::default() };
        (Narrator::new(device, config), calls)
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            schema_version: ANALYSIS_SCHEMA_VERSION,
            subject: Subject::Topic(TopicHeadline { text: "Vote".into(), source: None, url: None, published_at: None }),
            classification: None,
            perspectives: vec![Perspective {
                kind: PerspectiveKind::LeftWing,
                summary: Some("One. Two.".into()),
                talking_points: vec![],
            }],
            spectrum: Spectrum { score: 0.0, justification: String::new() },
        }
    }

    fn speak(narrator: &mut Narrator<FakeDevice>, step: Option<Step>) {
        if let Some(Step::SpeakAfter { generation, .. }) = step {
            narrator.speak_next(generation);
        }
    }

    #[test]
    fn test_start_without_result_is_noop() {
        let (mut narrator, calls) = narrator(false);
        assert!(narrator.start(None).is_none());
        assert_eq!(narrator.state(), SpeechState::Stopped);
        assert_eq!(calls.lock().unwrap().cancels, 0);
    }

    #[test]
    fn test_plays_queue_to_the_end() {
        let (mut narrator, calls) = narrator(false);
        let step = narrator.start(Some(&result()));
        let total = narrator.session().queue.len();
        assert_eq!(narrator.snapshot().voice.unwrap().voice.name, "Samantha");
        speak(&mut narrator, step);

        for i in 0..total {
            let token = *calls.lock().unwrap().spoken.last().unwrap();
            assert_eq!(token.index, i);
            narrator.handle_event(DeviceEvent::Started(token));
            assert!(narrator.session().active_section.is_some());
            let step = narrator.handle_event(DeviceEvent::Ended(token));
            speak(&mut narrator, Some(step));
        }

        assert_eq!(calls.lock().unwrap().spoken.len(), total);
        let snapshot = narrator.snapshot();
        assert_eq!(snapshot.state, SpeechState::Stopped);
        assert_eq!(snapshot.active_section, None);
        assert_eq!(snapshot.queue_len, 0);
    }

    #[test]
    fn test_never_speaks_while_in_flight() {
        let (mut narrator, calls) = narrator(false);
        let step = narrator.start(Some(&result()));
        speak(&mut narrator, step);
        let generation = narrator.session().generation;
        narrator.speak_next(generation);
        narrator.speak_next(generation);
        assert_eq!(calls.lock().unwrap().spoken.len(), 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let (mut narrator, calls) = narrator(false);
        assert!(!narrator.pause());
        assert!(narrator.resume().is_none());

        let step = narrator.start(Some(&result()));
        speak(&mut narrator, step);
        assert!(narrator.pause());
        assert!(!narrator.pause());
        assert_eq!(narrator.state(), SpeechState::Paused);

        // The in-flight unit resumes on the device.
        assert_eq!(narrator.resume(), Some(Step::Idle));
        assert_eq!(calls.lock().unwrap().resumes, 1);

        // A unit ending while paused is picked up by resume.
        narrator.pause();
        let token = *calls.lock().unwrap().spoken.last().unwrap();
        assert_eq!(narrator.handle_event(DeviceEvent::Ended(token)), Step::Idle);
        let generation = narrator.session().generation;
        narrator.speak_next(generation);
        assert_eq!(calls.lock().unwrap().spoken.len(), 1);
        let step = narrator.toggle_pause();
        assert!(matches!(step, Some(Step::SpeakAfter { .. })));
        speak(&mut narrator, step);
        assert_eq!(calls.lock().unwrap().spoken.len(), 2);
    }

    #[test]
    fn test_stop_from_any_state() {
        let (mut narrator, calls) = narrator(false);
        assert!(!narrator.stop());

        let step = narrator.start(Some(&result()));
        speak(&mut narrator, step);
        narrator.handle_event(DeviceEvent::Started(calls.lock().unwrap().spoken[0]));
        narrator.pause();
        assert!(narrator.stop());
        assert!(!narrator.stop());

        let session = narrator.session();
        assert_eq!(session.state, SpeechState::Stopped);
        assert!(session.queue.is_empty());
        assert_eq!(session.cursor, 0);
        assert_eq!(session.active_section, None);
    }

    #[test]
    fn test_stale_callbacks_are_ignored_after_restart() {
        let (mut narrator, calls) = narrator(false);
        let step = narrator.start(Some(&result()));
        speak(&mut narrator, step);
        let first = calls.lock().unwrap().spoken[0];

        narrator.stop();
        let step = narrator.start(Some(&result()));
        let pending_first_speak = step;

        // Late callbacks from the first session arrive before the second speaks.
        narrator.handle_event(DeviceEvent::Started(first));
        narrator.handle_event(DeviceEvent::Ended(first));
        narrator.handle_event(DeviceEvent::Failed(first, "interrupted".into()));
        assert_eq!(narrator.state(), SpeechState::Playing);
        assert_eq!(narrator.session().cursor, 0);
        assert_eq!(narrator.session().active_section, None);
        assert!(narrator.snapshot().last_error.is_none());

        // A delayed speak request of the first session is ignored as well.
        narrator.speak_next(first.generation);
        assert_eq!(calls.lock().unwrap().spoken.len(), 1);

        speak(&mut narrator, pending_first_speak);
        let second = *calls.lock().unwrap().spoken.last().unwrap();
        assert_ne!(second.generation, first.generation);
        assert_eq!(second.index, 0);
    }

    #[test]
    fn test_device_error_stops_session() {
        let (mut narrator, calls) = narrator(false);
        let step = narrator.start(Some(&result()));
        speak(&mut narrator, step);
        let token = calls.lock().unwrap().spoken[0];
        narrator.handle_event(DeviceEvent::Failed(token, "audio device lost".into()));

        let snapshot = narrator.snapshot();
        assert_eq!(snapshot.state, SpeechState::Stopped);
        assert!(snapshot.last_error.unwrap().contains("audio device lost"));

        let (mut narrator, _) = self::narrator(true);
        let step = narrator.start(Some(&result()));
        speak(&mut narrator, step);
        assert_eq!(narrator.state(), SpeechState::Stopped);
        assert_eq!(narrator.snapshot().last_error.as_deref(), Some("Narration stopped: synth crashed"));
    }

    #[test]
    fn test_voices_arriving_late_are_picked_up() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let voices = Arc::new(Mutex::new(Vec::new()));
        let device = FakeDevice { calls, voices: voices.clone(), fail_speak: false };
        let mut narrator = Narrator::new(device, NarrationConfig::default());
        assert!(narrator.snapshot().voices.is_empty());
        assert!(narrator.snapshot().voice.is_none());

        voices.lock().unwrap().extend([
            Voice { id: "fr".into(), name: "Amelie".into(), lang: "fr-FR".into(), local_service: true },
            Voice { id: "us".into(), name: "Daniel".into(), lang: "en-US".into(), local_service: false },
        ]);
        assert_eq!(narrator.handle_event(DeviceEvent::VoicesChanged), Step::Idle);

        let snapshot = narrator.snapshot();
        assert_eq!(snapshot.voices.len(), 2);
        let choice = snapshot.voice.unwrap();
        assert_eq!(choice.voice.name, "Daniel");
        assert_eq!(choice.tier, VoiceTier::Locale);
    }
}
