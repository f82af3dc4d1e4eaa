use std::future;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use spin_core::{AnalysisResult, DeviceEvent, Error, Result, SpeechDevice};
use crate::session::{NarrationSnapshot, Narrator, Step};

enum Command {
    Start(Box<AnalysisResult>, oneshot::Sender<bool>),
    Pause(oneshot::Sender<bool>),
    Resume(oneshot::Sender<bool>),
    Toggle(oneshot::Sender<bool>),
    Stop(oneshot::Sender<bool>),
    SelectVoice(Option<String>, oneshot::Sender<bool>),
}

/// Runs a `Narrator` on its own task. Commands and device events are handled
/// one at a time, so the session never sees two transitions at once.
pub struct NarrationController<D: SpeechDevice> {
    narrator: Narrator<D>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedReceiver<DeviceEvent>,
    snapshots: watch::Sender<NarrationSnapshot>,
    next_speak: Option<(u64, Instant)>,
}

impl<D: SpeechDevice + 'static> NarrationController<D> {
    /// `events` must be the receiving end of the channel the device reports to.
    pub fn spawn(narrator: Narrator<D>, events: mpsc::UnboundedReceiver<DeviceEvent>) -> NarrationHandle {
        let (command_tx, commands) = mpsc::channel(16);
        let (snapshots, snapshot_rx) = watch::channel(narrator.snapshot());

        let controller = Self { narrator, commands, events, snapshots, next_speak: None };
        tokio::spawn(controller.run());

        NarrationHandle { commands: command_tx, snapshots: snapshot_rx }
    }

    async fn run(mut self) {
        tracing::debug!("Narration controller started");
        loop {
            let deadline = self.next_speak.map(|(_, at)| at);
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending().await,
                }
            };

            let mut reply = None;
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => reply = Some(self.apply(command)),
                    None => break,
                },
                Some(event) = self.events.recv() => {
                    let step = self.narrator.handle_event(event);
                    self.schedule(step);
                }
                _ = timer => {
                    if let Some((generation, _)) = self.next_speak.take() {
                        let step = self.narrator.speak_next(generation);
                        self.schedule(step);
                    }
                }
            }

            self.publish();
            // Answer after publishing so callers observe their own change.
            if let Some((sender, answer)) = reply {
                let _ = sender.send(answer);
            }
        }

        self.narrator.stop();
        tracing::debug!("Narration controller stopped");
    }

    fn publish(&self) {
        let snapshot = self.narrator.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn schedule(&mut self, step: Step) {
        if let Step::SpeakAfter { generation, delay } = step {
            self.next_speak = Some((generation, Instant::now() + delay));
        }
    }

    fn apply(&mut self, command: Command) -> (oneshot::Sender<bool>, bool) {
        match command {
            Command::Start(result, reply) => {
                let step = self.narrator.start(Some(result.as_ref()));
                (reply, self.schedule_some(step))
            }
            Command::Pause(reply) => (reply, self.narrator.pause()),
            Command::Resume(reply) => {
                let step = self.narrator.resume();
                (reply, self.schedule_some(step))
            }
            Command::Toggle(reply) => {
                let step = self.narrator.toggle_pause();
                (reply, self.schedule_some(step))
            }
            Command::Stop(reply) => {
                self.next_speak = None;
                (reply, self.narrator.stop())
            }
            Command::SelectVoice(voice_id, reply) => {
                let known = match &voice_id {
                    Some(id) => self.narrator.voices().iter().any(|v| &v.id == id || &v.name == id),
                    None => true,
                };
                if known {
                    self.narrator.set_preferred_voice(voice_id);
                }
                (reply, known)
            }
        }
    }

    fn schedule_some(&mut self, step: Option<Step>) -> bool {
        match step {
            Some(step) => {
                self.schedule(step);
                true
            }
            None => false,
        }
    }
}

/// Cloneable handle to a running `NarrationController`. The task ends once
/// every handle is dropped.
#[derive(Clone)]
pub struct NarrationHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<NarrationSnapshot>,
}

impl NarrationHandle {
    async fn request(&self, command: impl FnOnce(oneshot::Sender<bool>) -> Command) -> Result<bool> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| Error::NarrationDeviceError("narration task is gone".to_string()))?;
        answer
            .await
            .map_err(|_| Error::NarrationDeviceError("narration task dropped the request".to_string()))
    }

    /// Returns `false` when there was nothing to narrate.
    pub async fn start(&self, result: AnalysisResult) -> Result<bool> {
        self.request(|reply| Command::Start(Box::new(result), reply)).await
    }

    pub async fn pause(&self) -> Result<bool> {
        self.request(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<bool> {
        self.request(Command::Resume).await
    }

    pub async fn toggle_pause(&self) -> Result<bool> {
        self.request(Command::Toggle).await
    }

    pub async fn stop(&self) -> Result<bool> {
        self.request(Command::Stop).await
    }

    /// Returns `false` for a voice the device does not offer.
    pub async fn select_voice(&self, voice_id: Option<String>) -> Result<bool> {
        self.request(|reply| Command::SelectVoice(voice_id, reply)).await
    }

    pub fn snapshot(&self) -> NarrationSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NarrationSnapshot> {
        self.snapshots.clone()
    }
}
