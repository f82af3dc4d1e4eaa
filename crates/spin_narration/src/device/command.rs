use std::process::{Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use spin_core::{DeviceEvent, Error, Result, SpeechDevice, Utterance, Voice};
use super::SpeechEngine;

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;

struct Active {
    utterance: Utterance,
    done: Arc<AtomicBool>,
    // Dropping this kills the child.
    _cancel: oneshot::Sender<()>,
}

/// Speaks through a command-line synthesizer, one child process per unit.
///
/// The engines have no pause of their own: pausing kills the running child
/// and resuming speaks the same unit again from its start.
pub struct CommandSpeechDevice {
    engine: SpeechEngine,
    program: &'static str,
    events: UnboundedSender<DeviceEvent>,
    voices: Vec<Voice>,
    active: Option<Active>,
    paused: Option<Utterance>,
}

impl CommandSpeechDevice {
    /// Checks that the engine is installed and loads its voices.
    pub async fn detect(engine: SpeechEngine, events: UnboundedSender<DeviceEvent>) -> Result<Self> {
        let engine = engine.resolve();
        let program = engine
            .program()
            .ok_or_else(|| Error::NarrationUnsupported(format!("{} has no synthesizer", engine)))?;

        let voices = list_voices(engine, program).await?;
        tracing::info!("🔊 Speaking through {} ({} voices)", program, voices.len());

        Ok(Self { engine, program, events, voices, active: None, paused: None })
    }

    fn speak_args(&self, utterance: &Utterance) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(voice) = &utterance.voice {
            args.push("-v".to_string());
            args.push(voice.id.clone());
        }
        let rate = (BASE_WORDS_PER_MINUTE * utterance.rate).round().clamp(80.0, 450.0);
        match self.engine {
            SpeechEngine::Say => {
                args.push("-r".to_string());
                args.push(format!("{}", rate as u32));
            }
            _ => {
                let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0);
                args.push("-s".to_string());
                args.push(format!("{}", rate as u32));
                args.push("-p".to_string());
                args.push(format!("{}", pitch as u32));
                args.push("--stdin".to_string());
            }
        }
        args
    }

    fn launch(&mut self, utterance: Utterance) -> Result<()> {
        let child = Command::new(self.program)
            .args(self.speak_args(&utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::NarrationDeviceError(format!("could not start {}: {}", self.program, e)))?;

        let (cancel, cancelled) = oneshot::channel::<()>();
        let done = Arc::new(AtomicBool::new(false));
        let token = utterance.token;
        let text = utterance.text.clone();
        let events = self.events.clone();
        let program = self.program;
        let finished = done.clone();

        tokio::spawn(async move {
            let _ = events.send(DeviceEvent::Started(token));
            let outcome = tokio::select! {
                output = speak_to_end(child, text) => Some(output),
                _ = cancelled => None,
            };
            finished.store(true, Ordering::SeqCst);

            let event = match outcome {
                None => return,
                Some(Ok(output)) if output.status.success() => DeviceEvent::Ended(token),
                Some(Ok(output)) => DeviceEvent::Failed(
                    token,
                    format!("{} exited with {}: {}", program, output.status, String::from_utf8_lossy(&output.stderr).trim()),
                ),
                Some(Err(e)) => DeviceEvent::Failed(token, e.to_string()),
            };
            let _ = events.send(event);
        });

        self.active = Some(Active { utterance, done, _cancel: cancel });
        Ok(())
    }
}

async fn speak_to_end(mut child: Child, text: String) -> std::io::Result<Output> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }
    child.wait_with_output().await
}

impl SpeechDevice for CommandSpeechDevice {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.active = None;
        self.paused = None;
        self.launch(utterance)
    }

    fn pause(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.done.load(Ordering::SeqCst) {
                self.paused = Some(active.utterance);
            }
        }
    }

    fn resume(&mut self) {
        let Some(utterance) = self.paused.take() else { return };
        let token = utterance.token;
        if let Err(e) = self.launch(utterance) {
            let _ = self.events.send(DeviceEvent::Failed(token, e.to_string()));
        }
    }

    fn cancel(&mut self) {
        self.active = None;
        self.paused = None;
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speaking(&self) -> bool {
        self.active.as_ref().map_or(false, |a| !a.done.load(Ordering::SeqCst))
    }

    fn pending(&self) -> bool {
        self.paused.is_some()
    }
}

async fn list_voices(engine: SpeechEngine, program: &str) -> Result<Vec<Voice>> {
    let args: &[&str] = match engine {
        SpeechEngine::Say => &["-v", "?"],
        _ => &["--voices"],
    };
    let output = Command::new(program).args(args).output().await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NarrationUnsupported(format!("{} is not installed", program)),
        _ => Error::Io(e),
    })?;
    if !output.status.success() {
        return Err(Error::NarrationUnsupported(format!("{} could not list voices ({})", program, output.status)));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    Ok(match engine {
        SpeechEngine::Say => parse_say_voices(&listing),
        _ => parse_espeak_voices(&listing),
    })
}

/// Parses `espeak-ng --voices`:
/// `Pty Language Age/Gender VoiceName File Other Languages`.
fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                return None;
            }
            Some(Voice {
                id: fields[4].to_string(),
                name: fields[3].to_string(),
                lang: fields[1].to_string(),
                local_service: true,
            })
        })
        .collect()
}

/// Parses `say -v '?'`: `Name  xx_YY  # sample sentence`. Names may contain spaces.
fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            let head = line.split_once('#').map_or(line, |(head, _)| head).trim();
            let (name, lang) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Voice {
                id: name.to_string(),
                name: name.to_string(),
                lang: lang.replace('_', "-"),
                local_service: true,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spin_core::{SectionId, UtteranceToken};
    use tokio::sync::mpsc;

    #[test]
    fn test_parse_espeak_voices() {
        let listing = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-us           --/M      English_(America)  gmw/en-US            (en 10)
";
        let voices = parse_espeak_voices(listing);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, "gmw/en-US");
        assert_eq!(voices[1].name, "English_(America)");
        assert_eq!(voices[1].lang, "en-us");
    }

    #[test]
    fn test_parse_say_voices() {
        let listing = "\
Samantha            en_US    # Hello, my name is Samantha.
Good News           en_US    # Congratulations you just won the sweepstakes.
Thomas              fr_FR    # Bonjour, je m'appelle Thomas.
";
        let voices = parse_say_voices(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].name, "Good News");
        assert_eq!(voices[1].lang, "en-US");
        assert_eq!(voices[2].lang, "fr-FR");
    }

    #[test]
    fn test_speak_args() {
        let (events, _rx) = mpsc::unbounded_channel();
        let device = |engine| CommandSpeechDevice {
            engine,
            program: "test",
            events: events.clone(),
            voices: Vec::new(),
            active: None,
            paused: None,
        };
        let utterance = Utterance {
            token: UtteranceToken { generation: 1, index: 0 },
            section_id: SectionId::Header,
            text: "Hello.".to_string(),
            voice: Some(Voice { id: "gmw/en-US".into(), name: "English".into(), lang: "en-us".into(), local_service: true }),
            rate: 2.0,
            pitch: 3.0,
        };

        let args = device(SpeechEngine::EspeakNg).speak_args(&utterance);
        assert_eq!(args, vec!["-v", "gmw/en-US", "-s", "350", "-p", "99", "--stdin"]);

        let args = device(SpeechEngine::Say).speak_args(&utterance);
        assert_eq!(args, vec!["-v", "gmw/en-US", "-r", "350"]);
    }

    #[tokio::test]
    async fn test_missing_engine_is_unsupported() {
        let (events, _rx) = mpsc::unbounded_channel();
        let err = CommandSpeechDevice::detect(SpeechEngine::Silent, events).await.err().unwrap();
        assert!(matches!(err, Error::NarrationUnsupported(_)));
    }
}
