use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use spin_core::logging::init_logging;
use spin_core::{AnalysisInput, AnalysisResult, Error, Result};
use spin_inference::{create_model, AnalysisPipeline, HeadlineFeed, InferenceConfig, Strategy};
use spin_narration::{
    select_voice, CommandSpeechDevice, NarrationConfig, NarrationController, NarrationHandle, Narrator,
    SilentSpeechDevice, SpeechEngine, SpeechState,
};
use spin_web::{create_app, AppState};

mod render;

#[derive(Debug, Clone, Copy)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `90`, `30s`, `5m`, `1h30m` and the like. Bare numbers are seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = 0u64;
        let mut digits = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_whitespace() && digits.is_empty() {
                continue;
            }
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let value: u64 = digits.parse().map_err(|_| format!("Expected a number before '{}'", c))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total = value
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            digits.clear();
            seen_number = true;
        }
        if !digits.is_empty() {
            let value = digits.parse::<u64>().map_err(|e| e.to_string())?;
            total = total.checked_add(value).ok_or_else(|| format!("Duration too large: {}", s))?;
            seen_number = true;
        }
        if !seen_number {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-perspective news analysis with narrated playback", long_about = None)]
pub struct Cli {
    /// Credential for the hosted model.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "SPIN_MODEL", default_value = "gemini", help = "Model to use for inference. Available models: gemini (default), dummy, ollama")]
    model: String,
    #[arg(long, env = "SPIN_MODEL_NAME")]
    model_name: Option<String>,
    /// Base URL for the hosted model, or host:port/model for Ollama.
    #[arg(long, env = "SPIN_MODEL_URL")]
    model_url: Option<String>,
    /// Per-request timeout (e.g. 30s, 2m).
    #[arg(long, default_value = "60s")]
    timeout: HumanDuration,
    #[arg(long, default_value = "en-US")]
    locale: String,
    /// Preferred voice id or name.
    #[arg(long, env = "SPIN_VOICE")]
    voice: Option<String>,
    #[arg(long, default_value_t = 1.0)]
    rate: f32,
    #[arg(long, default_value_t = 1.0)]
    pitch: f32,
    /// auto, espeak-ng, say or none.
    #[arg(long, default_value = "auto")]
    speech_engine: SpeechEngine,
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch and print the current headlines.
    Headlines {
        /// Keep running and re-fetch at this interval (e.g. 15m).
        #[arg(long)]
        refresh: Option<HumanDuration>,
    },
    /// Analyze a topic, or a headline by its number in `spin headlines`.
    Analyze {
        #[arg(required_unless_present = "headline")]
        topic: Option<String>,
        #[arg(long, conflicts_with = "topic")]
        headline: Option<usize>,
        /// direct or search. Defaults to direct for headlines and search for topics.
        #[arg(long)]
        strategy: Option<Strategy>,
        /// Read the analysis aloud.
        #[arg(long)]
        narrate: bool,
        /// Print the canonical JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List the speech engine's voices and the one narration would use.
    Voices,
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        #[arg(long)]
        refresh: Option<HumanDuration>,
    },
}

impl Cli {
    fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            model_url: self.model_url.clone(),
            request_timeout: self.timeout.0,
        }
    }

    fn narration_config(&self) -> NarrationConfig {
        NarrationConfig {
            locale: self.locale.clone(),
            rate: self.rate,
            pitch: self.pitch,
            preferred_voice: self.voice.clone(),
            ..NarrationConfig::default()
        }
    }
}

async fn start_narration(cli: &Cli) -> Result<NarrationHandle> {
    let (events, events_rx) = mpsc::unbounded_channel();
    let config = cli.narration_config();
    let handle = match cli.speech_engine {
        SpeechEngine::Silent => NarrationController::spawn(Narrator::new(SilentSpeechDevice::new(events), config), events_rx),
        engine => {
            let device = CommandSpeechDevice::detect(engine, events).await?;
            NarrationController::spawn(Narrator::new(device, config), events_rx)
        }
    };
    Ok(handle)
}

async fn print_headlines(pipeline: Arc<AnalysisPipeline>, refresh: Option<HumanDuration>) -> Result<()> {
    let set = pipeline.discover_headlines().await?;
    println!("{}", render::headlines(&set));

    let Some(HumanDuration(interval)) = refresh else { return Ok(()) };
    info!("🔄 Refreshing every {}s, Ctrl-C to quit", interval.as_secs());
    let feed = HeadlineFeed::spawn(pipeline, interval, Some(set));
    let mut updates = feed.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if snapshot.failures == 0 {
                    if let Some(set) = snapshot.headlines {
                        println!("{}", render::headlines(&set));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn narrate(cli: &Cli, result: &AnalysisResult) -> Result<()> {
    let handle = start_narration(cli).await?;
    if !handle.start(result.clone()).await? {
        warn!("⚠️ Nothing to narrate");
        return Ok(());
    }
    println!("Controls: p = pause/resume, r = restart, s = stop, q = quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut snapshots = handle.subscribe();
    let mut section = None;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match line.trim() {
                    "p" => { handle.toggle_pause().await?; }
                    "r" => { handle.start(result.clone()).await?; }
                    "s" | "q" => break,
                    _ => {}
                },
                None => stdin_open = false,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.active_section != section {
                    if let Some(active) = snapshot.active_section {
                        info!("🔈 {}", active);
                    }
                    section = snapshot.active_section;
                }
                if snapshot.state == SpeechState::Stopped && snapshot.queue_len == 0 {
                    if let Some(error) = snapshot.last_error {
                        warn!("⚠️ {}", error);
                    }
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let inference_config = cli.inference_config();
    let model = create_model(&inference_config)?;
    let pipeline = Arc::new(AnalysisPipeline::new(model, inference_config.pipeline_config()));
    info!("🧠 Inference model initialized successfully (using {})", pipeline.model_name());

    match &cli.command {
        Commands::Headlines { refresh } => print_headlines(pipeline, *refresh).await?,
        Commands::Analyze { topic, headline, strategy, narrate: read_aloud, json } => {
            let input = match (topic, headline) {
                (_, Some(index)) => {
                    let set = pipeline.discover_headlines().await?;
                    let picked = set.iter().nth(*index).cloned().ok_or_else(|| {
                        Error::HeadlinesUnavailable(format!("no headline number {} ({} available)", index, set.len()))
                    })?;
                    AnalysisInput::Headline(picked)
                }
                (Some(topic), None) => AnalysisInput::Topic(topic.clone()),
                (None, None) => return Err(Error::ConfigurationMissing("a topic or --headline".to_string())),
            };
            let strategy = strategy.unwrap_or_else(|| Strategy::default_for(&input));
            info!("🔎 Analyzing \"{}\" ({:?})", input.text(), strategy);

            let result = pipeline.analyze_with(&input, strategy).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render::analysis(&result));
            }
            if *read_aloud {
                narrate(&cli, &result).await?;
            }
        }
        Commands::Voices => {
            let (events, _events_rx) = mpsc::unbounded_channel();
            let device = CommandSpeechDevice::detect(cli.speech_engine, events).await?;
            let voices = spin_core::SpeechDevice::voices(&device);
            for voice in &voices {
                let local = if voice.local_service { "local" } else { "remote" };
                println!("{:<40} {:<10} {:<6} {}", voice.name, voice.lang, local, voice.id);
            }
            let config = cli.narration_config();
            match select_voice(&voices, config.preferred_voice.as_deref(), &config.locale, &config.premium_voices) {
                Some(choice) => println!("\nNarration would use {} ({:?})", choice.voice.name, choice.tier),
                None => println!("\nNo voice matches {}; the engine default would be used", config.locale),
            }
        }
        Commands::Serve { addr, refresh } => {
            let narration = match start_narration(&cli).await {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("⚠️ Narration disabled: {}", e);
                    None
                }
            };
            let mut state = AppState::new(pipeline.clone(), narration);
            if let Some(HumanDuration(interval)) = refresh {
                let initial = match pipeline.discover_headlines().await {
                    Ok(set) => Some(set),
                    Err(e) => {
                        warn!("⚠️ Initial headline fetch failed: {}", e);
                        None
                    }
                };
                state = state.with_feed(HeadlineFeed::spawn(pipeline.clone(), *interval, initial));
            }

            let listener = tokio::net::TcpListener::bind(*addr).await?;
            info!("🌐 Listening on http://{}", addr);
            axum::serve(listener, create_app(state)).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("1h30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(5400));
        assert_eq!("30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(30));
        assert_eq!("1h 15m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4500));
        assert!("m".parse::<HumanDuration>().is_err());
        assert!("5d".parse::<HumanDuration>().is_err());
        assert!("".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999h".parse::<HumanDuration>().is_err());
        assert!("5124095576030432h".parse::<HumanDuration>().is_err());
        assert!(format!("{}s 1s", u64::MAX).parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_cli_configuration() {
        let cli = Cli::try_parse_from([
            "spin", "--model", "dummy", "--timeout", "2m", "--voice", "Samantha", "--speech-engine", "none",
            "analyze", "tax plan", "--strategy", "direct",
        ])
        .unwrap();
        assert_eq!(cli.inference_config().request_timeout, Duration::from_secs(120));
        assert_eq!(cli.narration_config().preferred_voice.as_deref(), Some("Samantha"));
        assert_eq!(cli.speech_engine, SpeechEngine::Silent);
        match cli.command {
            Commands::Analyze { topic, strategy, .. } => {
                assert_eq!(topic.as_deref(), Some("tax plan"));
                assert_eq!(strategy, Some(Strategy::Direct));
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["spin", "analyze"]).is_err());
    }

    #[test]
    fn test_missing_key_fails_at_startup() {
        let cli = Cli::try_parse_from(["spin", "--model", "gemini", "--api-key", "", "voices"]).unwrap();
        let err = create_model(&cli.inference_config()).err().unwrap();
        assert!(matches!(err, Error::ConfigurationMissing(_)));
    }
}
