use std::fmt;
use std::time::Duration;

pub mod adapters;
pub mod extract;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod prompts;

pub use extract::{extract_as, extract_json};
pub use feed::{FeedSnapshot, HeadlineFeed};
pub use models::create_model;
pub use pipeline::{AnalysisPipeline, PipelineConfig, Strategy};

#[derive(Clone)]
pub struct InferenceConfig {
    /// `gemini`, `dummy` or `ollama`.
    pub model: String,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    /// Base URL override for hosted models, `host:port/model` for Ollama.
    pub model_url: Option<String>,
    pub request_timeout: Duration,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: "gemini".to_string(),
            api_key: None,
            model_name: None,
            model_url: None,
            request_timeout: PipelineConfig::default().request_timeout,
        }
    }
}

impl InferenceConfig {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            request_timeout: self.request_timeout,
            ..PipelineConfig::default()
        }
    }
}

pub mod prelude {
    pub use super::{create_model, AnalysisPipeline, InferenceConfig, Strategy};
    pub use spin_core::{AnalysisInput, AnalysisResult, Error, HeadlineSet, Result};
}
