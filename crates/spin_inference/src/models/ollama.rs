use std::fmt;
use std::sync::Arc;
use anyhow::anyhow;
use url::Url;
use langchain_rust::language_models::llm::LLM;
use langchain_rust::llm::client::GenerationOptions;
use langchain_rust::llm::ollama::client::{Ollama, OllamaClient};
use spin_core::{CompletionModel, CompletionRequest, Error, Result};

const DEFAULT_URL: &str = "http://localhost:11434/gemma3:12b";
const DEFAULT_MODEL: &str = "gemma3:12b";

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaModelConfig {
    host: String,
    port: u16,
    model_name: String,
}

impl OllamaModelConfig {
    /// Reads `scheme://host:port/model`, e.g. `http://localhost:11434/llama3`.
    pub fn from_url(model_url: Option<&str>) -> Result<Self> {
        let parsed = Url::parse(model_url.unwrap_or(DEFAULT_URL))
            .map_err(|e| Error::ConfigurationMissing(format!("Invalid Ollama URL: {}", e)))?;
        let model_name = parsed.path().trim_start_matches('/').to_string();

        Ok(Self {
            host: format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or("localhost")),
            port: parsed.port().unwrap_or(11434),
            model_name: if model_name.is_empty() { DEFAULT_MODEL.to_string() } else { model_name },
        })
    }
}

/// Local Ollama model. It has no structured-output mode, so schemas are
/// appended to the prompt and the answer goes through JSON extraction.
pub struct OllamaModel {
    ollama: Ollama,
    config: OllamaModelConfig,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("ollama", &"<Ollama>")
            .field("config", &self.config)
            .finish()
    }
}

impl OllamaModel {
    pub fn new(model_url: Option<&str>) -> Result<Self> {
        let config = OllamaModelConfig::from_url(model_url)?;
        let client = Arc::new(OllamaClient::new(config.host.clone(), config.port));
        let ollama = Ollama::new(client, config.model_name.clone(), Some(GenerationOptions::default()));
        Ok(Self { ollama, config })
    }
}

#[async_trait::async_trait]
impl CompletionModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let prompt = match &request.output_schema {
            Some(schema) => format!(
                "{}\n\nRespond only with a JSON object following this schema:\n{}",
                request.prompt, schema
            ),
            None => request.prompt.clone(),
        };
        self.ollama.invoke(&prompt).await.map_err(|e| {
            Error::External(anyhow!(
                "Ollama at {}:{} failed the {} request: {}",
                self.config.host,
                self.config.port,
                request.purpose,
                e
            ))
        })
    }
}
