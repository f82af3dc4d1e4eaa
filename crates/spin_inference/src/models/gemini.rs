use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use spin_core::{CompletionModel, CompletionRequest, Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Hosted Gemini `generateContent` client.
pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    model_name: String,
    endpoint: Url,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl GeminiModel {
    pub fn new(api_key: Option<String>, model_name: Option<String>, base_url: Option<&str>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::ConfigurationMissing("Gemini API key (GEMINI_API_KEY) is required".to_string()))?;
        let model_name = model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base = base_url.unwrap_or(DEFAULT_BASE_URL);
        let base = if base.ends_with('/') { base.to_string() } else { format!("{}/", base) };
        let endpoint = Url::parse(&base)
            .and_then(|b| b.join(&format!("models/{}:generateContent", model_name)))
            .map_err(|e| Error::ConfigurationMissing(format!("Invalid Gemini base URL {}: {}", base, e)))?;

        Ok(Self {
            client: Arc::new(Client::new()),
            api_key,
            model_name,
            endpoint,
        })
    }

    fn build_request(request: &CompletionRequest) -> GenerateRequest {
        // Search grounding and schema-constrained output cannot be combined.
        let (generation_config, tools) = if request.grounded {
            (None, vec![Tool { google_search: Value::Object(Default::default()) }])
        } else {
            let config = request.output_schema.clone().map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            });
            (config, Vec::new())
        };

        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: request.prompt.clone() }],
            }],
            generation_config,
            tools,
        }
    }

    fn response_text(response: GenerateResponse) -> Result<String> {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::ServiceUnavailable(format!("request blocked by the service: {}", reason)));
        }

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| Error::MalformedResponse("no candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::MalformedResponse(format!(
                "empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = Self::build_request(&request);

        let response = self.client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::ServiceUnavailable(format!(
                "{} request failed with status {}: {}",
                request.purpose, status, error_text
            )));
        }

        let response = response.json::<GenerateResponse>().await?;
        Self::response_text(response)
    }
}
