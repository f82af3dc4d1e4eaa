use std::fmt;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use crate::Result;

/// The step of the pipeline a completion request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPurpose {
    Headlines,
    DirectAnalysis,
    ArticleSearch,
    SourceClassification,
    ArticleAnalysis,
}

impl fmt::Display for RequestPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestPurpose::Headlines => "headlines",
            RequestPurpose::DirectAnalysis => "direct-analysis",
            RequestPurpose::ArticleSearch => "article-search",
            RequestPurpose::SourceClassification => "source-classification",
            RequestPurpose::ArticleAnalysis => "article-analysis",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub purpose: RequestPurpose,
    pub prompt: String,
    /// JSON schema the answer must follow; services honour it when they can.
    pub output_schema: Option<Value>,
    /// Allow the service to consult web search. Structured output is not
    /// available in this mode, the answer is free text.
    pub grounded: bool,
}

impl CompletionRequest {
    pub fn structured(purpose: RequestPurpose, prompt: String, schema: Value) -> Self {
        Self { purpose, prompt, output_schema: Some(schema), grounded: false }
    }

    pub fn grounded(purpose: RequestPurpose, prompt: String) -> Self {
        Self { purpose, prompt, output_schema: None, grounded: true }
    }
}

#[async_trait]
pub trait CompletionModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Sends one prompt and returns the raw text of the answer.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
