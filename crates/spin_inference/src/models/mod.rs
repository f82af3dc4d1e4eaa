use std::sync::Arc;
use spin_core::{CompletionModel, Error, Result};
use crate::InferenceConfig;

pub mod dummy;
pub mod gemini;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
#[cfg(feature = "ollama")]
pub use ollama::OllamaModel;

/// Builds the completion model named in the config.
pub fn create_model(config: &InferenceConfig) -> Result<Arc<dyn CompletionModel>> {
    match config.model.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiModel::new(
            config.api_key.clone(),
            config.model_name.clone(),
            config.model_url.as_deref(),
        )?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        #[cfg(feature = "ollama")]
        "ollama" => Ok(Arc::new(OllamaModel::new(config.model_url.as_deref())?)),
        #[cfg(not(feature = "ollama"))]
        "ollama" => Err(Error::ConfigurationMissing(
            "Ollama support is not compiled in (enable the `ollama` feature)".to_string(),
        )),
        other => Err(Error::ConfigurationMissing(format!(
            "Unknown model: {}. Available models: gemini (default), dummy, ollama",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        let config = InferenceConfig { model: "dummy".to_string(), ..Default::default() };
        assert_eq!(create_model(&config).unwrap().name(), "Dummy");

        let config = InferenceConfig { model: "gemini".to_string(), api_key: None, ..Default::default() };
        assert!(matches!(create_model(&config), Err(Error::ConfigurationMissing(_))));

        let config = InferenceConfig { model: "gpt-9".to_string(), ..Default::default() };
        assert!(create_model(&config).is_err());
    }
}
