//! Model backend selected at runtime from configuration.

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::Result;
use reshape_domain::LlmProvider;
use reshape_llm::{LlmError, OllamaProvider, OpenAiProvider};

/// One of the supported model backends.
#[derive(Debug)]
pub enum Backend {
    /// OpenAI chat completions
    OpenAi(OpenAiProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
}

impl Backend {
    /// Build the configured backend.
    ///
    /// The OpenAI backend needs an API key, taken from `api_key` (the
    /// `--api-key` flag or `OPENAI_API_KEY`).
    pub fn from_config(config: &ProviderConfig, api_key: Option<&str>) -> Result<Self> {
        let model = config.model_or_default();

        let backend = match config.kind {
            ProviderKind::OpenAi => {
                let key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                    LlmError::Config(format!(
                        "{} is not set; export it or pass --api-key",
                        reshape_llm::openai::API_KEY_ENV
                    ))
                })?;
                let mut provider = OpenAiProvider::new(key, model);
                if let Some(endpoint) = &config.endpoint {
                    provider = provider.with_base_url(endpoint.as_str());
                }
                Backend::OpenAi(provider)
            }
            ProviderKind::Ollama => {
                let provider = match &config.endpoint {
                    Some(endpoint) => OllamaProvider::new(endpoint.as_str(), model),
                    None => OllamaProvider::default_endpoint(model),
                };
                Backend::Ollama(provider)
            }
        };

        Ok(backend)
    }

    /// Model name in use.
    pub fn model(&self) -> &str {
        match self {
            Backend::OpenAi(provider) => provider.model(),
            Backend::Ollama(provider) => provider.model(),
        }
    }
}

impl LlmProvider for Backend {
    type Error = LlmError;

    fn complete(&self, system_prompt: &str, user_prompt: &str) -> std::result::Result<String, Self::Error> {
        match self {
            Backend::OpenAi(provider) => provider.complete(system_prompt, user_prompt),
            Backend::Ollama(provider) => provider.complete(system_prompt, user_prompt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_openai_requires_key() {
        let config = ProviderConfig::default();
        let result = Backend::from_config(&config, None);
        assert!(matches!(result, Err(CliError::Llm(LlmError::Config(_)))));

        let result = Backend::from_config(&config, Some("  "));
        assert!(result.is_err());
    }

    #[test]
    fn test_openai_backend() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAi,
            model: Some("gpt-4o-mini".to_string()),
            endpoint: Some("http://localhost:8000/v1".to_string()),
        };
        let backend = Backend::from_config(&config, Some("sk-test")).unwrap();
        assert_eq!(backend.model(), "gpt-4o-mini");
        match backend {
            Backend::OpenAi(provider) => assert_eq!(provider.base_url(), "http://localhost:8000/v1"),
            other => panic!("expected OpenAI backend, got {:?}", other),
        }
    }

    #[test]
    fn test_ollama_backend_needs_no_key() {
        let config = ProviderConfig {
            kind: ProviderKind::Ollama,
            model: None,
            endpoint: None,
        };
        let backend = Backend::from_config(&config, None).unwrap();
        assert_eq!(backend.model(), crate::config::DEFAULT_OLLAMA_MODEL);
        assert!(matches!(backend, Backend::Ollama(_)));
    }
}
