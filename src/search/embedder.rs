//! Core `Embedder` trait and the `ApiEmbedder` HTTP implementation.
//!
//! `ApiEmbedder` calls any OpenAI-compatible `/v1/embeddings` endpoint
//! (Ollama, OpenAI, LM Studio, vLLM …). All connection details come from
//! [`EmbedderConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::EmbedderConfig;

// ---------------------------------------------------------------------------
// EmbedError
// ---------------------------------------------------------------------------

/// Errors that can occur while turning text into a vector.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("embedding request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse embedding response: {0}")]
    Parse(String),

    #[error("embedding response contained no vector")]
    EmptyResponse,

    /// No embedding source can handle this input.
    #[error("no embedding available for query: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for EmbedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EmbedError::Timeout
        } else {
            EmbedError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Embedder trait
// ---------------------------------------------------------------------------

/// Async text → vector interface shared by all embedding sources.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

// ---------------------------------------------------------------------------
// ApiEmbedder
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct ApiEmbedder {
    client: reqwest::Client,
    config: EmbedderConfig,
}

impl ApiEmbedder {
    /// Build an `ApiEmbedder` with the configured per-request timeout.
    pub fn from_config(config: &EmbedderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "input": text,
        });

        let mut req = self.client.post(self.endpoint()).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EmbedError::Parse(e.to_string()))?;

        parse_embedding(&json)
    }
}

/// Extract `data[0].embedding` from an embeddings response.
fn parse_embedding(json: &serde_json::Value) -> Result<Vec<f32>, EmbedError> {
    let values = json["data"][0]["embedding"]
        .as_array()
        .ok_or(EmbedError::EmptyResponse)?;

    let vector = values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbedError::Parse(format!("non-numeric component {v}")))
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if vector.is_empty() {
        return Err(EmbedError::EmptyResponse);
    }
    Ok(vector)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> EmbedderConfig {
        EmbedderConfig {
            api_key: api_key.map(|s| s.to_string()),
            base_url: "http://localhost:11434/".into(),
            ..EmbedderConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _ = ApiEmbedder::from_config(&make_config(None));
        let _ = ApiEmbedder::from_config(&make_config(Some("")));
        let _ = ApiEmbedder::from_config(&make_config(Some("sk-test")));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let embedder = ApiEmbedder::from_config(&make_config(None));
        assert_eq!(embedder.endpoint(), "http://localhost:11434/v1/embeddings");
    }

    #[test]
    fn embedder_is_object_safe() {
        let embedder: Box<dyn Embedder> = Box::new(ApiEmbedder::from_config(&make_config(None)));
        drop(embedder);
    }

    #[test]
    fn parses_openai_shape() {
        let json = serde_json::json!({
            "object": "list",
            "data": [ { "object": "embedding", "index": 0, "embedding": [0.5, -0.25, 1] } ],
            "model": "all-minilm"
        });
        assert_eq!(parse_embedding(&json).unwrap(), vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn missing_data_is_empty_response() {
        let json = serde_json::json!({ "error": "model not found" });
        assert!(matches!(
            parse_embedding(&json).unwrap_err(),
            EmbedError::EmptyResponse
        ));
    }

    #[test]
    fn non_numeric_component_is_parse_error() {
        let json = serde_json::json!({ "data": [ { "embedding": [0.1, "x"] } ] });
        assert!(matches!(
            parse_embedding(&json).unwrap_err(),
            EmbedError::Parse(_)
        ));
    }
}
