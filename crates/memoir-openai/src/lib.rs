// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapters for Memoir.
//!
//! This crate implements [`ProviderAdapter`] over the chat completions API
//! and [`EmbeddingAdapter`](memoir_core::EmbeddingAdapter) over the
//! embeddings API. Both share one [`OpenAiClient`].

pub mod client;
pub mod embeddings;
pub mod types;

use async_trait::async_trait;
use memoir_config::model::OpenAiConfig;
use memoir_core::traits::{PluginAdapter, ProviderAdapter};
use memoir_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use memoir_core::{Capability, MemoirError};
use tracing::{debug, info};

pub use crate::client::OpenAiClient;
pub use crate::embeddings::OpenAiEmbedder;
use crate::types::{ChatMessage, ChatRequest};

/// Build a client from the `[openai]` config section.
///
/// The API key is required; validation normally guarantees it is present.
pub fn client_from_config(config: &OpenAiConfig) -> Result<OpenAiClient, MemoirError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| MemoirError::ConfigMissing {
            key: "openai.api_key".to_string(),
        })?;
    let client = OpenAiClient::new(api_key, config.organization.as_deref())?
        .with_base_url(config.base_url.clone());
    Ok(client)
}

/// Health of a configured model: reachable with this key, and known to the API.
pub(crate) async fn model_health(
    client: &OpenAiClient,
    model: &str,
    capability: Capability,
) -> HealthStatus {
    match client.retrieve_model(model, capability).await {
        Ok(found) if found.id == model => HealthStatus::Healthy,
        Ok(found) => HealthStatus::Degraded(format!(
            "requested model {model}, API answered with {}",
            found.id
        )),
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    }
}

/// OpenAI chat completion provider implementing [`ProviderAdapter`].
///
/// Each request is sent as a single user message; the first choice is returned.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Result<Self, MemoirError> {
        let client = client_from_config(config)?;
        info!(model = config.chat_model, "OpenAI chat provider initialized");
        Ok(Self::with_client(client, config.chat_model.clone(), config.max_tokens))
    }

    /// Creates a provider over an existing client.
    pub fn with_client(client: OpenAiClient, model: String, max_tokens: Option<u32>) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }

    fn to_chat_request(&self, request: ProviderRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(request.prompt),
            }],
            max_tokens: request.max_tokens.or(self.max_tokens),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-chat"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoirError> {
        Ok(model_health(&self.client, &self.model, Capability::Generation).await)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MemoirError> {
        let api_request = self.to_chat_request(request);
        let response = self.client.chat(&api_request).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            MemoirError::provider(Capability::Generation, "response contained no choices")
        })?;
        debug!(finish_reason = ?choice.finish_reason, "chat completion received");

        Ok(ProviderResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        let client = OpenAiClient::new("sk-test", None)
            .unwrap()
            .with_base_url(server.uri());
        OpenAiProvider::with_client(client, "gpt-3.5-turbo".into(), Some(512))
    }

    #[test]
    fn request_uses_defaults_and_single_user_message() {
        let client = OpenAiClient::new("sk", None).unwrap();
        let provider = OpenAiProvider::with_client(client, "gpt-3.5-turbo".into(), Some(512));

        let req = provider.to_chat_request(ProviderRequest::new("What is X?"));
        assert_eq!(req.model, "gpt-3.5-turbo");
        assert_eq!(req.max_tokens, Some(512));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.messages[0].content.as_deref(), Some("What is X?"));

        let mut overridden = ProviderRequest::new("p");
        overridden.model = Some("gpt-4o".into());
        overridden.max_tokens = Some(3);
        let req = provider.to_chat_request(overridden);
        assert_eq!(req.model, "gpt-4o");
        assert_eq!(req.max_tokens, Some(3));
    }

    #[tokio::test]
    async fn health_check_looks_up_chat_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/gpt-3.5-turbo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "gpt-3.5-turbo", "object": "model", "owned_by": "openai"
            })))
            .mount(&server)
            .await;

        let status = provider(&server).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_reports_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/gpt-3.5-turbo"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        match provider(&server).health_check().await.unwrap() {
            HealthStatus::Unhealthy(reason) => {
                assert!(reason.contains("Incorrect API key"), "got: {reason}")
            }
            other => panic!("expected Unhealthy, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "What is X?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-3.5-turbo-0125",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "X is Y."}, "finish_reason": "stop"},
                    {"index": 1, "message": {"role": "assistant", "content": "ignored"}, "finish_reason": "stop"}
                ],
                "usage": {"prompt_tokens": 4, "completion_tokens": 3}
            })))
            .mount(&server)
            .await;

        let resp = provider(&server)
            .complete(ProviderRequest::new("What is X?"))
            .await
            .unwrap();
        assert_eq!(resp.content, "X is Y.");
        assert_eq!(resp.model, "gpt-3.5-turbo-0125");
        assert_eq!(resp.usage.unwrap().output_tokens, 3);
    }

    #[tokio::test]
    async fn empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"model": "m", "choices": []})),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(ProviderRequest::new("p"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn missing_api_key_is_config_missing() {
        let err = client_from_config(&OpenAiConfig::default()).unwrap_err();
        assert!(matches!(err, MemoirError::ConfigMissing { ref key } if key == "openai.api_key"));
    }

    #[test]
    fn config_base_url_is_used() {
        let config = OpenAiConfig {
            api_key: Some("sk".into()),
            base_url: "http://localhost:8080/v1".into(),
            ..OpenAiConfig::default()
        };
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }
}
