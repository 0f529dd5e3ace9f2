// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI embeddings adapter.

use async_trait::async_trait;
use memoir_config::model::OpenAiConfig;
use memoir_core::traits::{EmbeddingAdapter, PluginAdapter};
use memoir_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use memoir_core::{Capability, MemoirError};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::EmbeddingRequest;

pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &OpenAiConfig) -> Result<Self, MemoirError> {
        let client = crate::client_from_config(config)?;
        info!(model = config.embedding_model, "OpenAI embedder initialized");
        Ok(Self::with_client(client, config.embedding_model.clone()))
    }

    pub fn with_client(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoirError> {
        Ok(crate::model_health(&self.client, &self.model, Capability::Embedding).await)
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MemoirError> {
        let expected = input.texts.len();
        if expected == 0 {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let mut response = self.client.embeddings(&request).await?;

        if response.data.len() != expected {
            return Err(MemoirError::provider(
                Capability::Embedding,
                format!(
                    "expected {expected} embeddings, received {}",
                    response.data.len()
                ),
            ));
        }

        // The API tags each vector with its input index; do not rely on array order.
        response.data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        let dimensions = embeddings.first().map_or(0, Vec::len);
        debug!(count = embeddings.len(), dimensions, "embeddings received");

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer) -> OpenAiEmbedder {
        let client = OpenAiClient::new("sk-test", None)
            .unwrap()
            .with_base_url(server.uri());
        OpenAiEmbedder::with_client(client, "text-embedding-ada-002".into())
    }

    #[tokio::test]
    async fn health_check_flags_unknown_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/text-embedding-ada-002"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "The model does not exist", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let status = embedder(&server).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(ref r) if r.contains("does not exist")));
    }

    #[tokio::test]
    async fn returns_vectors_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_json(serde_json::json!({
                "model": "text-embedding-ada-002",
                "input": ["first", "second"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0, 0.0]},
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0, 0.0]}
                ],
                "model": "text-embedding-ada-002"
            })))
            .mount(&server)
            .await;

        let out = embedder(&server)
            .embed(EmbeddingInput {
                texts: vec!["first".into(), "second".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.dimensions, 3);
        assert_eq!(out.embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(out.embeddings[1], vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn embed_one_unwraps_single_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.5, 0.5]}]
            })))
            .mount(&server)
            .await;

        let v = embedder(&server).embed_one("hello").await.unwrap();
        assert_eq!(v, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
            )
            .mount(&server)
            .await;

        let err = embedder(&server).embed_one("hello").await.unwrap_err();
        assert!(matches!(
            err,
            MemoirError::Provider {
                capability: Capability::Embedding,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let out = embedder(&server)
            .embed(EmbeddingInput { texts: vec![] })
            .await
            .unwrap();
        assert!(out.embeddings.is_empty());
    }
}
