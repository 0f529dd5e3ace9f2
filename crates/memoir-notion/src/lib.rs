// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notion publish adapter for Memoir.
//!
//! Implements [`PublishAdapter`] by appending one bulleted list item to a
//! page through the block children API.

pub mod client;
pub mod types;

use async_trait::async_trait;
use memoir_config::model::NotionConfig;
use memoir_core::traits::{PluginAdapter, PublishAdapter};
use memoir_core::types::{AdapterType, HealthStatus, PublishReceipt, PublishRequest};
use memoir_core::MemoirError;
use tracing::{debug, info};

pub use crate::client::NotionClient;
use crate::types::{AppendChildrenRequest, Block};

pub struct NotionPublisher {
    client: NotionClient,
}

impl NotionPublisher {
    pub fn new(config: &NotionConfig) -> Result<Self, MemoirError> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MemoirError::ConfigMissing {
                key: "notion.token".to_string(),
            })?;
        let client =
            NotionClient::new(token, &config.api_version)?.with_base_url(config.base_url.clone());
        info!(api_version = config.api_version, "Notion publisher initialized");
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: NotionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for NotionPublisher {
    fn name(&self) -> &str {
        "notion"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publish
    }

    /// Checks that the integration token is accepted.
    async fn health_check(&self) -> Result<HealthStatus, MemoirError> {
        Ok(match self.client.me().await {
            Ok(user) => {
                debug!(bot_id = %user.id, bot_name = ?user.name, "Notion token accepted");
                HealthStatus::Healthy
            }
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[async_trait]
impl PublishAdapter for NotionPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, MemoirError> {
        let body = AppendChildrenRequest {
            children: vec![Block::bulleted_list_item(&request.text)],
        };
        let response = self
            .client
            .append_children(&request.target_id, &body)
            .await?;
        let block_id = response.results.into_iter().next().map(|b| b.id);
        info!(page_id = %request.target_id, block_id = ?block_id, "block appended");
        Ok(PublishReceipt { block_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::Capability;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> NotionPublisher {
        let client = NotionClient::new("secret_test", "2022-06-28")
            .unwrap()
            .with_base_url(server.uri());
        NotionPublisher::with_client(client)
    }

    fn request(text: &str) -> PublishRequest {
        PublishRequest {
            target_id: "page-abc".into(),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn health_check_verifies_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("authorization", "Bearer secret_test"))
            .and(header("notion-version", "2022-06-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "user", "id": "bot-1", "type": "bot", "name": "Memoir"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let status = publisher(&server).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_reports_invalid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "object": "error", "status": 401, "code": "unauthorized",
                "message": "API token is invalid."
            })))
            .mount(&server)
            .await;

        match publisher(&server).health_check().await.unwrap() {
            HealthStatus::Unhealthy(reason) => {
                assert!(reason.contains("unauthorized"), "got: {reason}");
            }
            other => panic!("expected Unhealthy, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn appends_one_bulleted_item_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/blocks/page-abc/children"))
            .and(header("authorization", "Bearer secret_test"))
            .and(header("notion-version", "2022-06-28"))
            .and(body_json(serde_json::json!({
                "children": [{
                    "object": "block",
                    "type": "bulleted_list_item",
                    "bulleted_list_item": {
                        "rich_text": [{"type": "text", "text": {"content": "[Q] a → [A] b"}}]
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "results": [{"object": "block", "id": "block-1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = publisher(&server).publish(request("[Q] a → [A] b")).await.unwrap();
        assert_eq!(receipt.block_id.as_deref(), Some("block-1"));
    }

    #[tokio::test]
    async fn long_text_is_split_into_runs() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/blocks/page-abc/children"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .mount(&server)
            .await;

        let text = "x".repeat(4001);
        publisher(&server).publish(request(&text)).await.unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let runs = body["children"][0]["bulleted_list_item"]["rich_text"]
            .as_array()
            .unwrap();
        assert_eq!(body["children"].as_array().unwrap().len(), 1);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[2]["text"]["content"], "x");
    }

    #[tokio::test]
    async fn not_found_maps_to_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find block with ID: page-abc."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = publisher(&server).publish(request("x")).await.unwrap_err();
        assert!(matches!(
            err,
            MemoirError::Provider {
                capability: Capability::Publish,
                ..
            }
        ));
        assert!(err.to_string().contains("object_not_found"), "got: {err}");
    }

    #[tokio::test]
    async fn retries_once_on_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "code": "rate_limited",
                "message": "slow down"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .mount(&server)
            .await;

        let receipt = publisher(&server).publish(request("x")).await.unwrap();
        assert!(receipt.block_id.is_none());
    }

    #[test]
    fn missing_token_is_config_missing() {
        let err = NotionPublisher::new(&NotionConfig::default()).err().unwrap();
        assert!(matches!(err, MemoirError::ConfigMissing { ref key } if key == "notion.token"));
    }
}
