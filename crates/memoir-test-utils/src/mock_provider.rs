// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted replies and
//! records every prompt it receives.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use memoir_core::traits::{PluginAdapter, ProviderAdapter};
use memoir_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use memoir_core::{Capability, MemoirError};

const DEFAULT_RESPONSE: &str = "mock response";
const MOCK_MODEL: &str = "mock-model";

/// One scripted outcome of a `complete` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Fail with a generation error carrying this message.
    Fail(String),
    /// Never answer. Use with a timeout.
    Hang,
}

/// A mock generation adapter that returns scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a mock provider pre-loaded with text responses.
    pub fn with_responses<S: Into<String>>(responses: Vec<S>) -> Self {
        Self::with_replies(
            responses
                .into_iter()
                .map(|r| MockReply::Text(r.into()))
                .collect(),
        )
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a text response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.add_reply(MockReply::Text(text.into())).await;
    }

    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every prompt received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(DEFAULT_RESPONSE.to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoirError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MemoirError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(request.prompt.clone());

        match self.next_reply().await {
            MockReply::Text(content) => Ok(ProviderResponse {
                content,
                model: request.model.unwrap_or_else(|| MOCK_MODEL.to_string()),
                usage: Some(TokenUsage {
                    input_tokens: 10,
                    output_tokens: 20,
                }),
            }),
            MockReply::Fail(message) => Err(MemoirError::provider(Capability::Generation, message)),
            MockReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(MemoirError::provider(Capability::Generation, "mock hang elapsed"))
            }
        }
    }
}
