// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock publish adapter that records what it was asked to publish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use memoir_core::traits::{PluginAdapter, PublishAdapter};
use memoir_core::types::{AdapterType, HealthStatus, PublishReceipt, PublishRequest};
use memoir_core::{Capability, MemoirError};

pub struct MockPublisher {
    published: Arc<Mutex<Vec<PublishRequest>>>,
    failing: AtomicBool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// While set, every `publish` call fails and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successfully published requests, in order.
    pub async fn published(&self) -> Vec<PublishRequest> {
        self.published.lock().await.clone()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPublisher {
    fn name(&self) -> &str {
        "mock-publisher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publish
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoirError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("mock publisher set to fail".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PublishAdapter for MockPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, MemoirError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MemoirError::provider(
                Capability::Publish,
                "mock publisher set to fail",
            ));
        }
        let mut published = self.published.lock().await;
        published.push(request);
        Ok(PublishReceipt {
            block_id: Some(format!("mock-block-{}", published.len())),
        })
    }
}
