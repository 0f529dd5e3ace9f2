// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bounded wrappers around the capability adapters.
//!
//! Each wrapper implements the same trait as the adapter it wraps, so the
//! stores and dialogue components never see an unbounded call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memoir_core::traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, PublishAdapter};
use memoir_core::types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, ProviderRequest,
    ProviderResponse, PublishReceipt, PublishRequest,
};
use memoir_core::{Capability, MemoirError};
use tracing::warn;

/// Run `fut`, failing with [`MemoirError::Timeout`] after `duration`.
pub async fn bounded<T, F>(
    capability: Capability,
    duration: Duration,
    fut: F,
) -> Result<T, MemoirError>
where
    F: Future<Output = Result<T, MemoirError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%capability, ?duration, "capability call timed out");
            Err(MemoirError::Timeout {
                capability,
                duration,
            })
        }
    }
}

macro_rules! delegate_plugin_adapter {
    ($wrapper:ty, $capability:expr) => {
        #[async_trait]
        impl PluginAdapter for $wrapper {
            fn name(&self) -> &str {
                self.inner.name()
            }

            fn version(&self) -> semver::Version {
                self.inner.version()
            }

            fn adapter_type(&self) -> AdapterType {
                self.inner.adapter_type()
            }

            async fn health_check(&self) -> Result<HealthStatus, MemoirError> {
                bounded($capability, self.limit, self.inner.health_check()).await
            }
        }
    };
}

/// Generation adapter with a per-call time limit.
pub struct TimedProvider {
    inner: Arc<dyn ProviderAdapter>,
    limit: Duration,
}

impl TimedProvider {
    pub fn new(inner: Arc<dyn ProviderAdapter>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

delegate_plugin_adapter!(TimedProvider, Capability::Generation);

#[async_trait]
impl ProviderAdapter for TimedProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MemoirError> {
        bounded(Capability::Generation, self.limit, self.inner.complete(request)).await
    }
}

/// Embedding adapter with a per-call time limit.
pub struct TimedEmbedder {
    inner: Arc<dyn EmbeddingAdapter>,
    limit: Duration,
}

impl TimedEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingAdapter>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

delegate_plugin_adapter!(TimedEmbedder, Capability::Embedding);

#[async_trait]
impl EmbeddingAdapter for TimedEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MemoirError> {
        bounded(Capability::Embedding, self.limit, self.inner.embed(input)).await
    }
}

/// Publish adapter with a per-call time limit.
pub struct TimedPublisher {
    inner: Arc<dyn PublishAdapter>,
    limit: Duration,
}

impl TimedPublisher {
    pub fn new(inner: Arc<dyn PublishAdapter>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

delegate_plugin_adapter!(TimedPublisher, Capability::Publish);

#[async_trait]
impl PublishAdapter for TimedPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, MemoirError> {
        bounded(Capability::Publish, self.limit, self.inner.publish(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_test_utils::{MockEmbedder, MockProvider, MockReply};

    #[tokio::test(start_paused = true)]
    async fn hanging_generation_times_out() {
        let mock = Arc::new(MockProvider::with_replies(vec![MockReply::Hang]));
        let timed = TimedProvider::new(mock, Duration::from_secs(60));

        let err = timed.complete(ProviderRequest::new("p")).await.unwrap_err();
        match err {
            MemoirError::Timeout {
                capability,
                duration,
            } => {
                assert_eq!(capability, Capability::Generation);
                assert_eq!(duration, Duration::from_secs(60));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let mock = Arc::new(MockProvider::with_responses(vec!["ok"]));
        let timed = TimedProvider::new(mock, Duration::from_secs(5));
        assert_eq!(timed.complete(ProviderRequest::new("p")).await.unwrap().content, "ok");
        assert_eq!(timed.name(), "mock-provider");
    }

    #[tokio::test]
    async fn errors_are_not_rewrapped() {
        let mock = Arc::new(MockEmbedder::new());
        mock.set_failing(true);
        let timed = TimedEmbedder::new(mock, Duration::from_secs(5));
        let err = timed.embed_one("x").await.unwrap_err();
        assert!(matches!(
            err,
            MemoirError::Provider {
                capability: Capability::Embedding,
                ..
            }
        ));
    }
}
