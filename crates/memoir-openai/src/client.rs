// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI REST API.
//!
//! Provides [`OpenAiClient`] which handles authentication headers, JSON
//! request/response mapping, and transient error retry.

use std::time::Duration;

use memoir_core::{Capability, MemoirError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, Model,
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP client for OpenAI API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    max_retries: u32,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new OpenAI API client.
    ///
    /// # Arguments
    /// * `api_key` - Secret key sent as a bearer token
    /// * `organization` - Optional organization id sent as `OpenAI-Organization`
    pub fn new(api_key: &str, organization: Option<&str>) -> Result<Self, MemoirError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| MemoirError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Some(org) = organization {
            headers.insert(
                "OpenAI-Organization",
                HeaderValue::from_str(org).map_err(|e| {
                    MemoirError::Config(format!("invalid organization header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MemoirError::Provider {
                capability: Capability::Generation,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            max_retries: 1,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the API root (proxies, compatible servers, wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /chat/completions`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, MemoirError> {
        self.send_json(Method::POST, "chat/completions", Some(request), Capability::Generation)
            .await
    }

    /// `POST /embeddings`.
    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, MemoirError> {
        self.send_json(Method::POST, "embeddings", Some(request), Capability::Embedding)
            .await
    }

    /// `GET /models/{model}`. Costs no tokens, so health checks use it.
    pub async fn retrieve_model(
        &self,
        model: &str,
        capability: Capability,
    ) -> Result<Model, MemoirError> {
        self.send_json::<(), _>(Method::GET, &format!("models/{model}"), None, capability)
            .await
    }

    /// Sends a request with an optional JSON body and decodes a JSON response.
    ///
    /// On transient errors (429, 500, 502, 503), retries once after a 1-second delay.
    async fn send_json<Req, Resp>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Req>,
        capability: Capability,
    ) -> Result<Resp, MemoirError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, %capability, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let mut builder = self.client.request(method.clone(), &url);
            if let Some(body) = body {
                builder = builder.json(body);
            }
            let response = builder
                .send()
                .await
                .map_err(|e| MemoirError::Provider {
                    capability,
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, %capability, "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| MemoirError::Provider {
                    capability,
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| MemoirError::Provider {
                    capability,
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let text = response.text().await.unwrap_or_default();

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(MemoirError::provider(
                    capability,
                    format!("API returned {status}: {text}"),
                ));
                continue;
            }

            // Non-transient error or exhausted retries.
            return Err(MemoirError::provider(capability, error_message(status, &text)));
        }

        Err(last_error.unwrap_or_else(|| {
            MemoirError::provider(capability, "request failed after retries")
        }))
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "OpenAI API error ({}, {}): {}",
            status,
            api_err.error.type_.as_deref().unwrap_or("unknown"),
            api_err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
