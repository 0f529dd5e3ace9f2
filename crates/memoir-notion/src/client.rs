// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Notion block API.

use std::time::Duration;

use memoir_core::{Capability, MemoirError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{AppendChildrenRequest, AppendChildrenResponse, ApiErrorResponse, User};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// HTTP client for Notion API communication.
///
/// Sends the integration token and the pinned `Notion-Version` on every
/// request, and retries once on transient errors (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    max_retries: u32,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: &str, api_version: &str) -> Result<Self, MemoirError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| MemoirError::Config(format!("invalid Notion token header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "Notion-Version",
            HeaderValue::from_str(api_version).map_err(|e| {
                MemoirError::Config(format!("invalid Notion-Version header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| MemoirError::Provider {
                capability: Capability::Publish,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            max_retries: 1,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the API root (for testing with wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// `PATCH /blocks/{block_id}/children`.
    pub async fn append_children(
        &self,
        block_id: &str,
        request: &AppendChildrenRequest,
    ) -> Result<AppendChildrenResponse, MemoirError> {
        let text = self
            .send(Method::PATCH, &format!("blocks/{block_id}/children"), Some(request))
            .await?;
        // The block was created; an unreadable body only loses the block id.
        Ok(serde_json::from_str(&text).unwrap_or(AppendChildrenResponse {
            results: Vec::new(),
        }))
    }

    /// `GET /users/me`: the bot user behind the integration token.
    pub async fn me(&self) -> Result<User, MemoirError> {
        let text = self.send::<()>(Method::GET, "users/me", None).await?;
        serde_json::from_str(&text).map_err(|e| MemoirError::Provider {
            capability: Capability::Publish,
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a request and returns the body of a 2xx response.
    ///
    /// On transient errors (429, 500, 502, 503), retries once after a 1-second delay.
    async fn send<Req>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Req>,
    ) -> Result<String, MemoirError>
    where
        Req: Serialize + ?Sized,
    {
        let url = format!("{}/{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, %method, path, "retrying after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let mut builder = self.client.request(method.clone(), &url);
            if let Some(body) = body {
                builder = builder.json(body);
            }
            let response = builder.send().await.map_err(|e| MemoirError::Provider {
                capability: Capability::Publish,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, %method, path, "response received");

            let text = response.text().await.unwrap_or_default();
            if status.is_success() {
                return Ok(text);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(MemoirError::provider(
                    Capability::Publish,
                    format!("API returned {status}: {text}"),
                ));
                continue;
            }

            return Err(MemoirError::provider(
                Capability::Publish,
                error_message(status, &text),
            ));
        }

        Err(last_error.unwrap_or_else(|| {
            MemoirError::provider(Capability::Publish, "request failed after retries")
        }))
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "Notion API error ({}, {}): {}",
            status,
            api_err.code.as_deref().unwrap_or("unknown"),
            api_err.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
