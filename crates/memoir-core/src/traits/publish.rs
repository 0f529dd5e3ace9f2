// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish capability: appends a block of text to a remote document.

use async_trait::async_trait;

use crate::error::MemoirError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{PublishReceipt, PublishRequest};

/// Adapter for an external document store.
#[async_trait]
pub trait PublishAdapter: PluginAdapter {
    /// Appends `request.text` as a new list item on `request.target_id`.
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, MemoirError>;
}
