// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MemoirError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating vector embeddings from text.
///
/// Implementations must be deterministic for a given model: the same text
/// yields the same vector, which is what lets stored entries be compared
/// against freshly embedded queries.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates embeddings for the given input, preserving input order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MemoirError>;

    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoirError> {
        let output = self
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output.embeddings.into_iter().next().ok_or_else(|| {
            MemoirError::provider(
                crate::types::Capability::Embedding,
                "embedding returned no results",
            )
        })
    }
}
