// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Condenses the conversation log into a single note.

use std::sync::Arc;

use memoir_core::types::ProviderRequest;
use memoir_core::{ConversationTurn, MemoirError, ProviderAdapter};
use tracing::debug;

const SUMMARY_INSTRUCTION: &str = "Summarize the discussion above in a form suitable for saving \
to a notes page. Focus on the questions and answers, and present each one as \
[Question] → [Answer].";

/// Turn contents one per line, followed by the summary instruction.
pub fn summary_prompt(history: &[ConversationTurn]) -> String {
    let mut prompt = String::new();
    for turn in history {
        prompt.push_str(turn.content());
        prompt.push('\n');
    }
    prompt.push_str(SUMMARY_INSTRUCTION);
    prompt
}

pub struct Summarizer {
    provider: Arc<dyn ProviderAdapter>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// One generation call; the answer is returned as is.
    pub async fn summarize(&self, history: &[ConversationTurn]) -> Result<String, MemoirError> {
        let prompt = summary_prompt(history);
        debug!(turns = history.len(), prompt_len = prompt.len(), "summarizing history");
        let response = self.provider.complete(ProviderRequest::new(prompt)).await?;
        Ok(response.content)
    }
}
