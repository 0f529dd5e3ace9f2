// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-augmented reply generation.

use std::fmt::Write;
use std::sync::Arc;

use memoir_core::types::ProviderRequest;
use memoir_core::{ConversationTurn, MemoirError, ProviderAdapter};
use memoir_memory::ScoredEntry;
use tracing::debug;

/// Build the reply prompt from prior turns, retrieved notes and the new input.
///
/// Seed entries are left out of the retrieved section.
pub fn reply_prompt(
    user_input: &str,
    history: &[ConversationTurn],
    retrieved: &[ScoredEntry],
) -> String {
    let mut prompt = String::from("Conversation so far:\n");
    for turn in history {
        let _ = writeln!(prompt, "{}: {}", turn.role(), turn.content());
    }

    prompt.push_str("\nRelated notes:\n");
    for hit in retrieved.iter().filter(|h| !h.entry.is_placeholder()) {
        let _ = writeln!(prompt, "{}", hit.entry.text);
    }

    let _ = write!(prompt, "\nuser: {user_input}");
    prompt
}

pub struct Responder {
    provider: Arc<dyn ProviderAdapter>,
    max_tokens: Option<u32>,
}

impl Responder {
    pub fn new(provider: Arc<dyn ProviderAdapter>, max_tokens: Option<u32>) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    pub async fn respond(
        &self,
        user_input: &str,
        history: &[ConversationTurn],
        retrieved: &[ScoredEntry],
    ) -> Result<String, MemoirError> {
        let mut request = ProviderRequest::new(reply_prompt(user_input, history, retrieved));
        request.max_tokens = self.max_tokens;
        debug!(
            history_turns = history.len(),
            retrieved = retrieved.len(),
            "generating reply"
        );
        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_memory::KnowledgeEntry;
    use memoir_test_utils::MockProvider;

    fn hit(entry: KnowledgeEntry) -> ScoredEntry {
        ScoredEntry { entry, score: 0.5 }
    }

    #[test]
    fn prompt_sections_in_order() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
        ];
        let retrieved = vec![hit(KnowledgeEntry::new("[Q] What is X? → [A] Y", vec![]))];
        let prompt = reply_prompt("What is X again?", &history, &retrieved);

        let history_at = prompt.find("user: hi\nassistant: hello").unwrap();
        let notes_at = prompt.find("[Q] What is X? → [A] Y").unwrap();
        let input_at = prompt.rfind("user: What is X again?").unwrap();
        assert!(history_at < notes_at && notes_at < input_at);
    }

    #[test]
    fn seed_entry_is_not_shown() {
        let retrieved = vec![hit(KnowledgeEntry::placeholder(vec![1.0]))];
        let prompt = reply_prompt("q", &[], &retrieved);
        assert!(!prompt.contains(memoir_memory::PLACEHOLDER_TEXT));
    }

    #[tokio::test]
    async fn reply_is_verbatim() {
        let mock = Arc::new(MockProvider::with_responses(vec!["X is Y.\n"]));
        let responder = Responder::new(mock.clone(), Some(256));
        let reply = responder.respond("What is X?", &[], &[]).await.unwrap();
        assert_eq!(reply, "X is Y.\n");
        assert!(mock.prompts().await[0].ends_with("user: What is X?"));
    }
}
