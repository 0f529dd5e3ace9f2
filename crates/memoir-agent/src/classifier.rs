// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides whether a user turn asks to save the discussion.
//!
//! A cheap keyword pre-filter runs first so ordinary turns never reach the
//! model. Turns that mention the trigger token are put to the model with a
//! strict YES/NO contract.

use std::sync::Arc;

use memoir_core::types::ProviderRequest;
use memoir_core::{MemoirError, ProviderAdapter};
use tracing::debug;

const VERDICT_MAX_TOKENS: u32 = 3;

fn verdict_prompt(user_input: &str) -> String {
    format!(
        "You decide whether a user wants the discussion so far saved to their notes.\n\
         Answer with exactly one word, YES or NO, and nothing else.\n\n\
         User message: \"{user_input}\""
    )
}

/// Interpret a model answer. Only a bare `YES` counts as affirmative.
///
/// Whitespace, surrounding quotes and punctuation are ignored, and case does
/// not matter. Anything else is negative, including `YES, but...`.
pub fn parse_verdict(answer: &str) -> bool {
    answer
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .eq_ignore_ascii_case("YES")
}

pub struct IntentClassifier {
    provider: Arc<dyn ProviderAdapter>,
    trigger_token: String,
}

impl IntentClassifier {
    pub fn new(provider: Arc<dyn ProviderAdapter>, trigger_token: impl Into<String>) -> Self {
        Self {
            provider,
            trigger_token: trigger_token.into().to_lowercase(),
        }
    }

    /// True when the input mentions the trigger token, ignoring case.
    pub fn mentions_trigger(&self, user_input: &str) -> bool {
        user_input.to_lowercase().contains(&self.trigger_token)
    }

    /// Returns true when `user_input` is a request to persist the discussion.
    ///
    /// Makes no generation call when the trigger token is absent.
    pub async fn classify(&self, user_input: &str) -> Result<bool, MemoirError> {
        if !self.mentions_trigger(user_input) {
            return Ok(false);
        }

        let mut request = ProviderRequest::new(verdict_prompt(user_input));
        request.max_tokens = Some(VERDICT_MAX_TOKENS);
        let response = self.provider.complete(request).await?;
        let verdict = parse_verdict(&response.content);
        debug!(answer = %response.content.trim(), verdict, "save intent classified");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_test_utils::{MockProvider, MockReply};

    fn classifier(mock: &Arc<MockProvider>) -> IntentClassifier {
        IntentClassifier::new(mock.clone(), "save")
    }

    #[test]
    fn verdict_accepts_bare_yes_variants() {
        for answer in ["YES", "yes", " Yes.\n", "\"YES\"", "'yes'!", "**YES**"] {
            assert!(parse_verdict(answer), "{answer:?} should be affirmative");
        }
    }

    #[test]
    fn verdict_rejects_everything_else() {
        for answer in ["NO", "not yes", "YES, but only the last part", "yesterday", "", "Y E S"] {
            assert!(!parse_verdict(answer), "{answer:?} should be negative");
        }
    }

    #[tokio::test]
    async fn no_trigger_means_no_call() {
        let mock = Arc::new(MockProvider::with_responses(vec!["YES"]));
        let verdict = classifier(&mock).classify("What is X?").await.unwrap();
        assert!(!verdict);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn trigger_is_case_insensitive() {
        let mock = Arc::new(MockProvider::with_responses(vec!["YES"]));
        assert!(classifier(&mock).classify("Please SAVE this").await.unwrap());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn trigger_with_negative_answer_is_false() {
        let mock = Arc::new(MockProvider::with_responses(vec!["NO"]));
        assert!(!classifier(&mock).classify("how do I save a file in vim?").await.unwrap());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn prompt_quotes_the_input() {
        let mock = Arc::new(MockProvider::with_responses(vec!["YES"]));
        classifier(&mock).classify("save our notes").await.unwrap();
        let prompts = mock.prompts().await;
        assert!(prompts[0].contains("\"save our notes\""));
        assert!(prompts[0].contains("YES or NO"));
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let mock = Arc::new(MockProvider::with_replies(vec![MockReply::Fail("down".into())]));
        assert!(classifier(&mock).classify("save it").await.is_err());
    }

    #[tokio::test]
    async fn non_ascii_trigger_token() {
        let mock = Arc::new(MockProvider::with_responses(vec!["YES"]));
        let classifier = IntentClassifier::new(mock.clone(), "保存");
        assert!(classifier.classify("この議論を保存して").await.unwrap());
        assert!(!classifier.classify("hello").await.unwrap());
        assert_eq!(mock.call_count(), 1);
    }
}
