// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session settings derived from the loaded configuration.

use std::path::PathBuf;
use std::time::Duration;

use memoir_config::MemoirConfig;
use memoir_core::MemoirError;
use memoir_memory::{PlaceholderPolicy, StorePaths};

/// Everything a [`Session`](crate::Session) needs from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Page that saved summaries are appended to.
    pub page_id: String,
    pub trigger_token: String,
    pub retrieval_k: usize,
    /// Prior turns shown to the responder. 0 shows all of them.
    pub history_window: usize,
    pub capability_timeout: Duration,
    pub placeholder_policy: PlaceholderPolicy,
    pub max_tokens: Option<u32>,
}

impl SessionSettings {
    pub fn from_config(config: &MemoirConfig) -> Result<Self, MemoirError> {
        let page_id = config
            .notion
            .page_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| MemoirError::ConfigMissing {
                key: "notion.page_id".to_string(),
            })?;

        Ok(Self {
            page_id,
            trigger_token: config.dialogue.trigger_token.clone(),
            retrieval_k: config.dialogue.retrieval_k,
            history_window: config.dialogue.history_window,
            capability_timeout: Duration::from_secs(config.dialogue.capability_timeout_secs),
            placeholder_policy: PlaceholderPolicy::from_include_flag(
                config.dialogue.include_placeholder,
            ),
            max_tokens: config.openai.max_tokens,
        })
    }

    /// Defaults suitable for tests: no timeout pressure, default dialogue knobs.
    pub fn for_page(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            trigger_token: "save".to_string(),
            retrieval_k: 2,
            history_window: 20,
            capability_timeout: Duration::from_secs(60),
            placeholder_policy: PlaceholderPolicy::default(),
            max_tokens: None,
        }
    }
}

/// On-disk locations of the two stores.
pub fn store_paths(config: &MemoirConfig) -> StorePaths {
    StorePaths {
        history_path: PathBuf::from(&config.storage.history_path),
        knowledge_dir: PathBuf::from(&config.storage.knowledge_dir),
    }
}
