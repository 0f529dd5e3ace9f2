// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Memoir.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Memoir configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values; credentials and the
/// target page are checked by [`crate::validation::validate_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoirConfig {
    /// Process-level settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI generation and embedding settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Notion publish settings.
    #[serde(default)]
    pub notion: NotionConfig,

    /// Durable file locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dialogue engine behavior.
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Also read from `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Organization id sent as `OpenAI-Organization`. Also read from `OPENAI_ORGANIZATION_ID`.
    #[serde(default)]
    pub organization: Option<String>,

    /// Model used for classification, summaries, and replies.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for knowledge embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// API base URL, without trailing slash.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate per response. `None` leaves it to the API.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            organization: None,
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            base_url: default_openai_base_url(),
            max_tokens: None,
        }
    }
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Notion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotionConfig {
    /// Integration token. Also read from `NOTION_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,

    /// Page that summaries are appended to. Also read from `PAGE_ID`.
    #[serde(default)]
    pub page_id: Option<String>,

    /// `Notion-Version` header value.
    #[serde(default = "default_notion_version")]
    pub api_version: String,

    /// API base URL, without trailing slash.
    #[serde(default = "default_notion_base_url")]
    pub base_url: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            page_id: None,
            api_version: default_notion_version(),
            base_url: default_notion_base_url(),
        }
    }
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

/// Durable state locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// File holding the dialogue history.
    #[serde(default = "default_history_path")]
    pub history_path: String,

    /// Directory holding the knowledge index bundle.
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            knowledge_dir: default_knowledge_dir(),
        }
    }
}

fn default_history_path() -> String {
    "memory.json".to_string()
}

fn default_knowledge_dir() -> String {
    "vectorstore_index".to_string()
}

/// Dialogue engine behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueConfig {
    /// Keyword whose presence makes a turn a candidate "save" request.
    #[serde(default = "default_trigger_token")]
    pub trigger_token: String,

    /// Knowledge entries retrieved per conversational turn.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Most recent turns included in reply prompts. 0 disables the bound.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Upper bound on any single capability call.
    #[serde(default = "default_capability_timeout_secs")]
    pub capability_timeout_secs: u64,

    /// Rank the seed entry alongside real entries instead of hiding it once
    /// real entries exist.
    #[serde(default)]
    pub include_placeholder: bool,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            trigger_token: default_trigger_token(),
            retrieval_k: default_retrieval_k(),
            history_window: default_history_window(),
            capability_timeout_secs: default_capability_timeout_secs(),
            include_placeholder: false,
        }
    }
}

fn default_trigger_token() -> String {
    "save".to_string()
}

fn default_retrieval_k() -> usize {
    2
}

fn default_history_window() -> usize {
    20
}

fn default_capability_timeout_secs() -> u64 {
    60
}
