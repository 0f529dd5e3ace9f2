// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notion block API request/response types.

use serde::{Deserialize, Serialize};

/// Longest text Notion accepts in a single rich-text run.
pub const MAX_RICH_TEXT_CHARS: usize = 2000;

/// Body of `PATCH /blocks/{id}/children`.
#[derive(Debug, Clone, Serialize)]
pub struct AppendChildrenRequest {
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub object: &'static str,
    #[serde(rename = "type")]
    pub block_type: &'static str,
    pub bulleted_list_item: RichTextBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct RichTextBody {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: TextContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    pub content: String,
}

impl Block {
    /// One bulleted list item carrying `text`, split into runs Notion accepts.
    pub fn bulleted_list_item(text: &str) -> Self {
        let rich_text = split_runs(text, MAX_RICH_TEXT_CHARS)
            .into_iter()
            .map(|content| RichText {
                text_type: "text",
                text: TextContent { content },
            })
            .collect();
        Self {
            object: "block",
            block_type: "bulleted_list_item",
            bulleted_list_item: RichTextBody { rich_text },
        }
    }
}

/// Split `text` into consecutive pieces of at most `max_chars` characters.
///
/// Empty text yields a single empty run.
pub fn split_runs(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || max_chars == 0 {
        return vec![text.to_string()];
    }
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Response of a successful append.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendChildrenResponse {
    #[serde(default)]
    pub results: Vec<BlockRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockRef {
    pub id: String,
}

/// Error envelope returned on non-2xx responses.
/// Response body for `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_run() {
        assert_eq!(split_runs("hello", 2000), vec!["hello"]);
    }

    #[test]
    fn empty_text_is_one_empty_run() {
        assert_eq!(split_runs("", 2000), vec![""]);
    }

    #[test]
    fn long_text_splits_on_char_boundaries() {
        let text = "あ".repeat(4500);
        let runs = split_runs(&text, 2000);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].chars().count(), 2000);
        assert_eq!(runs[1].chars().count(), 2000);
        assert_eq!(runs[2].chars().count(), 500);
        assert_eq!(runs.concat(), text);
    }

    #[test]
    fn block_json_shape() {
        let block = Block::bulleted_list_item("[Q] a → [A] b");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "object": "block",
                "type": "bulleted_list_item",
                "bulleted_list_item": {
                    "rich_text": [{"type": "text", "text": {"content": "[Q] a → [A] b"}}]
                }
            })
        );
    }
}
