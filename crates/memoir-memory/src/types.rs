// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge entry types and vector helpers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Identifier reserved for the seed entry.
pub const PLACEHOLDER_ID: &str = "placeholder";

/// Text of the seed entry that keeps the index non-empty.
pub const PLACEHOLDER_TEXT: &str =
    "Seed entry created when the knowledge index was initialized. It carries no knowledge.";

/// A stored fact: text plus the embedding derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl KnowledgeEntry {
    /// Creates an entry with a fresh id and the current time.
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            embedding,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates the seed entry from its embedding.
    pub fn placeholder(embedding: Vec<f32>) -> Self {
        Self {
            id: PLACEHOLDER_ID.to_string(),
            text: PLACEHOLDER_TEXT.to_string(),
            embedding,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True for the seed entry, which callers treat as noise.
    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }
}

/// An entry with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub score: f32,
}

/// Whether the seed entry competes with real entries in search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// Drop the seed entry from results once any real entry exists.
    /// A store holding only the seed entry still returns it.
    #[default]
    HideWhenRealEntries,
    /// Rank the seed entry like any other entry.
    Rank,
}

impl PlaceholderPolicy {
    pub fn from_include_flag(include_placeholder: bool) -> Self {
        if include_placeholder {
            PlaceholderPolicy::Rank
        } else {
            PlaceholderPolicy::HideWhenRealEntries
        }
    }
}

/// On-disk form of a [`KnowledgeEntry`]; the embedding is base64 of LE f32 bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub id: String,
    pub text: String,
    pub embedding: String,
    pub created_at: String,
}

impl From<&KnowledgeEntry> for StoredEntry {
    fn from(entry: &KnowledgeEntry) -> Self {
        Self {
            id: entry.id.clone(),
            text: entry.text.clone(),
            embedding: BASE64.encode(vec_to_blob(&entry.embedding)),
            created_at: entry.created_at.clone(),
        }
    }
}

impl StoredEntry {
    pub(crate) fn into_entry(self) -> Result<KnowledgeEntry, String> {
        let blob = BASE64
            .decode(self.embedding.as_bytes())
            .map_err(|e| format!("entry {}: invalid embedding encoding: {e}", self.id))?;
        if blob.len() % 4 != 0 {
            return Err(format!(
                "entry {}: embedding length {} is not a multiple of 4",
                self.id,
                blob.len()
            ));
        }
        Ok(KnowledgeEntry {
            id: self.id,
            text: self.text,
            embedding: blob_to_vec(&blob),
            created_at: self.created_at,
        })
    }
}

/// Convert f32 vector to little-endian bytes.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert little-endian bytes back to an f32 vector. Trailing bytes are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors of equal length.
///
/// Returns `None` for mismatched lengths. A zero vector has similarity 0
/// with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
