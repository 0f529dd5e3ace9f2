// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector knowledge store: saved facts searched by cosine similarity.
//!
//! The store lives in a directory holding a single `index.json`. It is never
//! empty: a freshly initialized store holds one seed entry so that search
//! always has something to rank.

use std::path::{Path, PathBuf};

use memoir_core::{EmbeddingAdapter, MemoirError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::atomic::write_atomic;
use crate::types::{
    cosine_similarity, KnowledgeEntry, PlaceholderPolicy, ScoredEntry, StoredEntry,
    PLACEHOLDER_TEXT,
};

/// File name of the index inside the knowledge directory.
pub const INDEX_FILE: &str = "index.json";

/// Current on-disk format version of the index.
pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dimensions: usize,
    entries: Vec<StoredEntry>,
}

/// In-memory vector index plus the directory it persists to.
#[derive(Debug)]
pub struct VectorKnowledgeStore {
    dir: PathBuf,
    dimensions: usize,
    entries: Vec<KnowledgeEntry>,
    seed: KnowledgeEntry,
    policy: PlaceholderPolicy,
}

impl VectorKnowledgeStore {
    /// Load the index from `dir`, or create it with a seed entry.
    ///
    /// Creating embeds the seed text once and writes the index immediately.
    /// An existing index that cannot be decoded is a `PersistenceRead` error.
    pub async fn load_or_init(
        dir: impl Into<PathBuf>,
        embedder: &dyn EmbeddingAdapter,
        policy: PlaceholderPolicy,
    ) -> Result<Self, MemoirError> {
        let dir = dir.into();
        let index_path = dir.join(INDEX_FILE);

        match std::fs::read_to_string(&index_path) {
            Ok(raw) if !raw.trim().is_empty() => {
                return Self::decode(dir, &index_path, &raw, policy);
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(MemoirError::PersistenceRead {
                    path: index_path,
                    message: e.to_string(),
                });
            }
        }

        let embedding = embedder.embed_one(PLACEHOLDER_TEXT).await?;
        let seed = KnowledgeEntry::placeholder(embedding);
        let store = Self::seeded(dir, seed, policy);
        store.persist()?;
        info!(
            dir = %store.dir.display(),
            dimensions = store.dimensions,
            "knowledge store initialized"
        );
        Ok(store)
    }

    fn seeded(dir: PathBuf, seed: KnowledgeEntry, policy: PlaceholderPolicy) -> Self {
        Self {
            dir,
            dimensions: seed.embedding.len(),
            entries: vec![seed.clone()],
            seed,
            policy,
        }
    }

    fn decode(
        dir: PathBuf,
        index_path: &Path,
        raw: &str,
        policy: PlaceholderPolicy,
    ) -> Result<Self, MemoirError> {
        let read_err = |message: String| MemoirError::PersistenceRead {
            path: index_path.to_path_buf(),
            message,
        };

        let file: IndexFile = serde_json::from_str(raw).map_err(|e| read_err(e.to_string()))?;
        if file.version != INDEX_FORMAT_VERSION {
            return Err(read_err(format!(
                "unsupported index format version {}",
                file.version
            )));
        }

        let entries = file
            .entries
            .into_iter()
            .map(StoredEntry::into_entry)
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != file.dimensions) {
            return Err(read_err(format!(
                "entry {} has {} dimensions, index declares {}",
                bad.id,
                bad.embedding.len(),
                file.dimensions
            )));
        }

        let seed = entries
            .iter()
            .find(|e| e.is_placeholder())
            .cloned()
            .ok_or_else(|| read_err("index has no seed entry".to_string()))?;

        info!(dir = %dir.display(), entries = entries.len(), "knowledge store loaded");
        Ok(Self {
            dir,
            dimensions: file.dimensions,
            entries,
            seed,
            policy,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All entries in insertion order, seed entry included.
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; the seed entry is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries other than the seed.
    pub fn real_len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_placeholder()).count()
    }

    /// Embed `text` and add it as a new entry. Memory only; call
    /// [`persist`](Self::persist) to make it durable.
    pub async fn add(
        &mut self,
        text: impl Into<String>,
        embedder: &dyn EmbeddingAdapter,
    ) -> Result<&KnowledgeEntry, MemoirError> {
        let text = text.into();
        let embedding = embedder.embed_one(&text).await?;
        self.check_dimensions(&embedding)?;

        self.entries.push(KnowledgeEntry::new(text, embedding));
        debug!(entries = self.entries.len(), "knowledge entry added");
        let idx = self.entries.len() - 1;
        Ok(&self.entries[idx])
    }

    /// The `k` entries most similar to `query`, best first.
    ///
    /// `k == 0` returns nothing without calling the embedder.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        embedder: &dyn EmbeddingAdapter,
    ) -> Result<Vec<ScoredEntry>, MemoirError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query_embedding = embedder.embed_one(query).await?;
        self.check_dimensions(&query_embedding)?;
        Ok(self.rank(&query_embedding, k))
    }

    /// Vectors from a different embedding model cannot be compared with the index.
    fn check_dimensions(&self, embedding: &[f32]) -> Result<(), MemoirError> {
        if embedding.len() == self.dimensions {
            return Ok(());
        }
        Err(MemoirError::provider(
            memoir_core::Capability::Embedding,
            format!(
                "embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimensions
            ),
        ))
    }

    /// Rank stored entries against an already embedded query.
    ///
    /// Ties keep insertion order. The query must have the store's dimensions;
    /// [`search`](Self::search) checks this before ranking.
    pub fn rank(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredEntry> {
        let hide_seed =
            self.policy == PlaceholderPolicy::HideWhenRealEntries && self.real_len() > 0;

        let mut scored: Vec<ScoredEntry> = self
            .entries
            .iter()
            .filter(|e| !(hide_seed && e.is_placeholder()))
            .filter_map(|e| {
                cosine_similarity(query_embedding, &e.embedding).map(|score| ScoredEntry {
                    entry: e.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }

    /// Atomically write the index to disk.
    pub fn persist(&self) -> Result<(), MemoirError> {
        let index_path = self.index_path();
        write_index(&index_path, self.dimensions, &self.entries).map_err(|source| {
            MemoirError::PersistenceWrite {
                path: index_path.clone(),
                source,
            }
        })?;
        debug!(path = %index_path.display(), entries = self.entries.len(), "knowledge store persisted");
        Ok(())
    }

    /// Replace the store with a fresh one holding only the seed entry.
    ///
    /// The fresh index is written over the old one first. If that fails the
    /// in-memory store is untouched and `PersistenceDelete` is returned.
    pub fn reset(&mut self) -> Result<(), MemoirError> {
        let fresh = vec![self.seed.clone()];
        let index_path = self.index_path();
        write_index(&index_path, self.dimensions, &fresh).map_err(|source| {
            MemoirError::PersistenceDelete {
                path: index_path.clone(),
                source,
            }
        })?;
        self.entries = fresh;
        info!(dir = %self.dir.display(), "knowledge store reset");
        Ok(())
    }
}

fn write_index(
    path: &Path,
    dimensions: usize,
    entries: &[KnowledgeEntry],
) -> Result<(), memoir_core::error::BoxError> {
    let file = IndexFile {
        version: INDEX_FORMAT_VERSION,
        dimensions,
        entries: entries.iter().map(StoredEntry::from).collect(),
    };
    let body = serde_json::to_vec_pretty(&file)?;
    write_atomic(path, &body)?;
    Ok(())
}
