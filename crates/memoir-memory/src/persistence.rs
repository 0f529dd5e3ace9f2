// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of both durable stores: open at startup, save, and reset.

use std::path::PathBuf;

use memoir_core::{EmbeddingAdapter, MemoirError};
use tracing::{info, warn};

use crate::history::HistoryStore;
use crate::knowledge::VectorKnowledgeStore;
use crate::types::PlaceholderPolicy;

/// Where the two stores live on disk.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub history_path: PathBuf,
    pub knowledge_dir: PathBuf,
}

/// Which stores a refresh targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    History,
    Knowledge,
    All,
}

impl std::fmt::Display for RefreshTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshTarget::History => write!(f, "conversation history"),
            RefreshTarget::Knowledge => write!(f, "knowledge store"),
            RefreshTarget::All => write!(f, "conversation history and knowledge store"),
        }
    }
}

/// Owns the history log and the knowledge store.
#[derive(Debug)]
pub struct PersistenceManager {
    history: HistoryStore,
    knowledge: VectorKnowledgeStore,
}

impl PersistenceManager {
    /// Load both stores, initializing the knowledge store if it is absent.
    pub async fn open(
        paths: &StorePaths,
        embedder: &dyn EmbeddingAdapter,
        policy: PlaceholderPolicy,
    ) -> Result<Self, MemoirError> {
        let history = HistoryStore::load(&paths.history_path)?;
        let knowledge =
            VectorKnowledgeStore::load_or_init(&paths.knowledge_dir, embedder, policy).await?;
        Ok(Self::from_parts(history, knowledge))
    }

    pub fn from_parts(history: HistoryStore, knowledge: VectorKnowledgeStore) -> Self {
        Self { history, knowledge }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn knowledge(&self) -> &VectorKnowledgeStore {
        &self.knowledge
    }

    pub fn knowledge_mut(&mut self) -> &mut VectorKnowledgeStore {
        &mut self.knowledge
    }

    pub fn save_history(&self) -> Result<(), MemoirError> {
        self.history.persist()
    }

    pub fn save_knowledge(&self) -> Result<(), MemoirError> {
        self.knowledge.persist()
    }

    /// Delete the durable history and clear the in-memory log.
    pub fn refresh_history(&mut self) -> Result<(), MemoirError> {
        self.refresh(RefreshTarget::History)
    }

    /// Replace the knowledge store with one holding only the seed entry.
    pub fn refresh_knowledge(&mut self) -> Result<(), MemoirError> {
        self.refresh(RefreshTarget::Knowledge)
    }

    /// Reset both stores. Both resets are attempted; the first error wins.
    pub fn refresh_all(&mut self) -> Result<(), MemoirError> {
        self.refresh(RefreshTarget::All)
    }

    /// Reset the targeted stores.
    pub fn refresh(&mut self, target: RefreshTarget) -> Result<(), MemoirError> {
        let result = match target {
            RefreshTarget::History => self.history.reset(),
            RefreshTarget::Knowledge => self.knowledge.reset(),
            RefreshTarget::All => {
                let history = self.history.reset();
                let knowledge = self.knowledge.reset();
                history.and(knowledge)
            }
        };
        match &result {
            Ok(()) => info!(%target, "refresh complete"),
            Err(e) => warn!(%target, error = %e, "refresh failed"),
        }
        result
    }
}
