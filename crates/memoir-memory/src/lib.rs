// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable memory for Memoir.
//!
//! Two stores back the dialogue engine:
//! - [`HistoryStore`]: the ordered conversation log, one JSON file
//! - [`VectorKnowledgeStore`]: saved facts with embeddings, searched by
//!   cosine similarity
//!
//! [`PersistenceManager`] owns both and implements the save and reset
//! lifecycle. All writes are atomic file replacements.

pub mod atomic;
pub mod history;
pub mod knowledge;
pub mod persistence;
pub mod types;

pub use history::HistoryStore;
pub use knowledge::VectorKnowledgeStore;
pub use persistence::{PersistenceManager, RefreshTarget, StorePaths};
pub use types::{KnowledgeEntry, PlaceholderPolicy, ScoredEntry, PLACEHOLDER_TEXT};
