// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only conversation log backed by a single JSON file.

use std::path::{Path, PathBuf};

use memoir_core::{ConversationTurn, MemoirError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::atomic::{remove_if_exists, write_atomic};

/// Current on-disk format version of the history file.
pub const HISTORY_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct HistoryFileRef<'a> {
    version: u32,
    turns: &'a [ConversationTurn],
}

#[derive(Deserialize)]
struct HistoryFile {
    version: u32,
    #[serde(default)]
    turns: Vec<ConversationTurn>,
}

/// Ordered conversation turns plus the file they persist to.
///
/// Turns are only ever appended. The in-memory log is the source of truth
/// between [`HistoryStore::persist`] calls.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    turns: Vec<ConversationTurn>,
}

impl HistoryStore {
    /// An empty log that will persist to `path`. Nothing is read or written.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            turns: Vec::new(),
        }
    }

    /// Load the log from `path`.
    ///
    /// A missing or blank file yields an empty log. A file that cannot be
    /// decoded, or that carries an unknown format version, is a
    /// `PersistenceRead` error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MemoirError> {
        let path = path.into();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no history file, starting empty");
                return Ok(Self::empty(path));
            }
            Err(e) => {
                return Err(MemoirError::PersistenceRead {
                    path,
                    message: e.to_string(),
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(Self::empty(path));
        }

        let file: HistoryFile =
            serde_json::from_str(&raw).map_err(|e| MemoirError::PersistenceRead {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if file.version != HISTORY_FORMAT_VERSION {
            return Err(MemoirError::PersistenceRead {
                path,
                message: format!("unsupported history format version {}", file.version),
            });
        }

        info!(path = %path.display(), turns = file.turns.len(), "history loaded");
        Ok(Self {
            path,
            turns: file.turns,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first.
    pub fn snapshot(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The last `n` turns, oldest first. Returns everything when `n` exceeds the log.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Atomically write the full log to disk.
    pub fn persist(&self) -> Result<(), MemoirError> {
        let body = serde_json::to_vec_pretty(&HistoryFileRef {
            version: HISTORY_FORMAT_VERSION,
            turns: &self.turns,
        })
        .map_err(|e| MemoirError::PersistenceWrite {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        write_atomic(&self.path, &body).map_err(|e| MemoirError::PersistenceWrite {
            path: self.path.clone(),
            source: Box::new(e),
        })?;
        debug!(path = %self.path.display(), turns = self.turns.len(), "history persisted");
        Ok(())
    }

    /// Delete the durable log, then clear memory.
    ///
    /// If the file cannot be removed, the in-memory log is kept and a
    /// `PersistenceDelete` error is returned.
    pub fn reset(&mut self) -> Result<(), MemoirError> {
        remove_if_exists(&self.path).map_err(|e| MemoirError::PersistenceDelete {
            path: self.path.clone(),
            source: Box::new(e),
        })?;
        self.turns.clear();
        info!(path = %self.path.display(), "history reset");
        Ok(())
    }
}
