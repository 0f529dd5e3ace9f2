// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Memoir.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::Capability;

/// Boxed error source carried by capability and persistence failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across Memoir crates.
#[derive(Debug, Error)]
pub enum MemoirError {
    /// A required configuration value is absent. Fatal at startup only.
    #[error("missing required configuration `{key}`")]
    ConfigMissing { key: String },

    /// Any other configuration problem (bad value, unreadable file).
    #[error("configuration error: {0}")]
    Config(String),

    /// A generation, embedding, or publish call failed.
    #[error("{capability} call failed: {message}")]
    Provider {
        capability: Capability,
        message: String,
        source: Option<BoxError>,
    },

    /// Writing durable state failed. In-memory state is retained.
    #[error("failed to write {}: {source}", path.display())]
    PersistenceWrite { path: PathBuf, source: BoxError },

    /// Durable state exists but could not be decoded.
    #[error("failed to read {}: {message}", path.display())]
    PersistenceRead { path: PathBuf, message: String },

    /// A reset could not remove or replace durable state; nothing was reset.
    #[error("failed to reset {}: {source}", path.display())]
    PersistenceDelete { path: PathBuf, source: BoxError },

    /// A capability call exceeded its time budget.
    #[error("{capability} call timed out after {duration:?}")]
    Timeout {
        capability: Capability,
        duration: Duration,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MemoirError {
    /// Shorthand for a capability failure without an underlying source.
    pub fn provider(capability: Capability, message: impl Into<String>) -> Self {
        MemoirError::Provider {
            capability,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for errors that must stop the process at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MemoirError::ConfigMissing { .. }
                | MemoirError::Config(_)
                | MemoirError::PersistenceRead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_names_capability() {
        let err = MemoirError::provider(Capability::Publish, "page not found");
        assert_eq!(err.to_string(), "publish call failed: page not found");
    }

    #[test]
    fn timeout_display() {
        let err = MemoirError::Timeout {
            capability: Capability::Embedding,
            duration: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "embedding call timed out after 5s");
    }

    #[test]
    fn only_startup_errors_are_fatal() {
        assert!(MemoirError::ConfigMissing { key: "notion.page_id".into() }.is_fatal());
        assert!(MemoirError::PersistenceRead {
            path: "memory.json".into(),
            message: "bad".into()
        }
        .is_fatal());
        assert!(!MemoirError::provider(Capability::Generation, "503").is_fatal());
        assert!(!MemoirError::PersistenceWrite {
            path: "memory.json".into(),
            source: Box::new(std::io::Error::other("disk full")),
        }
        .is_fatal());
    }
}
