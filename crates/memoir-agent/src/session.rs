// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn state machine for a single interactive session.
//!
//! Each dialogue turn goes through: Idle -> Classifying -> {Persisting | Conversing} -> Idle.
//! The Terminated state is entered once, on close.
//!
//! The session owns both durable stores. History is written back exactly
//! once: by [`Session::close`], or by `Drop` if the session is dropped open.

use std::sync::Arc;

use memoir_core::types::PublishRequest;
use memoir_core::{
    ConversationTurn, EmbeddingAdapter, MemoirError, ProviderAdapter, PublishAdapter,
};
use memoir_memory::{PersistenceManager, RefreshTarget, StorePaths};
use tracing::{debug, error, info, warn};

use crate::classifier::IntentClassifier;
use crate::command::Command;
use crate::responder::Responder;
use crate::settings::SessionSettings;
use crate::summarizer::Summarizer;
use crate::timeout::{TimedEmbedder, TimedProvider, TimedPublisher};

/// States in the turn FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for input.
    Idle,
    /// Asking whether the input is a save request.
    Classifying,
    /// Summarizing, publishing and indexing the discussion.
    Persisting,
    /// Retrieving notes and generating a reply.
    Conversing,
    /// Closed; history has been written back.
    Terminated,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Idle => write!(f, "idle"),
            TurnState::Classifying => write!(f, "classifying"),
            TurnState::Persisting => write!(f, "persisting"),
            TurnState::Conversing => write!(f, "conversing"),
            TurnState::Terminated => write!(f, "terminated"),
        }
    }
}

/// What a handled line of input produced.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Assistant reply to an ordinary turn.
    Reply(String),
    /// The discussion was summarized and indexed.
    ///
    /// Publish and save failures do not abort the turn; they are reported here.
    Persisted {
        summary: String,
        publish_error: Option<MemoirError>,
        save_error: Option<MemoirError>,
    },
    Refreshed { target: RefreshTarget },
    /// Blank input.
    Ignored,
    /// The session closed and history was saved.
    Exit,
}

/// The three external capabilities a session calls.
#[derive(Clone)]
pub struct Capabilities {
    pub provider: Arc<dyn ProviderAdapter>,
    pub embedder: Arc<dyn EmbeddingAdapter>,
    pub publisher: Arc<dyn PublishAdapter>,
}

/// A single interactive session over the history log and knowledge store.
pub struct Session {
    state: TurnState,
    settings: SessionSettings,
    classifier: IntentClassifier,
    summarizer: Summarizer,
    responder: Responder,
    embedder: Arc<dyn EmbeddingAdapter>,
    publisher: Arc<dyn PublishAdapter>,
    stores: PersistenceManager,
    closed: bool,
}

impl Session {
    /// Load or initialize both stores and build a session over them.
    pub async fn open(
        settings: SessionSettings,
        capabilities: Capabilities,
        paths: &StorePaths,
    ) -> Result<Self, MemoirError> {
        let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(TimedEmbedder::new(
            capabilities.embedder.clone(),
            settings.capability_timeout,
        ));
        let stores =
            PersistenceManager::open(paths, embedder.as_ref(), settings.placeholder_policy)
                .await?;
        info!(
            history_turns = stores.history().len(),
            knowledge_entries = stores.knowledge().len(),
            "session opened"
        );
        Ok(Self::with_stores(settings, capabilities, stores))
    }

    /// Build a session over already loaded stores.
    pub fn with_stores(
        settings: SessionSettings,
        capabilities: Capabilities,
        stores: PersistenceManager,
    ) -> Self {
        let limit = settings.capability_timeout;
        let provider: Arc<dyn ProviderAdapter> =
            Arc::new(TimedProvider::new(capabilities.provider, limit));

        Self {
            state: TurnState::Idle,
            classifier: IntentClassifier::new(provider.clone(), settings.trigger_token.clone()),
            summarizer: Summarizer::new(provider.clone()),
            responder: Responder::new(provider, settings.max_tokens),
            embedder: Arc::new(TimedEmbedder::new(capabilities.embedder, limit)),
            publisher: Arc::new(TimedPublisher::new(capabilities.publisher, limit)),
            settings,
            stores,
            closed: false,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn stores(&self) -> &PersistenceManager {
        &self.stores
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Handle one line of user input.
    ///
    /// Turn errors leave the session usable in the `Idle` state.
    pub async fn handle_input(&mut self, input: &str) -> Result<TurnOutcome, MemoirError> {
        if self.closed {
            return Err(MemoirError::Internal("session is closed".to_string()));
        }

        match Command::parse(input) {
            Command::Empty => Ok(TurnOutcome::Ignored),
            Command::Exit => {
                self.close()?;
                Ok(TurnOutcome::Exit)
            }
            Command::Refresh(target) => {
                self.stores.refresh(target)?;
                Ok(TurnOutcome::Refreshed { target })
            }
            Command::Dialogue(text) => {
                let result = self.dialogue_turn(&text).await;
                self.state = TurnState::Idle;
                if let Err(e) = &result {
                    warn!(error = %e, "turn aborted");
                }
                result
            }
        }
    }

    async fn dialogue_turn(&mut self, text: &str) -> Result<TurnOutcome, MemoirError> {
        self.state = TurnState::Classifying;
        let wants_save = self.classifier.classify(text).await?;

        if wants_save {
            self.state = TurnState::Persisting;
            self.persist_discussion().await
        } else {
            self.state = TurnState::Conversing;
            self.converse(text).await.map(TurnOutcome::Reply)
        }
    }

    /// Summarize the log, publish it, and index the summary.
    ///
    /// The log itself is not appended to.
    async fn persist_discussion(&mut self) -> Result<TurnOutcome, MemoirError> {
        let summary = self
            .summarizer
            .summarize(self.stores.history().snapshot())
            .await?;
        debug!(summary_len = summary.len(), "summary generated");

        let request = PublishRequest {
            target_id: self.settings.page_id.clone(),
            text: summary.clone(),
        };
        let publish_error = match self.publisher.publish(request).await {
            Ok(receipt) => {
                info!(block_id = ?receipt.block_id, "summary published");
                None
            }
            Err(e) => {
                warn!(error = %e, "publishing summary failed");
                Some(e)
            }
        };

        self.stores
            .knowledge_mut()
            .add(summary.clone(), self.embedder.as_ref())
            .await?;

        let save_error = self.stores.save_knowledge().err();
        if let Some(e) = &save_error {
            warn!(error = %e, "saving knowledge store failed");
        }

        Ok(TurnOutcome::Persisted {
            summary,
            publish_error,
            save_error,
        })
    }

    /// Record the user turn, retrieve related notes and reply.
    ///
    /// A failure after the user turn is recorded leaves it in the log.
    async fn converse(&mut self, text: &str) -> Result<String, MemoirError> {
        let prior: Vec<ConversationTurn> = match self.settings.history_window {
            0 => self.stores.history().snapshot().to_vec(),
            window => self.stores.history().recent(window).to_vec(),
        };

        self.stores.history_mut().append(ConversationTurn::user(text));

        let hits = self
            .stores
            .knowledge()
            .search(text, self.settings.retrieval_k, self.embedder.as_ref())
            .await?;
        let reply = self.responder.respond(text, &prior, &hits).await?;

        self.stores
            .history_mut()
            .append(ConversationTurn::assistant(reply.clone()));
        Ok(reply)
    }

    /// Write the history back and terminate. Later calls do nothing.
    pub fn close(&mut self) -> Result<(), MemoirError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.state = TurnState::Terminated;

        match self.stores.save_history() {
            Ok(()) => {
                info!(turns = self.stores.history().len(), "history saved");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "saving history failed");
                Err(e)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            // Errors are logged by close.
            let _ = self.close();
        }
    }
}
