// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue engine for Memoir.
//!
//! The [`Session`] is the central coordinator that:
//! - Classifies each turn as a save request or an ordinary question
//! - Summarizes, publishes and indexes the discussion on save requests
//! - Answers ordinary questions with notes retrieved from the knowledge store
//! - Writes the conversation log back when it closes

pub mod classifier;
pub mod command;
pub mod responder;
pub mod session;
pub mod settings;
pub mod summarizer;
pub mod timeout;

pub use classifier::IntentClassifier;
pub use command::Command;
pub use responder::Responder;
pub use session::{Capabilities, Session, TurnOutcome, TurnState};
pub use settings::{store_paths, SessionSettings};
pub use summarizer::Summarizer;
