// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Memoir.
//!
//! Foundational trait definitions, the error type, and the shared types used
//! throughout the workspace. The generation, embedding, and publish
//! capabilities are expressed here as traits so the dialogue engine never
//! depends on a concrete binding.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MemoirError;
pub use types::{Capability, ConversationTurn, Role};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, PublishAdapter};
