// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Memoir.
//!
//! Provides deterministic in-process stand-ins for the three capabilities so
//! the dialogue engine can be tested without network access.
//!
//! # Components
//!
//! - [`MockProvider`] - Generation with scripted replies, failures and stalls
//! - [`MockEmbedder`] - Bag-of-words hashing embedder
//! - [`MockPublisher`] - Records published blocks, can be told to fail

pub mod mock_embedder;
pub mod mock_provider;
pub mod mock_publisher;

pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockProvider, MockReply};
pub use mock_publisher::MockPublisher;
