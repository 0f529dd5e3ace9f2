// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shell command recognition.

use memoir_memory::RefreshTarget;

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Refresh(RefreshTarget),
    /// Blank input.
    Empty,
    /// Anything else, trimmed.
    Dialogue(String),
}

impl Command {
    /// Commands match after trimming, ignoring case.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Command::Empty,
            "exit" | "quit" => Command::Exit,
            "refresh" | "clear" => Command::Refresh(RefreshTarget::All),
            "refresh memory" => Command::Refresh(RefreshTarget::History),
            "refresh vectorstore" => Command::Refresh(RefreshTarget::Knowledge),
            _ => Command::Dialogue(trimmed.to_string()),
        }
    }
}
