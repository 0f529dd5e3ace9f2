// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `memoir doctor` command implementation.
//!
//! Checks the durable stores and asks every wired-in adapter for its health
//! before a session is started.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::Colorize;
use memoir_agent::timeout::{TimedEmbedder, TimedProvider, TimedPublisher};
use memoir_agent::{store_paths, Capabilities};
use memoir_config::MemoirConfig;
use memoir_core::types::HealthStatus;
use memoir_core::{MemoirError, PluginAdapter};
use memoir_memory::HistoryStore;

use crate::shell::build_capabilities;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

/// Run the `memoir doctor` command.
///
/// Returns an error when any check fails so the process exits non-zero.
pub async fn run_doctor(config: &MemoirConfig) -> Result<(), MemoirError> {
    let paths = store_paths(config);
    let limit = Duration::from_secs(config.dialogue.capability_timeout_secs);

    let mut results = vec![
        check_history(&paths.history_path),
        check_knowledge_dir(&paths.knowledge_dir),
    ];
    results.extend(check_adapters(&build_capabilities(config)?, limit).await);

    println!();
    println!("  memoir doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render(result));
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warned = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();
    if failed + warned == 0 {
        println!("  All checks passed.");
    } else {
        let issues = failed + warned;
        let word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {word} found.");
    }
    println!();

    if failed > 0 {
        return Err(MemoirError::Internal(format!("{failed} check(s) failed")));
    }
    Ok(())
}

fn render(result: &CheckResult) -> String {
    let ms = result.duration.as_millis();
    match result.status {
        CheckStatus::Pass => format!(
            "    {} {:<20} {} ({ms}ms)",
            "✓".green(),
            result.name,
            result.message
        ),
        CheckStatus::Warn => format!(
            "    {} {:<20} {} ({ms}ms)",
            "!".yellow(),
            result.name,
            result.message.yellow()
        ),
        CheckStatus::Fail => format!(
            "    {} {:<20} {} ({ms}ms)",
            "✗".red(),
            result.name,
            result.message.red()
        ),
    }
}

/// The conversation log decodes, or does not exist yet.
fn check_history(path: &Path) -> CheckResult {
    let start = Instant::now();
    let (status, message) = if !path.exists() {
        (
            CheckStatus::Pass,
            format!("{} (created on first exit)", path.display()),
        )
    } else {
        match HistoryStore::load(path) {
            Ok(store) => (CheckStatus::Pass, format!("{} turns", store.len())),
            Err(e) => (CheckStatus::Fail, e.to_string()),
        }
    };
    CheckResult {
        name: "History".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

/// The knowledge index location is a directory, or does not exist yet.
fn check_knowledge_dir(dir: &Path) -> CheckResult {
    let start = Instant::now();
    let (status, message) = if !dir.exists() {
        (
            CheckStatus::Pass,
            format!("{} (seeded on first start)", dir.display()),
        )
    } else if !dir.is_dir() {
        (
            CheckStatus::Fail,
            format!("{} is not a directory", dir.display()),
        )
    } else if dir.join("index.json").is_file() {
        (CheckStatus::Pass, format!("{}", dir.display()))
    } else {
        (
            CheckStatus::Warn,
            format!("{} has no index.json (will be seeded)", dir.display()),
        )
    };
    CheckResult {
        name: "Knowledge index".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

/// Health of each capability adapter, each bounded by `limit`.
async fn check_adapters(capabilities: &Capabilities, limit: Duration) -> Vec<CheckResult> {
    let adapters: [Arc<dyn PluginAdapter>; 3] = [
        Arc::new(TimedProvider::new(capabilities.provider.clone(), limit)),
        Arc::new(TimedEmbedder::new(capabilities.embedder.clone(), limit)),
        Arc::new(TimedPublisher::new(capabilities.publisher.clone(), limit)),
    ];

    let mut results = Vec::with_capacity(adapters.len());
    for adapter in &adapters {
        results.push(check_adapter(adapter.as_ref()).await);
    }
    results
}

async fn check_adapter(adapter: &dyn PluginAdapter) -> CheckResult {
    let start = Instant::now();
    let (status, detail) = match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name: adapter.name().to_string(),
        status,
        message: format!(
            "{} v{}: {detail}",
            adapter.adapter_type(),
            adapter.version()
        ),
        duration: start.elapsed(),
    }
}
