// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `memoir shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Every line goes through the session's turn state machine; turn errors are
//! printed and control returns to the prompt.

use std::future::Future;
use std::sync::Arc;

use colored::Colorize;
use memoir_agent::{store_paths, Capabilities, Session, SessionSettings, TurnOutcome, TurnState};
use memoir_config::MemoirConfig;
use memoir_core::MemoirError;
use memoir_notion::NotionPublisher;
use memoir_openai::{OpenAiEmbedder, OpenAiProvider};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info, warn};

/// Whether the REPL keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Runs the `memoir shell` interactive REPL.
///
/// Fails before the first prompt if a credential is missing or a durable
/// store cannot be decoded.
pub async fn run_shell(config: MemoirConfig) -> Result<(), MemoirError> {
    let settings = SessionSettings::from_config(&config)?;
    let capabilities = build_capabilities(&config)?;
    let paths = store_paths(&config);

    let mut session = Session::open(settings, capabilities, &paths).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| MemoirError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "memoir shell".bold().green());
    println!(
        "Type {} to leave, {} to forget.\n",
        "exit".yellow(),
        "clear".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(&line);
                }
                if run_turn(&mut session, &line, shutdown_signal()).await == Flow::Stop {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("input closed, leaving shell");
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    // Ctrl+C, Ctrl+D and SIGTERM end the session the same way `exit` does.
    if let Err(e) = session.close() {
        eprintln!("{}: {e}", "error".red());
    }
    info!("shell closed");
    Ok(())
}

/// The OpenAI and Notion bindings configured in `config`.
pub fn build_capabilities(config: &MemoirConfig) -> Result<Capabilities, MemoirError> {
    Ok(Capabilities {
        provider: Arc::new(OpenAiProvider::new(&config.openai)?),
        embedder: Arc::new(OpenAiEmbedder::new(&config.openai)?),
        publisher: Arc::new(NotionPublisher::new(&config.notion)?),
    })
}

/// Run one turn unless `interrupt` fires first.
///
/// An interrupted turn is abandoned where it stands; turns already appended
/// stay in the log and are saved when the caller closes the session.
async fn run_turn<F>(session: &mut Session, line: &str, interrupt: F) -> Flow
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        flow = handle_line(session, line) => flow,
        () = interrupt => {
            warn!("turn interrupted");
            eprintln!("{}", "interrupted".yellow());
            Flow::Stop
        }
    }
}

/// Resolves on SIGINT (Ctrl+C outside the line editor) or SIGTERM.
///
/// If no handler can be installed the future never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let terminate = async {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            () = ctrl_c => info!("received SIGINT (Ctrl+C)"),
            () = terminate => info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("received Ctrl+C");
    }
}

/// Feed one line to the session and print what it produced.
async fn handle_line(session: &mut Session, line: &str) -> Flow {
    match session.handle_input(line).await {
        Ok(outcome) => {
            for (text, tone) in describe(&outcome) {
                print_line(&text, tone);
            }
        }
        Err(e) => eprintln!("{}: {e}", "error".red()),
    }

    if session.state() == TurnState::Terminated {
        Flow::Stop
    } else {
        Flow::Continue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Reply,
    Notice,
    Warning,
}

fn print_line(text: &str, tone: Tone) {
    match tone {
        Tone::Reply => println!("{}: {text}", "memoir".cyan()),
        Tone::Notice => println!("{}", text.dimmed()),
        Tone::Warning => eprintln!("{}: {text}", "warning".yellow()),
    }
}

/// Lines shown to the user for a turn outcome.
fn describe(outcome: &TurnOutcome) -> Vec<(String, Tone)> {
    match outcome {
        TurnOutcome::Reply(text) => vec![(text.clone(), Tone::Reply)],
        TurnOutcome::Persisted {
            summary,
            publish_error,
            save_error,
        } => {
            let mut lines = vec![(format!("saved: {summary}"), Tone::Notice)];
            if let Some(e) = publish_error {
                lines.push((format!("summary was not published: {e}"), Tone::Warning));
            }
            if let Some(e) = save_error {
                lines.push((format!("knowledge store not written: {e}"), Tone::Warning));
            }
            lines
        }
        TurnOutcome::Refreshed { target } => vec![(format!("cleared {target}"), Tone::Notice)],
        TurnOutcome::Ignored => Vec::new(),
        TurnOutcome::Exit => vec![("goodbye".to_string(), Tone::Notice)],
    }
}
