// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memoir - a terminal dialogue agent with durable, searchable memory.
//!
//! This is the binary entry point.

mod doctor;
mod shell;

use clap::{Parser, Subcommand};
use colored::Colorize;
use memoir_core::MemoirError;

/// Exit status for errors that need a configuration or file fix before retrying.
const EXIT_FATAL: i32 = 2;

/// Memoir - a terminal dialogue agent with durable, searchable memory.
#[derive(Parser, Debug)]
#[command(name = "memoir", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Launch the interactive dialogue (default).
    Shell,
    /// Check the durable stores and the health of every adapter.
    Doctor,
    /// Inspect Memoir configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ConfigCommand {
    /// Validate configuration and print the effective settings with secrets masked.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match memoir_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            memoir_config::render_errors(&errors);
            std::process::exit(EXIT_FATAL);
        }
    };

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            init_tracing(&config.agent.log_level);
            if let Err(e) = shell::run_shell(config).await {
                fail(&e);
            }
        }
        Commands::Doctor => {
            init_tracing(&config.agent.log_level);
            if let Err(e) = doctor::run_doctor(&config).await {
                fail(&e);
            }
        }
        Commands::Config {
            action: ConfigCommand::Check,
        } => {
            print!("{}", memoir_config::render_redacted(&config));
        }
    }
}

/// Print `error` and exit with a status that tells startup problems apart.
fn fail(error: &MemoirError) -> ! {
    eprintln!("{}: {error}", "error".red());
    std::process::exit(exit_code(error));
}

fn exit_code(error: &MemoirError) -> i32 {
    if error.is_fatal() { EXIT_FATAL } else { 1 }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so they never interleave with replies on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("memoir={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
