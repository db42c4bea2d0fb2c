// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duckie - a math tutor chat bot.
//!
//! This is the binary entry point and composition root.

mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// Duckie - a math tutor chat bot.
#[derive(Parser, Debug)]
#[command(name = "duckie", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the tutor from the terminal as a local user.
    Shell,
    /// Manage Duckie configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration, then exit.
    Check {
        /// Validate this file instead of the default search path.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Config {
        action: ConfigCommand::Check { path },
    }) = &cli.command
    {
        let result = match path {
            Some(path) => duckie_config::load_and_validate_path(path),
            None => duckie_config::load_and_validate(),
        };
        match result {
            Ok(config) => {
                println!(
                    "{} (model={}, endpoint={})",
                    "config ok".green(),
                    config.inference.model_name,
                    config.inference.endpoint
                );
                return;
            }
            Err(errors) => {
                duckie_config::render_errors(&errors);
                std::process::exit(1);
            }
        }
    }

    let config = match duckie_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            duckie_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Shell) => {
            init_tracing(&config.bot.log_level);
            let code = match shell::run_shell(config).await {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("{}: {e}", "error".red());
                    1
                }
            };
            // An abandoned readline may still block on stdin and would hold up runtime shutdown.
            std::process::exit(code);
        }
        Some(Commands::Config { .. }) => {}
        None => {
            println!("duckie: use --help for available commands");
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("duckie={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}
