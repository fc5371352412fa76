//! NeuroAsha - guided cognitive-assessment conversations.
//!
//! A scripted screening session: the participant agrees to start, answers a
//! fixed series of questions grouped by cognitive domain, and receives a
//! fixed summary. Answers are recorded but never scored.
//!
//! Architecture:
//! - `assessment` holds the synchronous state machine and its script
//! - `session` paces replies and hosts many isolated sessions
//! - `server` exposes sessions over HTTP/WebSocket
//! - `cli` runs a session in the terminal, locally or against a server

mod assessment;
mod cli;
mod config;
mod models;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,neuroasha={}", cli.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    execute(cli).await
}
