//! CLI command execution.

use anyhow::Result;
use tracing::debug;

use crate::assessment::script;
use crate::config::AppConfig;
use crate::server;
use crate::session::Pacing;

use super::args::{Cli, Commands};
use super::chat;

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    debug!(?config, "Effective configuration");
    Ok(config)
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        None => chat_command(&config, false, None).await,
        Some(Commands::Chat { instant, server }) => {
            chat_command(&config, instant, server.as_deref()).await
        }
        Some(Commands::Serve { port, open }) => {
            let port = port.unwrap_or(config.server.port);
            server::start_server(&config, port, open).await
        }
        Some(Commands::Script) => {
            print_script();
            Ok(())
        }
        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn chat_command(config: &AppConfig, instant: bool, server: Option<&str>) -> Result<()> {
    if let Some(url) = server {
        return chat::run_remote(url).await;
    }

    let pacing = if instant {
        Pacing::instant()
    } else {
        Pacing::from(&config.pacing)
    };
    chat::run_local(pacing, config.assessment.fallback_seed).await
}

fn print_script() {
    let total = script::QUESTIONS.len();
    println!("{:<4} {:<20} {:<16} PROMPT", "#", "DOMAIN", "KIND");
    println!("{}", "-".repeat(80));

    for (i, question) in script::QUESTIONS.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:<16} {}",
            format!("{}/{total}", i + 1),
            question.domain.label(),
            question.response_kind.as_str(),
            question.prompt,
        );
    }
}
