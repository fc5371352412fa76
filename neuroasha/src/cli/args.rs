//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// NeuroAsha - guided cognitive assessment conversations
#[derive(Parser, Debug)]
#[command(name = "neuroasha")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of the user/project layers
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take the assessment in the terminal
    Chat {
        /// Reply immediately instead of simulating thinking time
        #[arg(long)]
        instant: bool,

        /// Drive a session on a running server (e.g. http://127.0.0.1:58232)
        #[arg(long)]
        server: Option<String>,
    },

    /// Start the HTTP server hosting assessment sessions
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open browser automatically
        #[arg(long)]
        open: bool,
    },

    /// Print the question script
    Script,

    /// Print the effective configuration
    Config,
}

impl Cli {
    /// Default log filter for this invocation.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            return "debug";
        }
        match self.command {
            Some(Commands::Serve { .. }) => "info",
            _ => "warn",
        }
    }
}
