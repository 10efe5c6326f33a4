//! Command-line interface definition for servicekit
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for token acquisition, ANS events and Protecode
//! scans.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// servicekit - XSUAA, Protecode and ANS client
#[derive(Parser, Debug, Clone)]
#[command(name = "servicekit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/servicekit.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the HTTP request timeout (seconds)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Acquire an OAuth2 token with the client-credentials grant
    Token {
        /// OAuth base URL; only scheme and host are used
        #[arg(long)]
        oauth_url: String,

        /// OAuth client identifier
        #[arg(long)]
        client_id: String,

        /// OAuth client secret
        #[arg(long, env = "SERVICEKIT_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,

        /// Print the access token itself
        #[arg(long)]
        show_token: bool,
    },

    /// Alert Notification Service commands
    Ans {
        /// ANS subcommand
        #[command(subcommand)]
        command: AnsCommand,
    },

    /// Protecode scan commands
    Protecode {
        /// Protecode subcommand
        #[command(subcommand)]
        command: ProtecodeCommand,
    },
}

/// ANS subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AnsCommand {
    /// Send an event read from a JSON file
    Send {
        /// Path to the event JSON
        #[arg(short, long)]
        event: PathBuf,

        /// Path to the service key JSON (overrides configuration)
        #[arg(short, long)]
        service_key: Option<PathBuf>,
    },
}

/// Protecode subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProtecodeCommand {
    /// List the products of a group
    Product {
        /// Group identifier (defaults to configuration)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show the scan result of a product
    Result {
        /// Product identifier
        #[arg(long)]
        id: i64,
    },

    /// Download the PDF report of a product
    Report {
        /// Product identifier
        #[arg(long)]
        id: i64,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Upload a binary and start a scan
    Upload {
        /// Binary to upload
        #[arg(short, long)]
        file: PathBuf,

        /// File name reported to Protecode (defaults to the file's name)
        #[arg(short, long)]
        name: Option<String>,

        /// Group identifier (defaults to configuration)
        #[arg(short, long)]
        group: Option<String>,

        /// Delete the binary on the server after scanning
        #[arg(long)]
        delete_binary: bool,
    },

    /// Let Protecode download a binary from a URL and scan it
    Fetch {
        /// URL to fetch
        #[arg(short, long)]
        url: String,

        /// Group identifier (defaults to configuration)
        #[arg(short, long)]
        group: Option<String>,

        /// Delete the binary on the server after scanning
        #[arg(long)]
        delete_binary: bool,
    },

    /// Delete a product and its scan result
    Delete {
        /// Product identifier
        #[arg(long)]
        id: i64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/servicekit.yaml".to_string()),
            verbose: false,
            json_logs: false,
            timeout: None,
            command: Commands::Protecode {
                command: ProtecodeCommand::Product { group: None },
            },
        }
    }
}
