//! servicekit - XSUAA, Protecode and ANS client
//!
#![doc = "servicekit - XSUAA, Protecode and ANS client"]
#![doc = "Main entry point for the servicekit command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use servicekit::cli::{AnsCommand, Cli, Commands, ProtecodeCommand};
use servicekit::commands;
use servicekit::config::Config;
use servicekit::error::category_of;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    if let Err(e) = run(cli).await {
        tracing::error!(category = %category_of(&e), "{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/servicekit.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Token {
            oauth_url,
            client_id,
            client_secret,
            show_token,
        } => {
            commands::token::run_token(&config, &oauth_url, &client_id, &client_secret, show_token)
                .await
        }
        Commands::Ans { command } => match command {
            AnsCommand::Send { event, service_key } => {
                tracing::info!("Sending ANS event from {}", event.display());
                commands::ans::send_event(&config, &event, service_key.as_deref()).await
            }
        },
        Commands::Protecode { command } => {
            tracing::debug!("Protecode command: {:?}", command);
            match command {
                ProtecodeCommand::Product { group } => {
                    commands::protecode::list_products(&config, group).await
                }
                ProtecodeCommand::Result { id } => {
                    commands::protecode::show_result(&config, id).await
                }
                ProtecodeCommand::Report { id, output } => {
                    commands::protecode::download_report(&config, id, &output).await
                }
                ProtecodeCommand::Upload {
                    file,
                    name,
                    group,
                    delete_binary,
                } => commands::protecode::upload(&config, &file, name, group, delete_binary).await,
                ProtecodeCommand::Fetch {
                    url,
                    group,
                    delete_binary,
                } => commands::protecode::fetch(&config, &url, group, delete_binary).await,
                ProtecodeCommand::Delete { id } => commands::protecode::delete(&config, id).await,
            }
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "servicekit=debug"
    } else {
        "servicekit=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
