mod cli;
mod config;
mod dictionary;
mod document;
mod error;
mod export;
mod history;
mod llm;
mod processor;
mod remote;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=debug for pipeline detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Auth {
            service,
            key,
            url,
            list,
        } => {
            cli::commands::auth::run(service, key, url, list).await?;
        }
        Commands::Analyze {
            path,
            save,
            json,
            model,
        } => {
            cli::commands::analyze::run(path, save, json, model).await?;
        }
        Commands::Paste {
            text,
            doc_type,
            save,
            json,
            model,
        } => {
            cli::commands::paste::run(text, doc_type, save, json, model).await?;
        }
        Commands::History { action } => {
            cli::commands::history::run(action).await?;
        }
        Commands::Define { word, save } => {
            cli::commands::define::run(word, save).await?;
        }
        Commands::Words { action } => {
            cli::commands::words::run(action).await?;
        }
        Commands::Doctor => {
            cli::commands::doctor::run().await?;
        }
    }

    Ok(())
}
