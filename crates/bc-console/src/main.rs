//! Build Console RS
//!
//! Terminal front end: list entity pages and follow build status changes.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bc_core::config::ConsoleConfig;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.json);

    dotenvy::dotenv().ok();
    let config = ConsoleConfig::load(cli.config.as_deref())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api.base_url,
        "Starting Build Console RS"
    );

    match cli.command {
        Commands::List {
            entity,
            page,
            size,
            query,
            sort,
        } => commands::list(&config, entity, page, size, query, sort).await,
        Commands::Follow { size } => commands::follow(&config, size).await,
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,bc_client=debug,bc_notifications=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
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
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
