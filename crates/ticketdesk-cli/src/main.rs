//! Ticketdesk CLI
//!
//! Classifies support tickets against the remote classification service,
//! falling back to an offline estimate when it is unavailable, and keeps a
//! per-user history for search, export, and dashboard views.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use ticketdesk_classifiers::{FallbackClassifier, PredictionClient};
use ticketdesk_history::{FileBackend, HistoryStore};
use ticketdesk_service::PredictionService;
use tracing::{info, warn};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::TicketdeskConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    let config = TicketdeskConfig::load(&cli.config, &cli)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    info!("API: {}", config.api_base_url);
    info!("History directory: {}", config.history_dir.display());

    let ctx = config.user_context();
    if ctx.persisted_user().is_none() {
        info!("No user configured, history will not be persisted");
    }

    let backend = FileBackend::new(&config.history_dir).with_context(|| {
        format!(
            "Failed to open history directory {}",
            config.history_dir.display()
        )
    })?;
    let history = Arc::new(HistoryStore::new(Arc::new(backend)));
    let remote = PredictionClient::new(config.client_config())
        .context("Failed to build prediction client")?;
    let fallback = FallbackClassifier::new().context("Failed to build fallback classifier")?;
    let service = PredictionService::new(Arc::new(remote), fallback, history);

    // Unreadable history still leaves predictions usable
    if let Err(e) = service.load_history(&ctx).await {
        warn!("Could not load history: {}", e);
    }

    match cli.command {
        Commands::Predict { subject, body } => {
            commands::predict(&service, &ctx, &subject, &body).await?;
        }
        Commands::History {
            search,
            category,
            page,
        } => {
            let query = commands::build_query(search, category);
            commands::history(&service, &ctx, &query, page);
        }
        Commands::Stats => commands::stats(&service, &ctx),
        Commands::Chart => commands::chart(&service, &ctx),
        Commands::Export {
            search,
            category,
            format,
            out,
        } => {
            let query = commands::build_query(search, category);
            commands::export(&service, &ctx, &query, format, out)?;
        }
        Commands::Clear => commands::clear(&service, &ctx).await?,
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("ticketdesk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ticketdesk=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
