//! Workload Interference Console CLI
//!
//! Terminal views over the interference analysis platform: app
//! inventories, calibration and profiling curves, interference scores,
//! and cluster placement previews.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{apps, curves, placement};
use console_lib::{ApiClient, DataSyncStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Workload Interference Console CLI
#[derive(Parser)]
#[command(name = "wic")]
#[command(author, version, about = "Console for the workload interference analyzer", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via WIC_API_URL env var)
    #[arg(long, env = "WIC_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List applications known to the platform
    Apps,

    /// Show one application in detail
    App {
        /// Application id
        app_id: String,
    },

    /// Show the calibration curve for an application
    Calibration {
        /// Application id
        app_id: String,

        /// Drop the cached curve and refetch it
        #[arg(long)]
        refresh: bool,
    },

    /// Show profiling curves for a service of an application
    Profiling {
        /// Application id
        app_id: String,

        /// Service name
        service: String,

        /// Drop the cached curves and refetch them
        #[arg(long)]
        refresh: bool,
    },

    /// Show interference scores for a service of an application
    Interference {
        /// Application id
        app_id: String,

        /// Service name
        service: String,

        /// Drop the cached scores and refetch them
        #[arg(long)]
        refresh: bool,
    },

    /// Show the cluster service placement
    Placement {
        /// Show the recommended placement instead of the current one
        #[arg(long)]
        recommended: bool,
    },

    /// Preview the recommended placement against the current one
    Preview,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(fmt::layer().with_target(false))
        .init();

    let api_url = config::resolve_api_url(cli.api_url.as_deref())?;
    let store = DataSyncStore::new(ApiClient::new(&api_url)?);

    match cli.command {
        Commands::Apps => apps::list_apps(&store, cli.format).await?,
        Commands::App { app_id } => apps::show_app(&store, &app_id, cli.format).await?,
        Commands::Calibration { app_id, refresh } => {
            curves::show_calibration(&store, &app_id, refresh, cli.format).await?;
        }
        Commands::Profiling {
            app_id,
            service,
            refresh,
        } => {
            curves::show_profiling(&store, &app_id, &service, refresh, cli.format).await?;
        }
        Commands::Interference {
            app_id,
            service,
            refresh,
        } => {
            curves::show_interference(&store, &app_id, &service, refresh, cli.format).await?;
        }
        Commands::Placement { recommended } => {
            placement::show_placement(&store, recommended, cli.format).await?;
        }
        Commands::Preview => placement::preview(&store, cli.format).await?,
    }

    if cli.verbose {
        let stats = store.stats();
        tracing::debug!(
            cache_hits = stats.cache_hits,
            fetches = stats.fetches,
            joined_flights = stats.joined_flights,
            failures = stats.failures,
            "store counters"
        );
    }

    Ok(())
}
