//! GitHub Repository Exporter
//!
//! Serves repository statistics of the configured GitHub users and
//! organizations on `/metrics`, refreshed on a fixed interval.

use std::sync::Arc;

use clap::Parser;
use github_exporter::{
    collection::{CollectionSettings, Collector, Scheduler},
    config::{Cli, ExporterConfig},
    github::{ClientConfig, Fetcher, GitHubClient},
    metrics::{MetricsServer, MetricsServerConfig, MetricsStore},
};
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("GitHub Exporter v{}", github_exporter::VERSION);

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: ExporterConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        port = config.port,
        interval = %humantime::format_duration(config.interval),
        users = ?config.users,
        orgs = ?config.orgs,
        skip_forks = config.skip_forks,
        authenticated = config.credentials.is_some(),
        cache = config.cache,
        "Configuration loaded"
    );

    let store = Arc::new(MetricsStore::new()?);
    let client = GitHubClient::new(ClientConfig::from(&config))?;
    let collector = Collector::new(
        Fetcher::new(client),
        store.clone(),
        CollectionSettings::from(&config),
    );
    let scheduler = Arc::new(Scheduler::new(collector, config.interval));

    let server = MetricsServer::bind(&MetricsServerConfig::with_port(config.port), store).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let collection = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(shutdown_rx).await }
    });

    server
        .serve(async move {
            shutdown_signal().await;
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if collection.await.is_err() {
        error!("Collection task terminated abnormally");
    }

    info!("Done");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
