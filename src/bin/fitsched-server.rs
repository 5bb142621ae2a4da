// ABOUTME: Main server binary: HTTP API plus the daily session sweep task
// ABOUTME: Loads environment configuration, opens the database, serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! # Fitsched Server Binary
//!
//! Starts the scheduling HTTP API and the background session sweep.

use anyhow::Result;
use clap::Parser;
use fitsched::{
    config::environment::ServerConfig,
    database::Database,
    logging::{init_logging, LoggingConfig},
    reconciler, routes,
    routes::ServerResources,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fitsched-server")]
#[command(about = "Fitsched - Trainer availability and session scheduling API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    init_logging(&LoggingConfig::from_server_config(&config))?;

    info!("Starting Fitsched scheduling API");
    info!(
        timezone = %config.scheduling.timezone,
        slot_granularity_minutes = config.scheduling.slot_granularity_minutes,
        "scheduling configuration loaded"
    );

    let database = Database::new(&config.database_url).await?;
    info!(database_url = %config.database_url, "database ready");

    let sweep_handle = tokio::spawn(reconciler::sweep_loop(
        database.clone(),
        config.scheduling,
    ));

    let resources = Arc::new(ServerResources::new(database, config.clone()));
    let app = routes::router(resources);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep_handle.abort();
    info!("Fitsched server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // SIGTERM matters in containers; ctrl-c covers local runs
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
