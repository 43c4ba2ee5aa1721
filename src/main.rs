//! Nedis - A Minimal In-Memory Key-Value Server
//!
//! This is the main entry point for the Nedis server.
//! It restores the last snapshot, sets up the TCP listener, and handles
//! incoming connections until Ctrl+C, then writes a final snapshot.

use anyhow::Context;
use clap::Parser;
use nedis::commands::CommandHandler;
use nedis::config::Config;
use nedis::connection::{handle_connection, ConnectionStats};
use nedis::storage::{FileSnapshot, MemorySnapshot, Snapshot, StorageEngine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &Config) {
    let persistence = match config.snapshot_path() {
        Some(path) => path.display().to_string(),
        None => "disabled".to_string(),
    };

    println!(
        r#"
Nedis v{} - Minimal In-Memory Key-Value Server
──────────────────────────────────────────────────────────────
Listening on {}
Snapshot:    {}

Use Ctrl+C to shutdown gracefully.
"#,
        nedis::VERSION,
        config.bind_address(),
        persistence,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Set up logging; --log wins over RUST_LOG
    let filter = match &config.log {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{}'", directives))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let snapshot: Box<dyn Snapshot> = match config.snapshot_path() {
        Some(path) => Box::new(FileSnapshot::new(path)),
        None => {
            warn!("Persistence disabled, data will not survive a restart");
            Box::new(MemorySnapshot::new())
        }
    };

    // Create the storage engine (shared across all connections)
    let storage = Arc::new(
        StorageEngine::open(snapshot).context("failed to restore the keyspace snapshot")?,
    );

    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("Listening on {}", config.bind_address());

    print_banner(&config);

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&storage), stats) => {}
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
            info!("Shutdown signal received, stopping server...");
        }
    }

    // A failed final snapshot is reported but does not block exit.
    if let Err(e) = storage.shutdown() {
        error!(error = %e, "Failed to write the final snapshot");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Create a command handler for this connection
                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
