//! Server configuration, parsed from the command line.

use crate::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SNAPSHOT_PATH};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Nedis - a minimal in-memory key-value server
#[derive(Parser, Debug, Clone)]
#[command(name = "nedis")]
#[command(version)]
#[command(after_help = "Connect with redis-cli or any Redis client:\n    $ redis-cli -p 6379 PING")]
pub struct Config {
    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Snapshot file loaded at startup and written on shutdown or SAVE
    #[arg(long, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub snapshot: PathBuf,

    /// Keep snapshots in memory only; nothing is read from or written to disk
    #[arg(long)]
    pub no_snapshot: bool,

    /// Log filter, e.g. `debug` or `nedis=trace` (overrides RUST_LOG)
    #[arg(long)]
    pub log: Option<String>,
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The on-disk snapshot path, unless persistence is disabled.
    pub fn snapshot_path(&self) -> Option<&Path> {
        (!self.no_snapshot).then_some(self.snapshot.as_path())
    }
}
