//! vaultguard - command-line client for VaultGuard sessions.
//!
//! A thin front end over `vaultguard-core`: it persists the session in the
//! user's data directory and drives login, logout and authenticated
//! requests against a VaultGuard server.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    commands::handle(cli.global, cli.command).await
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` overrides the `-v` count. HTTP internals stay quiet unless
/// asked for explicitly, and targets are only shown from `-vv` up.
fn init_logging(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},hyper_util=warn,reqwest=info")));

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(verbosity >= 2)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
