//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Commands;

/// Command-line client for VaultGuard sessions.
#[derive(Parser, Debug)]
#[command(name = "vaultguard")]
#[command(author, version = env!("VAULTGUARD_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the server is and where the session is kept.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// VaultGuard server base URL
    #[arg(
        long,
        env = "VAULTGUARD_SERVER",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub server: String,

    /// Fail requests that take longer than this many seconds
    #[arg(long, env = "VAULTGUARD_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Directory holding the session file
    #[arg(long, env = "VAULTGUARD_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}
