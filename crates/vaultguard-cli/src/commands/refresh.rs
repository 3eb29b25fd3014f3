//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, session: &CliSession) -> Result<()> {
    let identity = session
        .controller()
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed");
    output::field("Email", identity.email());

    Ok(())
}
