//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, session: &CliSession) -> Result<()> {
    session.controller().logout().await;
    session.forget_cookies()?;

    output::success("Logged out");
    Ok(())
}
