//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use vaultguard_core::Credentials;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, session: &CliSession) -> Result<()> {
    let credentials = Credentials::new(args.email.trim(), &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let identity = session
        .controller()
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", identity.email());
    output::field("Server", session.server().as_str());

    Ok(())
}
