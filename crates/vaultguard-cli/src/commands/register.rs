//! Register command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use vaultguard_core::Credentials;
use vaultguard_core::policy;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Email address for the new account
    #[arg(long)]
    pub email: String,

    /// Password (at least 12 characters with upper, lower, digit and symbol)
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: RegisterArgs, session: &CliSession) -> Result<()> {
    let credentials = Credentials::new(args.email.trim(), &args.password);

    if let Err(violations) = policy::validate_registration(&credentials) {
        for violation in &violations {
            output::violation(violation.message());
        }
        bail!("Registration input rejected");
    }

    eprintln!("{}", "Creating account...".dimmed());

    let identity = session
        .controller()
        .register(&credentials)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    output::field("Email", identity.email());
    output::field("Server", session.server().as_str());

    Ok(())
}
