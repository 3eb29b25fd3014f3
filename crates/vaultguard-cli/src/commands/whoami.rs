//! Whoami command implementation.

use anyhow::Result;
use clap::Args;

use vaultguard_core::SessionState;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the identity as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, session: &CliSession) -> Result<()> {
    let state = session.controller().recover().await;

    match state {
        SessionState::Authenticated(identity) if args.json => output::json(&identity)?,
        SessionState::Authenticated(identity) => {
            output::field("Email", identity.email());
            output::field("Server", session.server().as_str());
        }
        _ => println!("Not logged in"),
    }

    Ok(())
}
