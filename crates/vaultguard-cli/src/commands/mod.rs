//! Subcommand implementations.

mod login;
mod logout;
mod refresh;
mod register;
mod request;
mod strength;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::GlobalArgs;
use crate::session::CliSession;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and log in
    Register(register::RegisterArgs),

    /// Log in with email and password
    Login(login::LoginArgs),

    /// Drop the stored session
    Logout(logout::LogoutArgs),

    /// Display the current identity
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh cookie for a new access token
    Refresh(refresh::RefreshArgs),

    /// Send an authenticated request
    Request(request::RequestArgs),

    /// Check a password against the registration rules
    Strength(strength::StrengthArgs),
}

pub async fn handle(global: GlobalArgs, command: Commands) -> Result<()> {
    // Offline commands never touch the session file.
    let command = match command {
        Commands::Strength(args) => return strength::run(args),
        command => command,
    };

    let session = CliSession::open(&global)?;
    let result = match command {
        Commands::Logout(args) => return logout::run(args, &session).await,
        Commands::Register(args) => register::run(args, &session).await,
        Commands::Login(args) => login::run(args, &session).await,
        Commands::Whoami(args) => whoami::run(args, &session).await,
        Commands::Refresh(args) => refresh::run(args, &session).await,
        Commands::Request(args) => request::run(args, &session).await,
        Commands::Strength(args) => strength::run(args),
    };

    // The server may have rotated the refresh cookie even if the command failed.
    session.persist_cookies()?;
    result
}
