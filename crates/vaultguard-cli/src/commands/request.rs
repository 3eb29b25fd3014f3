//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use vaultguard_core::{ApiRequest, Method};

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the server URL, e.g. /vault/items
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,
}

pub async fn run(args: RequestArgs, session: &CliSession) -> Result<()> {
    let mut request = ApiRequest::new(args.method, &args.path).context("Invalid request")?;
    if let Some(body) = &args.body {
        let value: serde_json::Value =
            serde_json::from_str(body).context("Request body is not valid JSON")?;
        request = request.with_json(value);
    }

    let response = session
        .controller()
        .request(&request)
        .await
        .context("Request failed")?;

    let status = response.status();
    eprintln!("{}", format!("HTTP {}", status).dimmed());

    match response.json::<serde_json::Value>() {
        Ok(value) => output::json(&value)?,
        Err(_) if response.body().is_empty() => {}
        Err(_) => println!("{}", response.text()),
    }

    response.error_for_status(&request)?;
    Ok(())
}
