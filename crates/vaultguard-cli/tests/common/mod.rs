use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI against `server_url` with its session kept in `data_dir`.
pub fn run_cli_with_env(args: &[&str], data_dir: &Path, server_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vaultguard"));
    cmd.args(args);
    cmd.env("VAULTGUARD_DATA_DIR", data_dir);
    cmd.env("VAULTGUARD_SERVER", server_url);
    cmd.env("NO_COLOR", "1");
    cmd.env("CLICOLOR", "0");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so a mock server can answer it.
pub async fn run_cli(args: &[&str], data_dir: &Path, server_url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let data_dir = data_dir.to_path_buf();
    let server_url = server_url.to_string();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &data_dir, &server_url)
    })
    .await
    .expect("CLI task panicked")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], data_dir: &Path, server_url: &str) -> String {
    let output = run_cli(args, data_dir, server_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Read the session file the CLI writes into `data_dir`.
pub fn session_file(data_dir: &Path) -> serde_json::Value {
    let json = std::fs::read_to_string(data_dir.join("session.json")).expect("no session file");
    serde_json::from_str(&json).expect("invalid session file")
}
