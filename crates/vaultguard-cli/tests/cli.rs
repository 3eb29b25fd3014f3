//! CLI integration tests against a mock VaultGuard server.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{run_cli, run_cli_success, run_cli_with_env, session_file};

const EMAIL: &str = "a@b.com";
const PASSWORD: &str = "GoodPass123!";

/// Login issues "T" and a refresh cookie; "T" belongs to `EMAIL`.
async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": EMAIL, "password": PASSWORD})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=r1; HttpOnly; Path=/auth")
                .set_body_json(json!({"access_token": "T", "token_type": "bearer"})),
        )
        .mount(server)
        .await;
    mount_identity(server, "T").await;
}

async fn mount_identity(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "email": EMAIL})))
        .mount(server)
        .await;
}

/// Refresh succeeds only with the cookie set at login.
async fn mount_refresh(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("cookie", "refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": token})))
        .mount(server)
        .await;
}

#[test]
fn test_strength_scores_password() {
    let data_dir = TempDir::new().unwrap();

    let output = run_cli_with_env(
        &["strength", "password"],
        data_dir.path(),
        "http://localhost:8000",
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Score: 1/5"), "stdout: {stdout}");
    assert!(!data_dir.path().join("session.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_rejects_weak_password_locally() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    let output = run_cli(
        &["register", "--email", "not-an-email", "--password", "short"],
        data_dir.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid email address"), "stderr: {stderr}");
    assert!(stderr.contains("Password must be at least 12 characters"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_then_logged_in() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "email": EMAIL})))
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server).await;

    let stdout = run_cli_success(
        &["register", "--email", EMAIL, "--password", PASSWORD],
        data_dir.path(),
        &server.uri(),
    )
    .await;

    assert!(stdout.contains("Account created"));
    assert_eq!(session_file(data_dir.path())["values"]["accessToken"], "T");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_token_and_cookie() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    mount_login(&server).await;

    let stdout = run_cli_success(
        &["login", "--email", EMAIL, "--password", PASSWORD],
        data_dir.path(),
        &server.uri(),
    )
    .await;
    assert!(stdout.contains("Logged in successfully"));
    assert!(stdout.contains(EMAIL));

    let stored = session_file(data_dir.path());
    assert_eq!(stored["values"]["accessToken"], "T");
    assert_eq!(stored["values"]["refreshCookie"], "refresh_token=r1");

    // A new process recovers the session from the stored token.
    let stdout = run_cli_success(&["whoami"], data_dir.path(), &server.uri()).await;
    assert!(stdout.contains(&format!("Email: {EMAIL}")), "stdout: {stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let output = run_cli(
        &["login", "--email", EMAIL, "--password", "WrongPass123!"],
        data_dir.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to login"), "stderr: {stderr}");

    let stdout = run_cli_success(&["whoami"], data_dir.path(), &server.uri()).await;
    assert!(stdout.contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_without_session() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    let stdout = run_cli_success(&["whoami"], data_dir.path(), &server.uri()).await;
    assert!(stdout.contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_recovers_through_persisted_cookie() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_refresh(&server, "T2").await;
    mount_identity(&server, "T2").await;

    run_cli_success(
        &["login", "--email", EMAIL, "--password", PASSWORD],
        data_dir.path(),
        &server.uri(),
    )
    .await;

    // The server no longer accepts the stored token.
    server.reset().await;
    mount_refresh(&server, "T2").await;
    mount_identity(&server, "T2").await;

    let stdout = run_cli_success(&["whoami", "--json"], data_dir.path(), &server.uri()).await;
    let identity: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(identity["email"], EMAIL);
    assert_eq!(session_file(data_dir.path())["values"]["accessToken"], "T2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_forgets_session() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_refresh(&server, "T2").await;

    run_cli_success(
        &["login", "--email", EMAIL, "--password", PASSWORD],
        data_dir.path(),
        &server.uri(),
    )
    .await;
    let stdout = run_cli_success(&["logout"], data_dir.path(), &server.uri()).await;
    assert!(stdout.contains("Logged out"));

    let stored = session_file(data_dir.path());
    assert!(stored["values"].get("accessToken").is_none());
    assert!(stored["values"].get("refreshCookie").is_none());

    let stdout = run_cli_success(&["whoami"], data_dir.path(), &server.uri()).await;
    assert!(stdout.contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_retries_after_refresh() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_refresh(&server, "T2").await;
    mount_identity(&server, "T2").await;

    Mock::given(method("GET"))
        .and(path("/vault/items"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vault/items"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "bank"}])))
        .mount(&server)
        .await;

    run_cli_success(
        &["login", "--email", EMAIL, "--password", PASSWORD],
        data_dir.path(),
        &server.uri(),
    )
    .await;
    let stdout = run_cli_success(
        &["request", "GET", "/vault/items"],
        data_dir.path(),
        &server.uri(),
    )
    .await;

    let items: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(items[0]["name"], "bank");
    assert_eq!(session_file(data_dir.path())["values"]["accessToken"], "T2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_failure_exits_non_zero() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    mount_login(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/vault/items/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&server)
        .await;

    run_cli_success(
        &["login", "--email", EMAIL, "--password", PASSWORD],
        data_dir.path(),
        &server.uri(),
    )
    .await;
    let output = run_cli(
        &["request", "delete", "/vault/items/9"],
        data_dir.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTP 404"), "stderr: {stderr}");
    assert!(stderr.contains("Not found"));
}
