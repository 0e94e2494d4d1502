//! End-to-end tests for the storefront binary against a mock backend.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{run_cli_with_env, run_cli_with_env_success, stderr};

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refreshToken=r1; Path=/; HttpOnly")
                .set_body_json(json!({ "success": true, "data": token })),
        )
        .mount(server)
        .await;
}

async fn login(server: &MockServer, dir: &TempDir) {
    run_cli_with_env_success(
        &["login", "--email", "a@shop.example", "--password", "pw"],
        dir.path(),
        &server.uri(),
    )
    .await;
}

fn credentials(dir: &TempDir) -> Option<String> {
    std::fs::read_to_string(dir.path().join("credentials.json")).ok()
}

fn cookies(dir: &TempDir) -> Option<String> {
    std::fs::read_to_string(dir.path().join("cookies.json")).ok()
}

#[tokio::test]
async fn status_without_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let stdout = run_cli_with_env_success(&["status"], dir.path(), &server.uri()).await;

    assert!(stdout.contains("Not logged in"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_persists_credential() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "T1").await;

    login(&server, &dir).await;

    let stored = credentials(&dir).expect("credentials written");
    assert!(stored.contains("T1"));
    let jar = cookies(&dir).expect("cookies written");
    assert!(jar.contains("refreshToken"));

    let stdout = run_cli_with_env_success(&["status"], dir.path(), &server.uri()).await;
    assert!(stdout.contains("Logged in"));
}

#[tokio::test]
async fn login_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let output = run_cli_with_env(
        &["login", "--email", "a@shop.example", "--password", "bad"],
        dir.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid credentials"));
    assert!(credentials(&dir).is_none());
}

#[tokio::test]
async fn request_refreshes_expired_credential() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "T1").await;
    login(&server, &dir).await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/regenerate-token"))
        .and(header("cookie", "refreshToken=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "T2" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orders": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_with_env_success(&["request", "GET", "/orders"], dir.path(), &server.uri()).await;

    assert!(stdout.contains("\"orders\""));
    let stored = credentials(&dir).expect("credentials kept");
    assert!(stored.contains("T2"));
    assert!(!stored.contains("T1"));
}

#[tokio::test]
async fn failed_refresh_ends_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "T1").await;
    login(&server, &dir).await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/regenerate-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_cli_with_env(&["request", "GET", "/orders"], dir.path(), &server.uri()).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Session expired"));
    assert!(credentials(&dir).is_none());
    assert!(cookies(&dir).is_none());

    let stdout = run_cli_with_env_success(&["status"], dir.path(), &server.uri()).await;
    assert!(stdout.contains("Not logged in"));
}

#[tokio::test]
async fn business_error_is_reported_without_refresh() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "message": "Out of stock" })))
        .mount(&server)
        .await;

    let output = run_cli_with_env(
        &["request", "POST", "/cart", "--data", r#"{"sku":"A1"}"#],
        dir.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Out of stock"));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body_json::<serde_json::Value>().unwrap(), json!({ "sku": "A1" }));
}

#[tokio::test]
async fn logout_forgets_credential() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "T1").await;
    login(&server, &dir).await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_with_env_success(&["logout"], dir.path(), &server.uri()).await;

    assert!(stdout.contains("Logged out"));
    assert!(credentials(&dir).is_none());
    assert!(cookies(&dir).is_none());
}

#[tokio::test]
async fn whoami_requires_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let output = run_cli_with_env(&["whoami"], dir.path(), &server.uri()).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No active session"));
}
