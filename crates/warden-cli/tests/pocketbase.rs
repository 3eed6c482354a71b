//! CLI integration tests against a mock PocketBase server.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    LOGIN_PATH, REFRESH_PATH, auth_body, jwt, session_file, stderr, stdout, warden,
};

async fn login(server: &MockServer, home: &std::path::Path, token: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(token)))
        .mount(server)
        .await;

    let output = warden(
        &["login", "--email", "alice@example.com", "--password", "secret123"],
        home,
        &server.uri(),
    )
    .await;

    assert!(
        output.status.success(),
        "Login failed: {}",
        stderr(&output)
    );
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_login_saves_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    let token = jwt(1);

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&token)))
        .expect(1)
        .mount(&server)
        .await;

    let output = warden(
        &["login", "--email", "alice@example.com", "--password", "secret123"],
        home.path(),
        &server.uri(),
    )
    .await;

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Logged in successfully"));
    assert!(out.contains("alice@example.com"));
    assert!(out.contains("admin"));

    let file = session_file(home.path());
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(stored["token"], token.as_str());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_wrong_password() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "message": "Failed to authenticate.",
            "data": {}
        })))
        .mount(&server)
        .await;

    let output = warden(
        &["login", "--email", "alice@example.com", "--password", "wrong"],
        home.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Login failed"));
    assert!(!session_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_malformed_email() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = warden(
        &["login", "--email", "alice", "--password", "secret123"],
        home.path(),
        &server.uri(),
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid email"));
}

// ============================================================================
// Whoami
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_refreshes_stored_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    let token = jwt(1);
    login(&server, home.path(), &token).await;

    let refreshed = jwt(2);
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(header("authorization", token.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&refreshed)))
        .expect(1)
        .mount(&server)
        .await;

    let output = warden(&["whoami", "--json"], home.path(), &server.uri()).await;

    assert!(output.status.success(), "{}", stderr(&output));
    let user: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["role"], "admin");

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(session_file(home.path())).unwrap())
            .unwrap();
    assert_eq!(stored["token"], refreshed.as_str());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_without_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    let output = warden(&["whoami"], home.path(), &server.uri()).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_rejected_token_clears_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, home.path(), &jwt(1)).await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "message": "The request requires valid record authorization token.",
            "data": {}
        })))
        .mount(&server)
        .await;

    let output = warden(&["whoami"], home.path(), &server.uri()).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No active session"));
    assert!(!session_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_ignores_session_from_other_backend() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&first, home.path(), &jwt(1)).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&second)
        .await;

    let output = warden(&["whoami"], home.path(), &second.uri()).await;

    assert!(!output.status.success());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_removes_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, home.path(), &jwt(1)).await;
    assert!(session_file(home.path()).exists());

    let output = warden(&["logout"], home.path(), &server.uri()).await;

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Logged out"));
    assert!(!session_file(home.path()).exists());

    let output = warden(&["whoami"], home.path(), &server.uri()).await;
    assert!(!output.status.success());
}
