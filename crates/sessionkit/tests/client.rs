//! End-to-end tests: a full `SessionKit` against a mock auth API, with the
//! session persisted to a temporary directory.

use sessionkit::prelude::*;
use sessionkit::store::{FileStorage, MemoryStorage, SessionStore, Storage, StorageOp};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

fn config(server: &MockServer, dir: &tempfile::TempDir) -> ClientConfig {
    ClientConfig {
        api_base_url: format!("{}/api", server.uri()),
        storage_path: dir.path().join("session.json"),
        ..ClientConfig::default()
    }
}

fn session_json(token: &str, username: &str) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "user": { "id": 1, "username": username, "admin": 0, "pro": 0 }
    })
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(token, "alice")))
        .mount(server)
        .await;
}

// =========================================================================
// Login / persistence
// =========================================================================

#[tokio::test]
async fn test_login_persists_session_across_clients() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "tok-1").await;

    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();
    kit.login(&Credentials::new("alice", "pw").remember(true))
        .await
        .unwrap();

    assert!(kit.context().is_authenticated());
    assert!(kit.refresh().is_running());
    assert_eq!(kit.router().current(), "/");
    drop(kit);

    // A second client over the same file picks the session up.
    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();
    assert!(kit.context().is_authenticated());
    assert_eq!(kit.context().current_user().unwrap().username, "alice");
    assert_eq!(kit.context().saved_username().as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_login_bad_credentials_stays_logged_out() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "incorrect username or password"
        })))
        .mount(&server)
        .await;

    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();
    let failure = kit.login(&Credentials::new("alice", "bad")).await.unwrap_err();

    assert_eq!(failure.message, "incorrect username or password");
    assert!(!kit.context().is_authenticated());
    assert!(!kit.refresh().is_running());
    assert_eq!(kit.navigate("/").unwrap(), "/login");
}

#[tokio::test]
async fn test_login_unauthorized_ends_active_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("tok-1", "alice")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();
    kit.login(&Credentials::new("alice", "pw")).await.unwrap();
    assert!(kit.refresh().is_running());

    let failure = kit.login(&Credentials::new("alice", "pw")).await.unwrap_err();

    assert_eq!(failure.status, Some(401));
    assert!(!kit.context().is_authenticated());
    assert!(kit.context().current_user().is_none());
    assert!(!kit.refresh().is_running());
    assert_eq!(kit.router().current(), "/login");
    assert_eq!(kit.navigate("/").unwrap(), "/login");

    let reopened = SessionStore::new(FileStorage::open(dir.path().join("session.json")).unwrap());
    assert_eq!(reopened.load_token().unwrap(), None);
}

// =========================================================================
// Resume
// =========================================================================

#[tokio::test]
async fn test_resume_sends_stored_token_and_refreshes_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer stored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1, "username": "alice", "admin": 1
        })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    storage
        .apply(&[
            StorageOp::set("token", "stored"),
            StorageOp::set("user", r#"{"id":1,"username":"stale"}"#),
        ])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let kit = SessionKit::builder()
        .config(config(&server, &dir))
        .storage(storage)
        .build()
        .unwrap();
    assert_eq!(kit.context().current_user().unwrap().username, "stale");

    let user = kit.resume().await.unwrap().unwrap();

    assert_eq!(user.username, "alice");
    assert!(kit.context().is_admin());
    assert!(kit.refresh().is_running());
}

#[tokio::test]
async fn test_resume_expired_token_logs_out_and_redirects() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // Seed the file with a session the server no longer accepts.
    let file = FileStorage::open(dir.path().join("session.json")).unwrap();
    SessionStore::new(file)
        .save(&Token::new("expired"), &UserProfile::default())
        .unwrap();

    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();
    assert!(kit.context().is_authenticated(), "hydration is optimistic");

    let user = kit.resume().await.unwrap();

    assert!(user.is_none());
    assert!(!kit.context().is_authenticated());
    assert!(!kit.refresh().is_running());
    assert_eq!(kit.router().current(), "/login");
}

#[tokio::test]
async fn test_resume_without_session_skips_network() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();

    assert!(kit.resume().await.unwrap().is_none());
    assert!(!kit.refresh().is_running());
}

// =========================================================================
// Logout / navigation
// =========================================================================

#[tokio::test]
async fn test_logout_clears_everything() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "tok-2").await;

    let kit = SessionKit::builder().config(config(&server, &dir)).build().unwrap();
    kit.login(&Credentials::new("alice", "pw").remember(true))
        .await
        .unwrap();

    kit.logout().unwrap();

    assert!(!kit.context().is_authenticated());
    assert!(!kit.refresh().is_running());
    assert_eq!(kit.router().current(), "/login");
    assert_eq!(kit.context().saved_username(), None);
    assert_eq!(kit.navigate("/signup").unwrap(), "/signup");

    // Nothing left on disk either.
    let reopened = SessionStore::new(FileStorage::open(dir.path().join("session.json")).unwrap());
    assert_eq!(reopened.load_token().unwrap(), None);
    assert_eq!(reopened.load_user().unwrap(), None);
}

#[tokio::test]
async fn test_disabled_guard_admits_protected_route() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let kit = SessionKit::builder()
        .config(ClientConfig {
            guard_enabled: false,
            ..config(&server, &dir)
        })
        .build()
        .unwrap();

    assert_eq!(kit.navigate("/").unwrap(), "/");
}

#[test]
fn test_build_rejects_invalid_api_url() {
    let dir = tempfile::tempdir().unwrap();
    let result = SessionKit::builder()
        .config(ClientConfig {
            api_base_url: "not a url".into(),
            storage_path: dir.path().join("session.json"),
            ..ClientConfig::default()
        })
        .build();

    assert!(matches!(result, Err(SessionKitError::Transport(_))));
}
