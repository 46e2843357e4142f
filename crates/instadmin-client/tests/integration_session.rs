//! Integration tests for token handling across requests

mod common;

use common::*;
use instadmin_client::{ApiClient, FileTokenStore, Session, SessionEvent, TokenStore};
use instadmin_core::types::{InstagramAccountUpdate, PostCreate, PostType};
use instadmin_core::{Error, Result};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=admin%40example.com"))
        .and(body_string_contains("password=hunter22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json(token)))
        .expect(1)
        .mount(server)
        .await;
}

/// Login stores the token and every later request carries it
#[tokio::test]
async fn test_token_attached_after_login() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-123").await;

    Mock::given(method("GET"))
        .and(path(api_path("/admin/me")))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([account_json(1, "coffee.lab")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server)?;
    let mut events = client.session().subscribe();

    let token = client.login("admin@example.com", "hunter22").await?;
    assert_eq!(token.access_token, "tok-123");
    assert!(client.session().is_authenticated());
    assert_eq!(events.recv().await.ok(), Some(SessionEvent::LoggedIn));

    let admin = client.me().await?;
    assert_eq!(admin.email, "admin@example.com");

    let accounts = client.list_accounts(&Default::default()).await?;
    assert_eq!(accounts.len(), 1);

    Ok(())
}

/// No Authorization header is sent before login or after logout
#[tokio::test]
async fn test_no_token_without_session() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1").await;

    Mock::given(method("GET"))
        .and(path(api_path("/dashboard/health")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "timestamp": "2024-06-01T10:00:00",
            "service": "instagram-manager-api"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server)?;
    client.health().await?;

    client.login("admin@example.com", "hunter22").await?;
    client.logout().await?;
    assert!(!client.session().is_authenticated());

    let health = client.health().await?;
    assert_eq!(health.status, "healthy");

    let requests = server.received_requests().await.unwrap_or_default();
    let health_requests: Vec<_> = requests
        .iter()
        .filter(|request| request.url.path() == api_path("/dashboard/health"))
        .collect();
    assert_eq!(health_requests.len(), 2);
    assert!(
        health_requests
            .iter()
            .all(|request| !request.headers.contains_key("authorization"))
    );

    Ok(())
}

/// A 401 from any endpoint clears the stored token and signals the login redirect
#[tokio::test]
async fn test_unauthorized_expires_session() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-stale").await;

    Mock::given(method("GET"))
        .and(path(api_path("/dashboard/stats")))
        .and(header_exists("authorization"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "Token non valido"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("session.json");
    let store = Arc::new(FileTokenStore::new(&token_file));
    let session = Session::new(store.clone(), "/login");
    let client = ApiClient::new(&test_config(&server), session)?;

    client.login("admin@example.com", "hunter22").await?;
    assert!(token_file.exists());

    let mut events = client.session().subscribe();
    let err = client.dashboard_stats().await;

    assert!(matches!(err, Err(Error::Unauthorized)));
    assert!(!client.session().is_authenticated());
    assert!(!token_file.exists());
    assert!(store.load().await?.is_none());
    assert_eq!(
        events.recv().await.ok(),
        Some(SessionEvent::Expired {
            redirect_to: "/login".to_string()
        })
    );

    Ok(())
}

/// Wrong credentials are reported with the backend's message and leave the
/// session alone
#[tokio::test]
async fn test_rejected_login_keeps_detail_and_session() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-valid").await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .and(body_string_contains("password=wrong-password"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Email o password incorretti"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("session.json");
    let session = Session::new(Arc::new(FileTokenStore::new(&token_file)), "/login");
    let client = ApiClient::new(&test_config(&server), session)?;

    client.login("admin@example.com", "hunter22").await?;
    let mut events = client.session().subscribe();

    let err = client.login("admin@example.com", "wrong-password").await;

    match err {
        Err(Error::InvalidCredentials { message }) => {
            assert_eq!(message, "Email o password incorretti");
        }
        other => return Err(Error::Other(format!("unexpected result: {other:?}"))),
    }
    assert!(client.session().is_authenticated());
    assert_eq!(client.session().bearer().as_deref(), Some("Bearer tok-valid"));
    assert!(token_file.exists());
    assert!(events.try_recv().is_err());

    Ok(())
}

/// A rejected login without a body still gets a readable message
#[tokio::test]
async fn test_rejected_login_without_detail() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server)?;
    let err = client.login("admin@example.com", "nope").await;

    assert!(matches!(err, Err(Error::InvalidCredentials { ref message }) if !message.is_empty()));
    assert!(!err.is_err_and(|e| e.is_unauthorized()));

    Ok(())
}

/// Write requests of each shape that can come back 401
#[derive(Debug, Clone, Copy)]
enum WriteCall {
    CreatePost,
    UpdateAccount,
    DeletePost,
    UploadMedia,
}

impl WriteCall {
    async fn run(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::CreatePost => {
                let post = PostCreate {
                    account_id: 1,
                    caption: Some("Hello".to_string()),
                    hashtags: None,
                    post_type: PostType::Feed,
                    location_id: None,
                    location_name: None,
                    media_files: None,
                };
                client.create_post(&post).await.map(drop)
            }
            Self::UpdateAccount => {
                let update = InstagramAccountUpdate {
                    is_active: Some(false),
                    ..InstagramAccountUpdate::default()
                };
                client.update_account(1, &update).await.map(drop)
            }
            Self::DeletePost => client.delete_post(7).await.map(drop),
            Self::UploadMedia => client
                .upload_media_bytes("latte.jpg", vec![0xFF, 0xD8, 0xFF], Some("A latte"))
                .await
                .map(drop),
        }
    }
}

/// Every method and body kind expires the session on 401, not only GETs
#[rstest]
#[case::post_json(WriteCall::CreatePost, "POST", "/posts")]
#[case::put_json(WriteCall::UpdateAccount, "PUT", "/instagram/accounts/1")]
#[case::delete(WriteCall::DeletePost, "DELETE", "/posts/7")]
#[case::multipart_upload(WriteCall::UploadMedia, "POST", "/media/upload")]
#[tokio::test]
async fn test_unauthorized_write_expires_session(
    #[case] write: WriteCall,
    #[case] verb: &str,
    #[case] route: &str,
) -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-revoked").await;
    Mock::given(method(verb))
        .and(path(api_path(route)))
        .and(header("authorization", "Bearer tok-revoked"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "Token revocato"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("session.json");
    let session = Session::new(Arc::new(FileTokenStore::new(&token_file)), "/login");
    let client = ApiClient::new(&test_config(&server), session)?;
    client.login("admin@example.com", "hunter22").await?;
    let mut events = client.session().subscribe();

    let result = write.run(&client).await;

    assert!(matches!(result, Err(Error::Unauthorized)), "{write:?}: {result:?}");
    assert!(!client.session().is_authenticated());
    assert!(!token_file.exists());
    assert_eq!(
        events.recv().await.ok(),
        Some(SessionEvent::Expired {
            redirect_to: "/login".to_string()
        })
    );

    Ok(())
}

/// A token persisted by one run is picked up by the next
#[tokio::test]
async fn test_restored_token_is_attached() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-persisted").await;

    Mock::given(method("GET"))
        .and(path(api_path("/admin/me")))
        .and(header("authorization", "Bearer tok-persisted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("session.json");

    let first = ApiClient::new(
        &test_config(&server),
        Session::new(Arc::new(FileTokenStore::new(&token_file)), "/login"),
    )?;
    first.login("admin@example.com", "hunter22").await?;

    let session = Session::new(Arc::new(FileTokenStore::new(&token_file)), "/login");
    assert!(session.restore().await?);
    let second = ApiClient::new(&test_config(&server), session)?;
    second.me().await?;

    Ok(())
}

/// Blank credentials never reach the backend
#[tokio::test]
async fn test_blank_credentials_rejected_locally() -> Result<()> {
    let server = MockServer::start().await;
    let client = test_client(&server)?;

    let err = client.login("", "hunter22").await;
    assert!(matches!(err, Err(Error::Validation { .. })));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}
