//! Integration tests for the auth provider

mod common;

use chrono::Utc;
use common::*;
use instadmin_client::{ApiClient, MemoryTokenStore, Session, StoredToken, TokenStore};
use instadmin_core::config::ApiConfig;
use instadmin_core::types::Token;
use instadmin_core::{Error, Result};
use instadmin_dashboard::AuthProvider;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_loads_admin() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-admin").await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/me")))
        .and(header("authorization", "Bearer tok-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthProvider::new(test_client(&server)?);
    assert!(auth.current_admin().is_none());

    let admin = auth.login("admin@example.com", "hunter22").await?;
    assert_eq!(admin.email, "admin@example.com");
    assert!(auth.is_authenticated());
    assert_eq!(auth.current_admin().map(|a| a.id), Some(1));
    assert_eq!(auth.take_redirect(), None);

    Ok(())
}

/// A 401 on any request drops the admin and asks for the login page
#[tokio::test]
async fn test_expired_session_redirects_to_login() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-short").await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .mount(&server)
        .await;

    let auth = AuthProvider::new(test_client(&server)?);
    auth.login("admin@example.com", "hunter22").await?;

    let result = auth.client().list_accounts(&Default::default()).await;
    assert!(matches!(result, Err(Error::Unauthorized)));

    assert!(!auth.is_authenticated());
    assert!(auth.current_admin().is_none());
    assert_eq!(auth.take_redirect().as_deref(), Some("/login"));
    // Consumed on read
    assert_eq!(auth.take_redirect(), None);

    Ok(())
}

#[tokio::test]
async fn test_initialize_without_session() -> Result<()> {
    let server = MockServer::start().await;
    let auth = AuthProvider::new(test_client(&server)?);

    assert_eq!(auth.initialize().await?, None);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

/// A stored token the backend rejects ends as "not logged in", not an error
#[tokio::test]
async fn test_initialize_with_rejected_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/me")))
        .and(header("authorization", "Bearer tok-revoked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let token = Token {
        access_token: "tok-revoked".to_string(),
        token_type: "bearer".to_string(),
        expires_in: None,
    };
    store.save(&StoredToken::from_token(&token, Utc::now())).await?;

    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    let client = ApiClient::new(&config, Session::new(store.clone(), "/login"))?;
    let auth = AuthProvider::new(client);

    assert_eq!(auth.initialize().await?, None);
    assert!(!auth.is_authenticated());
    assert!(store.load().await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_logout_forgets_admin() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "tok-bye").await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json()))
        .mount(&server)
        .await;

    let auth = AuthProvider::new(test_client(&server)?);
    auth.login("admin@example.com", "hunter22").await?;
    auth.logout().await?;

    assert!(!auth.is_authenticated());
    assert!(auth.current_admin().is_none());
    assert_eq!(auth.take_redirect(), None);

    Ok(())
}
