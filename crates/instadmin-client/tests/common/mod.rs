//! Shared fixtures for client integration tests

#![allow(dead_code)]

use instadmin_client::{ApiClient, Session};
use instadmin_core::Result;
use instadmin_core::config::ApiConfig;
use serde_json::{Value, json};
use wiremock::MockServer;

/// API configuration pointing at a mock server
pub fn test_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    }
}

/// Client with an in-memory session
pub fn test_client(server: &MockServer) -> Result<ApiClient> {
    ApiClient::new(&test_config(server), Session::in_memory())
}

/// Path under the default `/api/v1` prefix
pub fn api_path(path: &str) -> String {
    format!("/api/v1{path}")
}

pub fn token_json(token: &str) -> Value {
    json!({"access_token": token, "token_type": "bearer"})
}

pub fn admin_json() -> Value {
    json!({
        "id": 1,
        "email": "admin@example.com",
        "full_name": "Site Admin",
        "is_active": true,
        "is_superuser": true,
        "created_at": "2024-01-01T08:00:00",
        "last_login": "2024-06-01T09:15:00"
    })
}

pub fn account_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "instagram_user_id": format!("1784140000000{id}"),
        "followers_count": 1500 * id,
        "following_count": 200,
        "posts_count": 40,
        "is_active": true,
        "is_business_account": true,
        "created_at": "2024-02-01T10:00:00"
    })
}

pub fn post_json(id: i64, account_id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "account_id": account_id,
        "caption": format!("Post number {id}"),
        "hashtags": ["coffee"],
        "post_type": "feed",
        "status": status,
        "likes_count": 12,
        "comments_count": 3,
        "created_at": "2024-05-01T12:00:00"
    })
}

pub fn scheduled_json(id: i64, account_id: i64, status: &str, scheduled_for: &str) -> Value {
    json!({
        "id": id,
        "account_id": account_id,
        "caption": format!("Scheduled {id}"),
        "post_type": "feed",
        "scheduled_for": scheduled_for,
        "status": status,
        "retry_count": 0,
        "max_retries": 3,
        "created_at": "2024-05-01T12:00:00"
    })
}

pub fn media_json(id: i64, file_name: &str) -> Value {
    json!({
        "id": id,
        "filename": format!("stored_{file_name}"),
        "original_filename": file_name,
        "file_path": format!("uploads/stored_{file_name}"),
        "file_size": 2048,
        "mime_type": "image/jpeg",
        "media_type": "image",
        "status": "ready",
        "alt_text": "A latte",
        "created_at": "2024-05-01T12:00:00"
    })
}
