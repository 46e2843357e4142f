//! Shared fixtures for dashboard integration tests

#![allow(dead_code)]

use instadmin_client::{ApiClient, Session};
use instadmin_core::Result;
use instadmin_core::config::{ApiConfig, DashboardConfig};
use instadmin_dashboard::DashboardContext;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client with an in-memory session against the mock server
pub fn test_client(server: &MockServer) -> Result<ApiClient> {
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    ApiClient::new(&config, Session::in_memory())
}

/// Dashboard context with default refresh settings
pub fn test_context(server: &MockServer) -> Result<DashboardContext> {
    Ok(DashboardContext::new(
        test_client(server)?,
        DashboardConfig::default(),
    ))
}

/// Path under the default `/api/v1` prefix
pub fn api_path(path: &str) -> String {
    format!("/api/v1{path}")
}

pub fn admin_json() -> Value {
    json!({
        "id": 1,
        "email": "admin@example.com",
        "full_name": "Site Admin",
        "is_active": true,
        "is_superuser": true,
        "created_at": "2024-01-01T08:00:00"
    })
}

pub fn account_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "instagram_user_id": format!("1784140000000{id}"),
        "followers_count": 1000 * id,
        "following_count": 150,
        "posts_count": 25,
        "is_active": true,
        "is_business_account": true,
        "created_at": "2024-02-01T10:00:00"
    })
}

pub fn stats_json(total_posts: u64) -> Value {
    json!({
        "total_accounts": 2,
        "active_accounts": 2,
        "total_followers": 3000,
        "total_posts": total_posts,
        "scheduled_posts": 4,
        "engagement_rate": 3.25,
        "top_performing_accounts": [
            {"id": 2, "username": "roastery", "followers_count": 2000, "posts_count": 12, "engagement_rate": 4.1}
        ]
    })
}

/// Answer logins with `token`
pub async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": token, "token_type": "bearer"})),
        )
        .mount(server)
        .await;
}
