//! Integration tests for cached dashboard state

mod common;

use common::*;
use instadmin_core::Result;
use instadmin_core::config::DashboardConfig;
use instadmin_dashboard::DashboardContext;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_stats(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(api_path("/dashboard/stats")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(stats_json(87))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer, api: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == api_path(api))
        .count()
}

#[tokio::test]
async fn test_first_account_auto_selected() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json(3, "coffee.lab"),
            account_json(7, "roastery")
        ])))
        .mount(&server)
        .await;

    let ctx = test_context(&server)?;
    let accounts = ctx.accounts().await?;
    assert_eq!(accounts.len(), 2);
    assert_eq!(ctx.filter().account_id, Some(3));
    assert_eq!(
        ctx.selected_account().map(|a| a.username),
        Some("coffee.lab".to_string())
    );

    ctx.select_account(accounts.get(1));
    assert_eq!(ctx.filter().account_id, Some(7));

    ctx.select_account(None);
    assert_eq!(ctx.filter().account_id, None);
    assert!(ctx.selected_account().is_none());

    Ok(())
}

#[tokio::test]
async fn test_selection_falls_back_when_account_removed() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json(3, "coffee.lab"),
            account_json(7, "roastery")
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([account_json(3, "coffee.lab")])))
        .mount(&server)
        .await;

    let ctx = test_context(&server)?;
    let accounts = ctx.accounts().await?;
    ctx.select_account(accounts.get(1));
    assert_eq!(ctx.filter().account_id, Some(7));

    ctx.refresh();
    ctx.accounts().await?;
    assert_eq!(ctx.filter().account_id, Some(3));

    Ok(())
}

/// Repeated and concurrent reads share one request while fresh
#[tokio::test]
async fn test_stats_cached_within_stale_time() -> Result<()> {
    let server = MockServer::start().await;
    mount_stats(&server, 1).await;

    let ctx = test_context(&server)?;
    let (first, second) = tokio::join!(ctx.stats(), ctx.stats());
    assert_eq!(first?.total_posts, 87);
    assert_eq!(second?.top_performing_accounts.len(), 1);

    let third = ctx.stats().await?;
    assert!((third.engagement_rate - 3.25).abs() < f64::EPSILON);
    assert_eq!(request_count(&server, "/dashboard/stats").await, 1);

    Ok(())
}

#[tokio::test]
async fn test_refresh_refetches() -> Result<()> {
    let server = MockServer::start().await;
    mount_stats(&server, 2).await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([account_json(1, "solo")])))
        .expect(2)
        .mount(&server)
        .await;

    let ctx = test_context(&server)?;
    ctx.stats().await?;
    ctx.accounts().await?;

    let (stats, accounts) = ctx.reload().await?;
    assert_eq!(stats.total_posts, 87);
    assert_eq!(accounts.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/dashboard/stats")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "database unavailable"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_stats(&server, 1).await;

    let ctx = test_context(&server)?;
    let err = ctx.stats().await;
    assert!(matches!(err, Err(instadmin_core::Error::Api { status: 500, .. })));
    assert!(ctx.cached_stats().is_none());

    assert_eq!(ctx.stats().await?.total_posts, 87);

    Ok(())
}

#[tokio::test]
async fn test_polling_refetches_in_background() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/dashboard/stats")))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json(5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/instagram/accounts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([account_json(2, "polled")])))
        .mount(&server)
        .await;

    let config = DashboardConfig {
        stats_refresh_secs: 1,
        accounts_refresh_secs: 60,
        ..DashboardConfig::default()
    };
    let ctx = DashboardContext::new(test_client(&server)?, config);

    ctx.start_polling();
    ctx.start_polling();
    assert!(ctx.is_polling());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    ctx.stop_polling();
    assert!(!ctx.is_polling());

    // Immediate first tick plus one more for stats, only the first for accounts
    assert_eq!(request_count(&server, "/dashboard/stats").await, 2);
    assert_eq!(request_count(&server, "/instagram/accounts").await, 1);
    assert_eq!(ctx.cached_stats().map(|s| s.total_posts), Some(5));
    assert_eq!(ctx.filter().account_id, Some(2));

    Ok(())
}
