use crate::client::ApiClient;
use instadmin_core::types::{
    ContentInsights, DashboardStats, HealthStatus, PerformanceMetrics, RecentActivity,
};
use instadmin_core::Result;

impl ApiClient {
    /// Headline numbers for the dashboard cards
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get("/dashboard/stats").await
    }

    /// Recent posts, upcoming schedule and newly connected accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn recent_activity(&self) -> Result<RecentActivity> {
        self.get("/dashboard/recent-activity").await
    }

    /// Totals over the last `days` days (backend default 30)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn performance_metrics(&self, days: Option<u32>) -> Result<PerformanceMetrics> {
        self.get_with("/dashboard/performance-metrics", &[("days", days)])
            .await
    }

    /// Performance by post type, hashtag and hour
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn content_insights(&self) -> Result<ContentInsights> {
        self.get("/dashboard/content-insights").await
    }

    /// Backend liveness
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/dashboard/health").await
    }
}
