use crate::client::ApiClient;
use instadmin_core::types::{
    AccountId, AccountInsights, ActionResponse, Analytics, AnalyticsQuery, ExportFormat,
};
use instadmin_core::utils::validate_date_range;
use instadmin_core::Result;
use reqwest::Method;

impl ApiClient {
    /// Daily analytics snapshots
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid date range or the API error.
    pub async fn list_analytics(&self, query: &AnalyticsQuery) -> Result<Vec<Analytics>> {
        validate_date_range(query.start_date, query.end_date)?;
        self.get_with("/analytics", query).await
    }

    /// Snapshots of one account over the last `days` days (backend default 30)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn account_analytics(&self, id: AccountId, days: Option<u32>) -> Result<Vec<Analytics>> {
        self.get_with(&format!("/analytics/account/{id}"), &[("days", days)])
            .await
    }

    /// Pull fresh insights from Instagram for a business account
    ///
    /// # Errors
    ///
    /// Returns the API error for non-business accounts.
    pub async fn sync_analytics(&self, id: AccountId) -> Result<ActionResponse> {
        self.post_empty(&format!("/analytics/sync/{id}")).await
    }

    /// Delete every stored snapshot of an account
    ///
    /// The backend refuses without `confirm=true`, which this call always
    /// sends; confirming with the operator is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`instadmin_core::Error::NotFound`] for an unknown account.
    pub async fn delete_account_analytics(&self, id: AccountId) -> Result<ActionResponse> {
        self.delete_with(&format!("/analytics/account/{id}"), &[("confirm", true)])
            .await
    }

    /// Growth, engagement and hashtag insights for an account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn account_insights(&self, id: AccountId, days: Option<u32>) -> Result<AccountInsights> {
        self.get_with(&format!("/analytics/insights/{id}"), &[("days", days)])
            .await
    }

    /// Export an account's snapshots, returned as the raw document
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid date range or the API error.
    pub async fn export_analytics(
        &self,
        id: AccountId,
        format: ExportFormat,
        query: &AnalyticsQuery,
    ) -> Result<String> {
        validate_date_range(query.start_date, query.end_date)?;

        let mut params = vec![("format", format.as_str().to_string())];
        if let Some(start) = query.start_date {
            params.push(("start_date", start.to_string()));
        }
        if let Some(end) = query.end_date {
            params.push(("end_date", end.to_string()));
        }

        self.send_text(
            self.request(Method::GET, &format!("/analytics/export/{id}"))
                .query(&params),
        )
        .await
    }
}
