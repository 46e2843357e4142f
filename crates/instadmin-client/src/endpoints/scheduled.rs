use crate::client::ApiClient;
use chrono::Utc;
use instadmin_core::types::{
    AccountId, ActionResponse, Calendar, ScheduledPost, ScheduledPostCreate, ScheduledPostId,
    ScheduledPostStats, ScheduledPostUpdate, ScheduledQuery,
};
use instadmin_core::utils::validate_future_time;
use instadmin_core::{Error, Result};
use validator::Validate;

impl ApiClient {
    /// List scheduled posts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_scheduled(&self, query: &ScheduledQuery) -> Result<Vec<ScheduledPost>> {
        self.get_with("/scheduled", query).await
    }

    /// Get one scheduled post
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_scheduled(&self, id: ScheduledPostId) -> Result<ScheduledPost> {
        self.get(&format!("/scheduled/{id}")).await
    }

    /// Queue a post for publication
    ///
    /// # Errors
    ///
    /// Returns a validation error for a past time or malformed payload, or
    /// the API error.
    pub async fn create_scheduled(&self, scheduled: &ScheduledPostCreate) -> Result<ScheduledPost> {
        scheduled.validate()?;
        validate_future_time(scheduled.scheduled_for, Utc::now())?;
        self.post("/scheduled", scheduled).await
    }

    /// Update a scheduled post
    ///
    /// # Errors
    ///
    /// Returns a validation error for a past time or malformed payload, or
    /// the API error.
    pub async fn update_scheduled(
        &self,
        id: ScheduledPostId,
        update: &ScheduledPostUpdate,
    ) -> Result<ScheduledPost> {
        update.validate()?;
        if let Some(when) = update.scheduled_for {
            validate_future_time(when, Utc::now())?;
        }
        self.put(&format!("/scheduled/{id}"), update).await
    }

    /// Cancel a scheduled post; the backend keeps the record as `cancelled`
    ///
    /// # Errors
    ///
    /// Returns the API error when the post was already published.
    pub async fn cancel_scheduled(&self, id: ScheduledPostId) -> Result<ActionResponse> {
        self.delete(&format!("/scheduled/{id}")).await
    }

    /// Publish a pending post now instead of at its scheduled time
    ///
    /// # Errors
    ///
    /// Returns the API error when the post is not pending.
    pub async fn execute_scheduled(&self, id: ScheduledPostId) -> Result<ActionResponse> {
        self.post_empty(&format!("/scheduled/{id}/execute")).await
    }

    /// Counters by status
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn scheduled_stats(&self, account_id: Option<AccountId>) -> Result<ScheduledPostStats> {
        self.get_with("/scheduled/stats/overview", &[("account_id", account_id)])
            .await
    }

    /// Scheduled posts of a month grouped by day
    ///
    /// # Errors
    ///
    /// Returns a validation error for a month outside `1..=12` or the API error.
    pub async fn scheduled_calendar(
        &self,
        year: i32,
        month: u32,
        account_id: Option<AccountId>,
    ) -> Result<Calendar> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation("month", "Month must be between 1 and 12"));
        }
        self.get_with(
            &format!("/scheduled/calendar/{year}/{month}"),
            &[("account_id", account_id)],
        )
        .await
    }
}
