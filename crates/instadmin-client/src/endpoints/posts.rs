use crate::client::ApiClient;
use instadmin_core::types::{
    AccountId, ActionResponse, Post, PostAnalytics, PostCreate, PostId, PostQuery, PostStats, PostUpdate,
    PublishResponse,
};
use instadmin_core::Result;
use validator::Validate;

impl ApiClient {
    /// List posts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        self.get_with("/posts", query).await
    }

    /// Get one post
    ///
    /// # Errors
    ///
    /// Returns [`instadmin_core::Error::NotFound`] for an unknown ID.
    pub async fn get_post(&self, id: PostId) -> Result<Post> {
        self.get(&format!("/posts/{id}")).await
    }

    /// Create a draft post
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed payload or the API error.
    pub async fn create_post(&self, post: &PostCreate) -> Result<Post> {
        post.validate()?;
        self.post("/posts", post).await
    }

    /// Update a post
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed payload or the API error.
    pub async fn update_post(&self, id: PostId, update: &PostUpdate) -> Result<Post> {
        update.validate()?;
        self.put(&format!("/posts/{id}"), update).await
    }

    /// Delete a post
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_post(&self, id: PostId) -> Result<ActionResponse> {
        self.delete(&format!("/posts/{id}")).await
    }

    /// Publish a draft immediately
    ///
    /// # Errors
    ///
    /// Returns the API error when the post cannot be published.
    pub async fn publish_post(&self, id: PostId) -> Result<PublishResponse> {
        self.post_empty(&format!("/posts/{id}/publish")).await
    }

    /// Engagement numbers for a published post
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn post_analytics(&self, id: PostId) -> Result<PostAnalytics> {
        self.get(&format!("/posts/{id}/analytics")).await
    }

    /// Aggregate post counters, optionally for one account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn post_stats(&self, account_id: Option<AccountId>) -> Result<PostStats> {
        self.get_with("/posts/stats/overview", &[("account_id", account_id)])
            .await
    }
}
