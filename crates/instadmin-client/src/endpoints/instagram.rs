use crate::client::ApiClient;
use instadmin_core::types::{
    AccountActionResponse, AccountId, AccountQuery, AccountStats, ActionResponse,
    InstagramAccount, InstagramAccountUpdate, InstagramAuthUrl, InstagramTokenExchange,
};
use instadmin_core::Result;
use validator::Validate;

impl ApiClient {
    /// List connected accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_accounts(&self, query: &AccountQuery) -> Result<Vec<InstagramAccount>> {
        self.get_with("/instagram/accounts", query).await
    }

    /// Get one account
    ///
    /// # Errors
    ///
    /// Returns [`instadmin_core::Error::NotFound`] for an unknown ID.
    pub async fn get_account(&self, id: AccountId) -> Result<InstagramAccount> {
        self.get(&format!("/instagram/accounts/{id}")).await
    }

    /// Update account metadata
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed payload or the API error.
    pub async fn update_account(
        &self,
        id: AccountId,
        update: &InstagramAccountUpdate,
    ) -> Result<InstagramAccount> {
        update.validate()?;
        self.put(&format!("/instagram/accounts/{id}"), update).await
    }

    /// Ask the backend to refresh an account from Instagram
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sync_account(&self, id: AccountId) -> Result<AccountActionResponse> {
        self.post_empty(&format!("/instagram/accounts/{id}/sync"))
            .await
    }

    /// Disconnect an account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_account(&self, id: AccountId) -> Result<ActionResponse> {
        self.delete(&format!("/instagram/accounts/{id}")).await
    }

    /// Summary numbers for an account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn account_stats(&self, id: AccountId) -> Result<AccountStats> {
        self.get(&format!("/instagram/accounts/{id}/stats")).await
    }

    /// URL the operator opens to connect a new account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn instagram_auth_url(&self) -> Result<InstagramAuthUrl> {
        self.get("/instagram/auth/url").await
    }

    /// Hand an authorization code to the backend, which completes the
    /// connection
    ///
    /// # Errors
    ///
    /// Returns the API error when the backend cannot exchange the code.
    pub async fn exchange_instagram_code(
        &self,
        exchange: &InstagramTokenExchange,
    ) -> Result<AccountActionResponse> {
        self.post("/instagram/auth/callback", exchange).await
    }
}
