use crate::client::{ApiClient, check_status, decode_json, error_detail};
use instadmin_core::types::{Admin, AdminCreate, LoginRequest, Token};
use instadmin_core::{Error, Result};
use reqwest::{Method, StatusCode};
use tracing::warn;
use validator::Validate;

const REJECTED_LOGIN: &str = "Incorrect email or password";

impl ApiClient {
    /// Log in with the password form and establish the session
    ///
    /// A rejected form leaves any current session untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank credentials,
    /// [`Error::InvalidCredentials`] with the backend's message for rejected
    /// ones, or a storage error if the token cannot be persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token> {
        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let response = self
            .execute(self.request(Method::POST, "/auth/login").form(&form))
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body).unwrap_or_else(|| REJECTED_LOGIN.to_string());
            warn!(username = %credentials.username, "Login rejected: {message}");
            return Err(Error::InvalidCredentials { message });
        }

        let token: Token = decode_json(check_status(response).await?).await?;

        self.session().establish(&token).await?;
        Ok(token)
    }

    /// Register a new admin
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed payload or the API error.
    pub async fn register(&self, admin: &AdminCreate) -> Result<Admin> {
        admin.validate()?;
        self.post("/auth/register", admin).await
    }

    /// Drop the session locally; the backend keeps no server-side session
    ///
    /// # Errors
    ///
    /// Returns an error if the stored token cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        self.session().logout().await
    }
}
