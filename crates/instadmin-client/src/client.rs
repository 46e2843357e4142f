//! HTTP client for communicating with the admin API

use crate::session::Session;
use instadmin_core::config::ApiConfig;
use instadmin_core::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/// API client for the admin backend
///
/// Every request goes through `request`, which attaches the session's
/// bearer token, and `send`, which turns a 401 into an expired session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    root_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            root_url: config.root_url(),
            session,
        })
    }

    /// The authentication context requests are made under
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Base URL including the versioned prefix
    #[must_use]
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching the bearer token when one is held
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));

        if let Some(bearer) = self.session.bearer() {
            request = request.header(reqwest::header::AUTHORIZATION, bearer);
        }

        request
    }

    /// Send a request without looking at the response status
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build().map_err(transport_error)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self
            .client
            .execute(request)
            .await
            .map_err(transport_error)?;
        debug!(%method, %path, status = response.status().as_u16(), "API request");
        Ok(response)
    }

    /// Send a request and screen the response status
    ///
    /// A 401 expires the session before the error is returned.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.execute(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %response.url().path(), "API rejected credentials, expiring session");
            if let Err(e) = self.session.expire().await {
                error!("Failed to clear stored credentials: {e}");
            }
            return Err(Error::Unauthorized);
        }

        check_status(response).await
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        decode_json(self.send(request).await?).await
    }

    /// Send a request and return the raw body text
    pub(crate) async fn send_text(&self, request: RequestBuilder) -> Result<String> {
        let response = self.send(request).await?;
        response.text().await.map_err(transport_error)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::GET, path)).await
    }

    pub(crate) async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, path).query(query))
            .await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::POST, path)).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::PUT, path).json(body))
            .await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::DELETE, path)).await
    }

    pub(crate) async fn delete_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::DELETE, path).query(query))
            .await
    }
}

/// Pass a success response through; map anything else to an error
/// carrying the backend's `detail`
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound {
            resource: error_detail(&body).unwrap_or(path),
        });
    }

    let message = error_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string()
    });
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await.map_err(transport_error)?;
    Ok(serde_json::from_slice(&body)?)
}

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Http(format!("Request timed out: {err}"))
    } else if err.is_connect() {
        Error::Http(format!("Failed to connect to API: {err}"))
    } else {
        Error::Http(err.to_string())
    }
}

/// Extract the human-readable message from an error body
///
/// The backend reports `{"detail": "..."}`, or a list of field errors
/// for rejected payloads.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|field| field.as_str());
                    Some(field.map_or_else(|| msg.to_string(), |field| format!("{field}: {msg}")))
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}
