//! API client for the service desk dashboard backend.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{LoginResponse, User};
use crate::storage::StorageContext;

use super::routes::{EndpointRoutes, API_URL, REFRESH_URL};
use super::{ApiError, RequestOptions};

// ============================================================================
// Constants
// ============================================================================

/// Header carrying the auth token on every authenticated request
pub const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// API client for the dashboard backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling
/// and both storage scopes sit behind Arc.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    timeout: Option<Duration>,
    storage: StorageContext,
    routes: EndpointRoutes,
    api_url: String,
    refresh_url: String,
}

impl ApiClient {
    /// Create a client reading credentials from `storage`.
    /// Requests have no timeout; callers cancel by dropping the future.
    pub fn new(storage: StorageContext) -> Result<Self, ApiError> {
        Self::build(storage, None)
    }

    /// Create a client whose requests fail after `timeout`
    pub fn with_timeout(storage: StorageContext, timeout: Duration) -> Result<Self, ApiError> {
        Self::build(storage, Some(timeout))
    }

    fn build(storage: StorageContext, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            timeout,
            storage,
            routes: EndpointRoutes::default(),
            api_url: API_URL.to_string(),
            refresh_url: REFRESH_URL.to_string(),
        })
    }

    /// Point the client at a different main API function
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_refresh_url(mut self, refresh_url: impl Into<String>) -> Self {
        self.refresh_url = refresh_url.into();
        self
    }

    pub fn with_routes(mut self, routes: EndpointRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// Request timeout, `None` when requests may wait indefinitely
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn storage(&self) -> &StorageContext {
        &self.storage
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Base URL for an endpoint, honoring the routing table
    pub fn endpoint_base(&self, endpoint: Option<&str>) -> &str {
        self.routes.base_for(endpoint, &self.api_url)
    }

    /// URL selecting `endpoint` on the main API function
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}?endpoint={}", self.api_url, endpoint)
    }

    /// Send a request carrying the stored auth token.
    ///
    /// The token is looked up on every call, so a login or logout in
    /// another handle sharing the same storage takes effect immediately.
    /// Without a token the request goes out unmodified. The response is
    /// returned whatever its status; only transport failures are errors.
    pub async fn fetch(&self, url: &str, options: RequestOptions) -> Result<Response, ApiError> {
        let mut headers = options.header_map()?;

        if let Some(resolved) = self.storage.resolve_token()? {
            let value = HeaderValue::from_str(&resolved.token)
                .map_err(|_| ApiError::InvalidHeader(format!("value for {}", AUTH_HEADER)))?;
            headers.insert(HeaderName::from_static("x-auth-token"), value);
        }

        let final_url = self.routes.resolve(url);

        let mut request = self
            .client
            .request(options.method, final_url)
            .headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }

    /// `fetch` then decode a successful JSON response.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = Self::check_response(self.fetch(url, options).await?).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e)))
    }

    /// Exchange credentials for a token. Does not touch storage.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint_url("login");
        let body = serde_json::to_string(&LoginRequest { username, password })
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| "Login failed".to_string());
            debug!(status = %status, "Login rejected");
            return Err(ApiError::LoginRejected(message));
        }

        let login: LoginResponse = Self::parse(response, "login").await?;
        info!(username = %login.user.username, "Logged in");
        Ok(login)
    }

    /// Ask the backend who `token` belongs to.
    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let url = self.endpoint_url("me");
        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, token)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse(response, "me").await
    }

    /// Trade `token` for a fresh one. Does not touch storage.
    pub async fn refresh(&self, token: &str) -> Result<LoginResponse, ApiError> {
        let url = format!("{}?action=refresh", self.refresh_url);
        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, token)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse(response, "refresh").await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {} response: {}", what, e)))
    }
}
