//! Authenticated request pipeline with retry, backoff, and refresh.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use linktor_core::Envelope;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult};
use crate::refresh::{TokenRefreshCoordinator, TokenRefresher};

/// Correlation id header returned by the API.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// API client with a retrying, credential-refreshing request pipeline.
#[derive(Clone)]
pub struct LinktorClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
    coordinator: Arc<TokenRefreshCoordinator>,
    max_retries: u32,
    cancel: Option<watch::Receiver<bool>>,
}

impl LinktorClient {
    /// Starts building a client.
    pub fn builder() -> LinktorClientBuilder {
        LinktorClientBuilder::default()
    }

    /// The shared credential store.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Replaces the access token, e.g. after an out-of-band login.
    pub async fn set_access_token(&self, token: Option<String>) {
        self.credentials.set_access_token(token).await;
    }

    /// Performs an authenticated request with retries.
    ///
    /// Success bodies are unwrapped from the `{success, data}` envelope when
    /// they carry one, otherwise parsed as a bare `T`. Rate limits honor
    /// `Retry-After` (default 60 s), server and transport failures back off
    /// exponentially, and a 401 triggers exactly one coordinated refresh
    /// followed by one retry of the original request.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<impl Serialize>,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempts = 0u32;
        let mut auth_retried = false;

        loop {
            attempts += 1;

            let mut request = self.http.request(method.clone(), &url);

            // Add authentication; an API key takes priority over a token.
            if let Some(api_key) = self.credentials.api_key() {
                request = request.header("X-API-Key", api_key);
            } else if let Some(token) = self.credentials.access_token().await {
                request = request.header("Authorization", format!("Bearer {}", token));
            }

            if let Some(ref body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempts < self.max_retries {
                        tracing::debug!("transport error ({}), retrying", e);
                        self.backoff(Duration::from_secs(2u64.pow(attempts))).await?;
                        continue;
                    }
                    return Err(ApiError::Transport(e));
                }
            };

            let status = response.status();
            let request_id = response
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from);

            if status.is_success() {
                let text = response.text().await?;
                if text.is_empty() || text == "null" {
                    return Ok(serde_json::from_str("null")?);
                }

                // Unwrap the envelope when present; otherwise the body is
                // the payload itself.
                match Envelope::<T>::from_slice(text.as_bytes()) {
                    Ok(Envelope::Success { data: Some(data) }) => return Ok(data),
                    Ok(Envelope::Success { data: None }) => return Ok(serde_json::from_str("null")?),
                    Ok(Envelope::Failure { error }) => {
                        return Err(ApiError::Unknown {
                            status: status.as_u16(),
                            message: error.message,
                            request_id,
                        });
                    }
                    Err(_) => return Ok(serde_json::from_str(&text)?),
                }
            }

            // One refresh-and-retry cycle per request, never recursive.
            if status == StatusCode::UNAUTHORIZED {
                if !auth_retried {
                    auth_retried = true;
                    if self.coordinator.refresh().await {
                        tracing::debug!("credentials refreshed, retrying request");
                        continue;
                    }
                }
                let message = read_error_message(response).await
                    .unwrap_or_else(|| "Authentication failed".to_string());
                return Err(ApiError::Authentication { message, request_id });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);

                if attempts < self.max_retries {
                    tracing::debug!("rate limited, retrying after {}s", retry_after);
                    self.backoff(Duration::from_secs(retry_after)).await?;
                    continue;
                }

                let message = read_error_message(response).await
                    .unwrap_or_else(|| "Rate limit exceeded".to_string());
                return Err(ApiError::RateLimit {
                    retry_after_seconds: retry_after,
                    message,
                    request_id,
                    attempts,
                });
            }

            if status.is_server_error() && attempts < self.max_retries {
                tracing::debug!("server returned {}, retrying", status);
                self.backoff(Duration::from_secs(2u64.pow(attempts))).await?;
                continue;
            }

            let message = read_error_message(response).await
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(ApiError::from_status(status, message, request_id).with_attempts(attempts));
        }
    }

    /// Sleeps for a retry delay, aborting immediately on cancellation.
    async fn backoff(&self, delay: Duration) -> ApiResult<()> {
        let Some(cancel) = &self.cancel else {
            tokio::time::sleep(delay).await;
            return Ok(());
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = cancelled(cancel.clone()) => Err(ApiError::Cancelled),
        }
    }

    /// Performs a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None::<()>).await
    }

    /// Performs a POST request.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: impl Serialize) -> ApiResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Performs a PATCH request.
    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: impl Serialize) -> ApiResult<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// Performs a DELETE request, discarding the response body.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.request::<serde_json::Value>(Method::DELETE, path, None::<()>)
            .await?;
        Ok(())
    }
}

/// Resolves only when the signal flips to cancelled; a dropped sender means
/// cancellation can no longer happen.
async fn cancelled(mut signal: watch::Receiver<bool>) {
    if signal.wait_for(|c| *c).await.is_err() {
        futures_util::future::pending::<()>().await;
    }
}

/// Extracts an error message from a response body, accepting both the flat
/// and the nested error shapes.
async fn read_error_message(response: reqwest::Response) -> Option<String> {
    let body = response.bytes().await.unwrap_or_default();
    if let Some(error) = linktor_core::error_message(&body) {
        return Some(error.message);
    }
    let text = String::from_utf8_lossy(&body);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Builder for [`LinktorClient`].
#[derive(Default)]
pub struct LinktorClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    access_token: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    cancel: Option<watch::Receiver<bool>>,
}

impl LinktorClientBuilder {
    /// Sets the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key. Takes priority over an access token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the initial access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the maximum number of attempts per request.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the token refresher consulted on authentication failures.
    pub fn token_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Sets a cancellation signal; flipping it to `true` aborts retry sleeps.
    pub fn cancellation(mut self, signal: watch::Receiver<bool>) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// Builds the client.
    pub fn build(self) -> ApiResult<LinktorClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://api.linktor.io".to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs.unwrap_or(30)))
            .build()?;

        let credentials = Arc::new(CredentialStore::new(self.api_key, self.access_token));
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            credentials.clone(),
            self.refresher,
        ));

        Ok(LinktorClient {
            http,
            base_url,
            credentials,
            coordinator,
            max_retries: self.max_retries.unwrap_or(3),
            cancel: self.cancel,
        })
    }
}
