//! Single-flight token refresh coordination.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult};

/// Collaborator that can obtain a fresh access token, typically by redeeming
/// a refresh token against the auth endpoint.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Returns a new access token.
    async fn refresh_token(&self) -> ApiResult<String>;
}

type SharedRefresh = Shared<BoxFuture<'static, bool>>;

/// Coordinates credential refreshes so concurrent 401s collapse into one
/// refresh call.
///
/// Holds at most one in-flight refresh. Callers that arrive while a refresh
/// is pending await the same shared future and observe the same outcome;
/// they never block each other's unrelated requests. The slot is cleared
/// when the refresh settles so a later 401 can trigger a fresh attempt.
/// Failure clears the stored access token.
pub struct TokenRefreshCoordinator {
    credentials: Arc<CredentialStore>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    inflight: Mutex<Option<SharedRefresh>>,
}

impl TokenRefreshCoordinator {
    /// Creates a coordinator over the shared credential store.
    pub fn new(
        credentials: Arc<CredentialStore>,
        refresher: Option<Arc<dyn TokenRefresher>>,
    ) -> Self {
        Self {
            credentials,
            refresher,
            inflight: Mutex::new(None),
        }
    }

    /// Refreshes credentials, joining any refresh already in flight.
    ///
    /// Returns whether a usable access token is now stored.
    pub async fn refresh(&self) -> bool {
        let (future, created) = {
            let mut slot = self.inflight.lock().await;
            match slot.as_ref() {
                Some(pending) => (pending.clone(), false),
                None => {
                    let future = Self::run_refresh(
                        self.credentials.clone(),
                        self.refresher.clone(),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(future.clone());
                    (future, true)
                }
            }
        };

        let result = future.await;

        // Only the installing caller clears the slot, so a refresh started
        // after this one settled is never discarded.
        if created {
            self.inflight.lock().await.take();
        }

        result
    }

    async fn run_refresh(
        credentials: Arc<CredentialStore>,
        refresher: Option<Arc<dyn TokenRefresher>>,
    ) -> bool {
        let Some(refresher) = refresher else {
            tracing::warn!("authentication failed and no token refresher is configured");
            credentials.clear_access_token().await;
            return false;
        };

        match refresher.refresh_token().await {
            Ok(token) => {
                tracing::debug!("access token refreshed");
                credentials.set_access_token(Some(token)).await;
                true
            }
            Err(e) => {
                tracing::warn!("token refresh failed: {}", e);
                credentials.clear_access_token().await;
                false
            }
        }
    }
}

/// A [`TokenRefresher`] that redeems a stored refresh token against the
/// platform's `/auth/refresh` endpoint.
pub struct RefreshTokenExchanger {
    http: reqwest::Client,
    base_url: String,
    refresh_token: String,
}

impl RefreshTokenExchanger {
    /// Creates an exchanger for the given API base URL and refresh token.
    pub fn new(base_url: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            refresh_token: refresh_token.into(),
        }
    }
}

#[async_trait]
impl TokenRefresher for RefreshTokenExchanger {
    async fn refresh_token(&self) -> ApiResult<String> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RefreshResponse {
            access_token: String,
        }

        let response = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&serde_json::json!({ "refreshToken": self.refresh_token }))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = linktor_core::error_message(&body)
                .map(|e| e.message)
                .unwrap_or_else(|| "Token refresh rejected".to_string());
            return Err(ApiError::from_status(status, message, None));
        }

        let parsed: RefreshResponse = match linktor_core::Envelope::from_slice(&body) {
            Ok(linktor_core::Envelope::Success { data: Some(data) }) => data,
            _ => serde_json::from_slice(&body)?,
        };

        Ok(parsed.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowRefresher {
        calls: Arc<AtomicUsize>,
        succeed: bool,
    }

    #[async_trait]
    impl TokenRefresher for SlowRefresher {
        async fn refresh_token(&self) -> ApiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.succeed {
                Ok("fresh-token".to_string())
            } else {
                Err(ApiError::Authentication {
                    message: "refresh token expired".to_string(),
                    request_id: None,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_collapse_into_one_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let credentials = Arc::new(CredentialStore::new(None, Some("stale".to_string())));
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            credentials.clone(),
            Some(Arc::new(SlowRefresher { calls: calls.clone(), succeed: true })),
        ));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let coordinator = coordinator.clone();
            tasks.push(tokio::spawn(async move { coordinator.refresh().await }));
        }

        for task in tasks {
            assert!(task.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(credentials.access_token().await.as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn test_failure_clears_credentials_and_is_shared() {
        let calls = Arc::new(AtomicUsize::new(0));
        let credentials = Arc::new(CredentialStore::new(None, Some("stale".to_string())));
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            credentials.clone(),
            Some(Arc::new(SlowRefresher { calls: calls.clone(), succeed: false })),
        ));

        let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());
        assert!(!a);
        assert!(!b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(credentials.access_token().await, None);
    }

    #[tokio::test]
    async fn test_slot_cleared_after_settling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let credentials = Arc::new(CredentialStore::new(None, None));
        let coordinator = TokenRefreshCoordinator::new(
            credentials,
            Some(Arc::new(SlowRefresher { calls: calls.clone(), succeed: true })),
        );

        assert!(coordinator.refresh().await);
        assert!(coordinator.refresh().await);
        // Sequential refreshes each get their own network call.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_refresher_fails_and_clears() {
        let credentials = Arc::new(CredentialStore::new(None, Some("stale".to_string())));
        let coordinator = TokenRefreshCoordinator::new(credentials.clone(), None);

        assert!(!coordinator.refresh().await);
        assert_eq!(credentials.access_token().await, None);
    }
}
