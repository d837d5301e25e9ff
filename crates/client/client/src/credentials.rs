//! Shared credential storage.

use tokio::sync::RwLock;

/// Credentials shared between the request pipeline and the refresh
/// coordinator.
///
/// The API key is immutable for the life of the client and takes priority
/// over the access token when both are configured. The access token can be
/// replaced by a refresh or cleared when authentication fails for good.
#[derive(Debug, Default)]
pub struct CredentialStore {
    api_key: Option<String>,
    access_token: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Creates a store with the given credentials.
    pub fn new(api_key: Option<String>, access_token: Option<String>) -> Self {
        Self {
            api_key,
            access_token: RwLock::new(access_token),
        }
    }

    /// The configured API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Replaces the access token.
    pub async fn set_access_token(&self, token: Option<String>) {
        let mut guard = self.access_token.write().await;
        *guard = token;
    }

    /// Clears the access token after a terminal authentication failure.
    pub async fn clear_access_token(&self) {
        self.set_access_token(None).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_lifecycle() {
        let store = CredentialStore::new(None, Some("tok_1".to_string()));
        assert_eq!(store.access_token().await.as_deref(), Some("tok_1"));

        store.set_access_token(Some("tok_2".to_string())).await;
        assert_eq!(store.access_token().await.as_deref(), Some("tok_2"));

        store.clear_access_token().await;
        assert_eq!(store.access_token().await, None);
    }

    #[test]
    fn test_api_key_is_immutable() {
        let store = CredentialStore::new(Some("key".to_string()), None);
        assert_eq!(store.api_key(), Some("key"));
    }
}
