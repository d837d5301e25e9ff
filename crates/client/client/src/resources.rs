//! Typed resource surfaces over the request pipeline.

use serde::{Deserialize, Serialize};

use crate::client::LinktorClient;
use crate::error::ApiResult;

/// Login request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Token refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Authenticated user summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Message send request body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

impl SendMessageInput {
    /// Creates a plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            message_type: Some("text".to_string()),
        }
    }
}

/// Authentication endpoints.
pub struct AuthResource {
    client: LinktorClient,
}

impl AuthResource {
    pub(crate) fn new(client: LinktorClient) -> Self {
        Self { client }
    }

    /// Logs in and stores the returned access token on the client.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let input = LoginInput::new(email, password);
        let response: LoginResponse = self.client.post("/auth/login", input).await?;
        self.client
            .set_access_token(Some(response.access_token.clone()))
            .await;
        Ok(response)
    }

    /// Exchanges a refresh token and stores the new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> ApiResult<RefreshTokenResponse> {
        let body = serde_json::json!({ "refreshToken": refresh_token });
        let response: RefreshTokenResponse = self.client.post("/auth/refresh", body).await?;
        self.client
            .set_access_token(Some(response.access_token.clone()))
            .await;
        Ok(response)
    }

    /// Logs out and discards the stored access token.
    pub async fn logout(&self) -> ApiResult<()> {
        self.client
            .post::<serde_json::Value>("/auth/logout", serde_json::json!({}))
            .await?;
        self.client.set_access_token(None).await;
        Ok(())
    }

    /// Fetches the current user.
    pub async fn current_user(&self) -> ApiResult<User> {
        self.client.get("/auth/me").await
    }
}

/// Conversation endpoints.
pub struct ConversationsResource {
    client: LinktorClient,
}

impl ConversationsResource {
    pub(crate) fn new(client: LinktorClient) -> Self {
        Self { client }
    }

    /// Fetches a conversation by id.
    pub async fn get(&self, id: &str) -> ApiResult<Conversation> {
        self.client.get(&format!("/conversations/{}", id)).await
    }

    /// Sends a plain text message.
    pub async fn send_text(&self, id: &str, text: &str) -> ApiResult<Message> {
        self.send_message(id, SendMessageInput::text(text)).await
    }

    /// Sends a message.
    pub async fn send_message(&self, id: &str, input: SendMessageInput) -> ApiResult<Message> {
        self.client
            .post(&format!("/conversations/{}/messages", id), input)
            .await
    }
}

impl LinktorClient {
    /// Authentication endpoints.
    pub fn auth(&self) -> AuthResource {
        AuthResource::new(self.clone())
    }

    /// Conversation endpoints.
    pub fn conversations(&self) -> ConversationsResource {
        ConversationsResource::new(self.clone())
    }
}
