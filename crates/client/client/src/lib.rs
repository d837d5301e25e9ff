//! # Linktor Client
//!
//! Outbound API client:
//! - `X-API-Key` / bearer authentication with API-key priority
//! - Retrying pipeline: `Retry-After` on 429, exponential backoff on 5xx and
//!   transport errors, one coordinated refresh-and-retry on 401
//! - Response envelope unwrapping with bare-body fallback
//! - Typed error classification carrying `X-Request-ID`
//!
//! ## Example
//!
//! ```rust,ignore
//! use linktor_client::LinktorClient;
//!
//! let client = LinktorClient::builder()
//!     .base_url("https://api.linktor.io")
//!     .api_key("lk_live_...")
//!     .max_retries(3)
//!     .build()?;
//!
//! let conversation = client.conversations().get("c_123").await?;
//! ```

mod client;
mod credentials;
mod error;
mod refresh;
mod resources;

pub use client::{LinktorClient, LinktorClientBuilder, REQUEST_ID_HEADER};
pub use credentials::CredentialStore;
pub use error::{ApiError, ApiResult};
pub use refresh::{RefreshTokenExchanger, TokenRefreshCoordinator, TokenRefresher};
pub use resources::{
    AuthResource, Conversation, ConversationsResource, LoginInput, LoginResponse, Message,
    RefreshTokenResponse, SendMessageInput, User,
};
