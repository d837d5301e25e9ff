//! API error classification.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for API client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Classified API client error.
///
/// Retries are internal to the request pipeline; callers only see the final
/// classified error, which carries the correlation id from `X-Request-ID`
/// and, on retry exhaustion, the attempt count.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        request_id: Option<String>,
    },

    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        request_id: Option<String>,
    },

    #[error("Authorization failed: {message}")]
    Authorization {
        message: String,
        request_id: Option<String>,
    },

    #[error("Resource not found: {message}")]
    NotFound {
        message: String,
        request_id: Option<String>,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        request_id: Option<String>,
    },

    #[error("Rate limit exceeded. Retry after {retry_after_seconds} seconds")]
    RateLimit {
        retry_after_seconds: u64,
        message: String,
        request_id: Option<String>,
        attempts: u32,
    },

    #[error("Server error: {message}")]
    Server {
        message: String,
        request_id: Option<String>,
        attempts: u32,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Unknown error ({status}): {message}")]
    Unknown {
        status: u16,
        message: String,
        request_id: Option<String>,
    },
}

impl ApiError {
    /// Classifies a response status into a typed error.
    pub fn from_status(status: StatusCode, message: String, request_id: Option<String>) -> Self {
        match status.as_u16() {
            400 => ApiError::Validation { message, request_id },
            401 => ApiError::Authentication { message, request_id },
            403 => ApiError::Authorization { message, request_id },
            404 => ApiError::NotFound { message, request_id },
            409 => ApiError::Conflict { message, request_id },
            429 => ApiError::RateLimit {
                retry_after_seconds: 60,
                message,
                request_id,
                attempts: 1,
            },
            500..=599 => ApiError::Server {
                message,
                request_id,
                attempts: 1,
            },
            other => ApiError::Unknown {
                status: other,
                message,
                request_id,
            },
        }
    }

    /// Records how many attempts were made before this error was raised.
    pub fn with_attempts(mut self, count: u32) -> Self {
        match &mut self {
            ApiError::RateLimit { attempts, .. } | ApiError::Server { attempts, .. } => {
                *attempts = count;
            }
            _ => {}
        }
        self
    }

    /// Whether the pipeline may retry after this error.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimit { .. } | ApiError::Server { .. } | ApiError::Transport(_)
        )
    }

    /// The correlation id returned by the server, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ApiError::Validation { request_id, .. }
            | ApiError::Authentication { request_id, .. }
            | ApiError::Authorization { request_id, .. }
            | ApiError::NotFound { request_id, .. }
            | ApiError::Conflict { request_id, .. }
            | ApiError::RateLimit { request_id, .. }
            | ApiError::Server { request_id, .. }
            | ApiError::Unknown { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// The HTTP status this error classifies, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::Authentication { .. } => Some(401),
            ApiError::Authorization { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::RateLimit { .. } => Some(429),
            ApiError::Server { .. } => Some(500),
            ApiError::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16) -> ApiError {
        ApiError::from_status(
            StatusCode::from_u16(status).unwrap(),
            "boom".to_string(),
            Some("req_1".to_string()),
        )
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(classify(400), ApiError::Validation { .. }));
        assert!(matches!(classify(401), ApiError::Authentication { .. }));
        assert!(matches!(classify(403), ApiError::Authorization { .. }));
        assert!(matches!(classify(404), ApiError::NotFound { .. }));
        assert!(matches!(classify(409), ApiError::Conflict { .. }));
        assert!(matches!(classify(429), ApiError::RateLimit { .. }));
        assert!(matches!(classify(500), ApiError::Server { .. }));
        assert!(matches!(classify(503), ApiError::Server { .. }));
        assert!(matches!(classify(599), ApiError::Server { .. }));
        assert!(matches!(classify(418), ApiError::Unknown { status: 418, .. }));
    }

    #[test]
    fn test_retryable() {
        assert!(classify(429).retryable());
        assert!(classify(500).retryable());
        assert!(!classify(400).retryable());
        assert!(!classify(401).retryable());
        assert!(!classify(404).retryable());
    }

    #[test]
    fn test_request_id_carried() {
        assert_eq!(classify(404).request_id(), Some("req_1"));
        assert_eq!(ApiError::Cancelled.request_id(), None);
    }

    #[test]
    fn test_with_attempts() {
        let err = classify(500).with_attempts(3);
        match err {
            ApiError::Server { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected server error, got {other:?}"),
        }

        // Attempt count is only meaningful for retryable kinds.
        assert!(matches!(
            classify(404).with_attempts(3),
            ApiError::NotFound { .. }
        ));
    }
}
