//! Error types for backend API calls

use thiserror::Error;

/// Errors that can occur when talking to the dars backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Backend returned an error status
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// The requested resource does not exist (for example, no textbook for a subject)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a streamed chat response
    #[error("Stream parsing error: {0}")]
    StreamParseError(String),

    /// Request was cancelled by user
    #[error("Request cancelled")]
    Cancelled,

    /// Backend URL is not usable
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writing a downloaded file failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    /// Check if the user can retry the same request
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::RequestError(_)
                | ApiError::Cancelled
                | ApiError::ApiError { status: 500..=599, .. }
        )
    }

    /// Short message suitable for the inline error line
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RequestError(e) if e.is_connect() => {
                "تعذر الاتصال بالخادم. تحقق من الاتصال ثم أعد التحميل (:reload)".to_string()
            }
            ApiError::NotFound(_) => "لا يوجد كتاب لهذه المادة".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_recoverable() {
        let err = ApiError::ApiError { status: 503, message: "down".into() };
        assert!(err.is_recoverable());
        let err = ApiError::ApiError { status: 400, message: "bad".into() };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn not_found_has_friendly_message() {
        let err = ApiError::NotFound("subject 3".into());
        assert_eq!(err.user_message(), "لا يوجد كتاب لهذه المادة");
    }
}
