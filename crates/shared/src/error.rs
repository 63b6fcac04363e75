use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    RateLimited,
    Transport,
    Decode,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            409 => Self::Conflict,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// Error body returned by the table service, e.g.
/// `{"code":"42501","message":"permission denied for table todos","details":null,"hint":null}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code:?}: {message}")]
pub struct RemoteError {
    pub code: ErrorCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from a non-success status and the raw response text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("remote service returned status {status}")
                } else {
                    body.trim().to_string()
                }
            });
        Self::new(ErrorCode::from_status(status), message)
    }

    pub fn is_auth(&self) -> bool {
        matches!(self.code, ErrorCode::Unauthorized | ErrorCode::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_message_from_error_body() {
        let err = RemoteError::from_response(
            403,
            r#"{"code":"42501","message":"permission denied for table todos","details":null,"hint":null}"#,
        );
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.message, "permission denied for table todos");
        assert!(err.is_auth());
    }

    #[test]
    fn falls_back_to_raw_text_or_status() {
        let err = RemoteError::from_response(502, "bad gateway");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "bad gateway");

        let err = RemoteError::from_response(409, "  ");
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "remote service returned status 409");
    }
}
