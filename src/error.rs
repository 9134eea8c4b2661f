/// Error produced by an API call or by a wizard action.
///
/// Transport and HTTP level failures are distinguished from structured
/// errors reported by the API in a successful response, and from
/// client-side validation failures that happen before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("{0}")]
    Validation(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("unexpected content type: {0}")]
    UnexpectedContentType(String),

    #[error("empty response body")]
    EmptyBody,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ApiError::Http {
            status: 404,
            message: "Swap not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error (404): Swap not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_validation_error_is_shown_verbatim() {
        let err = ApiError::validation("Wallet address is required");
        assert_eq!(err.to_string(), "Wallet address is required");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json")
            .expect_err("invalid JSON must fail");
        assert!(matches!(ApiError::from(json_err), ApiError::Decode(_)));
    }
}
