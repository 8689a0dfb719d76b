//! Connector error classification.
//!
//! Provider failures are tagged where they happen so the retry layer can
//! distinguish a dead credential or a missing file (permanent) from a
//! network hiccup or rate limit (transient).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transient provider error: {0}")]
    Transient(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Connector setup failed: {0}")]
    Setup(String),
}

impl ConnectorError {
    /// Whether retrying the same call can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConnectorError::Transient(_))
    }

    /// Classify a non-success HTTP status from a provider.
    pub fn from_status(status: reqwest::StatusCode, detail: String) -> Self {
        match status.as_u16() {
            401 | 403 => ConnectorError::Auth(detail),
            404 => ConnectorError::NotFound(detail),
            408 | 429 => ConnectorError::Transient(detail),
            code if code >= 500 => ConnectorError::Transient(detail),
            _ => ConnectorError::InvalidResponse(detail),
        }
    }
}

impl From<ConnectorError> for tether_core::AppError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Auth(m) => tether_core::AppError::Unauthorized(m),
            ConnectorError::NotFound(m) => tether_core::AppError::NotFound(m),
            other => tether_core::AppError::Connector(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures (DNS, connect, timeout, broken stream) are
        // worth another attempt; anything else already carries a status.
        if let Some(status) = err.status() {
            ConnectorError::from_status(status, err.to_string())
        } else {
            ConnectorError::Transient(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ConnectorError::from_status(StatusCode::UNAUTHORIZED, "x".into()),
            ConnectorError::Auth(_)
        ));
        assert!(matches!(
            ConnectorError::from_status(StatusCode::FORBIDDEN, "x".into()),
            ConnectorError::Auth(_)
        ));
        assert!(matches!(
            ConnectorError::from_status(StatusCode::NOT_FOUND, "x".into()),
            ConnectorError::NotFound(_)
        ));
        assert!(matches!(
            ConnectorError::from_status(StatusCode::TOO_MANY_REQUESTS, "x".into()),
            ConnectorError::Transient(_)
        ));
        assert!(matches!(
            ConnectorError::from_status(StatusCode::BAD_GATEWAY, "x".into()),
            ConnectorError::Transient(_)
        ));
        assert!(matches!(
            ConnectorError::from_status(StatusCode::IM_A_TEAPOT, "x".into()),
            ConnectorError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(ConnectorError::Transient("timeout".into()).is_transient());
        assert!(!ConnectorError::Auth("expired".into()).is_transient());
        assert!(!ConnectorError::NotFound("gone".into()).is_transient());
        assert!(!ConnectorError::InvalidResponse("weird".into()).is_transient());
        assert!(!ConnectorError::Setup("no token".into()).is_transient());
    }
}
