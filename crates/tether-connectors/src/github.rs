//! GitHub OAuth client for refresh-token exchange.

use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tether_core::constants::GITHUB_OAUTH_TOKEN_URL;

use crate::error::ConnectorError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for GitHub's OAuth token endpoint.
pub struct GithubOAuthClient {
    http_client: Client,
    token_url: String,
}

impl GithubOAuthClient {
    pub fn new() -> Result<Self, ConnectorError> {
        Self::with_token_url(GITHUB_OAUTH_TOKEN_URL)
    }

    /// Same as [`GithubOAuthClient::new`] with an overridable endpoint (tests).
    pub fn with_token_url(token_url: impl Into<String>) -> Result<Self, ConnectorError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ConnectorError::Setup(format!("Failed to create HTTP client for GitHub: {}", e))
            })?;

        Ok(Self {
            http_client,
            token_url: token_url.into(),
        })
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// Returns the raw token payload so the caller can overlay it on the
    /// stored credentials without losing provider-specific fields.
    pub async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Map<String, Value>, ConnectorError> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .query(&params)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectorError::from_status(
                status,
                format!("GitHub token refresh failed: {} - {}", status, detail),
            ));
        }

        let payload: Value = response.json().await.map_err(|e| {
            ConnectorError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        let Value::Object(payload) = payload else {
            return Err(ConnectorError::InvalidResponse(
                "Token response is not a JSON object".to_string(),
            ));
        };

        // GitHub reports OAuth failures with 200 and an error body.
        if let Some(error) = payload.get("error").and_then(Value::as_str) {
            let description = payload
                .get("error_description")
                .and_then(Value::as_str)
                .unwrap_or(error);
            return Err(ConnectorError::Auth(format!(
                "GitHub token refresh rejected: {}",
                description
            )));
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_refresh_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/login/oauth/access_token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "access_token": "new-tok",
                    "expires_in": 28800,
                    "refresh_token": "new-refresh",
                    "token_type": "bearer"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GithubOAuthClient::with_token_url(format!(
            "{}/login/oauth/access_token",
            server.url()
        ))
        .unwrap();
        let payload = client.refresh("cid", "secret", "old-refresh").await.unwrap();

        assert_eq!(payload.get("access_token"), Some(&json!("new-tok")));
        assert_eq!(payload.get("expires_in"), Some(&json!(28800)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_error_body_is_auth_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "error": "bad_refresh_token",
                    "error_description": "The refresh token passed is incorrect or expired."
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GithubOAuthClient::with_token_url(format!(
            "{}/login/oauth/access_token",
            server.url()
        ))
        .unwrap();
        let result = client.refresh("cid", "secret", "stale").await;

        assert!(matches!(result, Err(ConnectorError::Auth(_))));
    }

    #[tokio::test]
    async fn test_refresh_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = GithubOAuthClient::with_token_url(format!(
            "{}/login/oauth/access_token",
            server.url()
        ))
        .unwrap();
        let result = client.refresh("cid", "secret", "r").await;

        assert!(matches!(result, Err(ConnectorError::Transient(_))));
    }
}
