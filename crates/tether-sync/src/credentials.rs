//! Credentials service: auth-data retrieval with transparent refresh.
//!
//! A connection's access token is checked against its reported lifetime on
//! every read; an expired token is exchanged through the provider's refresh
//! endpoint and the merged payload is persisted before being returned.

use chrono::Utc;
use uuid::Uuid;

use tether_connectors::GithubOAuthClient;
use tether_core::models::AuthData;
use tether_core::AppError;
use tether_db::ConnectionRepository;

/// OAuth application credentials used for token refresh.
#[derive(Clone, Debug)]
pub struct OAuthAppCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Service for reading (and refreshing) connection credentials.
pub struct CredentialsService {
    connections: ConnectionRepository,
    github: GithubOAuthClient,
    app: OAuthAppCredentials,
}

impl CredentialsService {
    pub fn new(
        connections: ConnectionRepository,
        github: GithubOAuthClient,
        app: OAuthAppCredentials,
    ) -> Self {
        Self {
            connections,
            github,
            app,
        }
    }

    /// Auth data for a connection, refreshed when expired.
    ///
    /// Fails with NotFound when the connection carries no credentials; scope
    /// checks are inherited from the repository fetch.
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id))]
    pub async fn get_auth_data(
        &self,
        connection_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<AuthData, AppError> {
        let connection = self.connections.get(connection_id, workspace_id).await?;

        let auth_data = connection
            .auth_data
            .ok_or_else(|| AppError::NotFound("Auth data not found".to_string()))?;

        if !auth_data.is_expired(Utc::now()) {
            return Ok(auth_data);
        }

        let refresh_token = auth_data.refresh_token.as_deref().ok_or_else(|| {
            AppError::Unauthorized("Connection has no refresh token".to_string())
        })?;

        tracing::info!("Access token expired, refreshing");

        let payload = self
            .github
            .refresh(&self.app.client_id, &self.app.client_secret, refresh_token)
            .await?;

        let mut refreshed = auth_data.merged_with(&payload)?;
        refreshed.token_acquired_time = Some(Utc::now());

        self.connections
            .set_auth_data(connection_id, &refreshed)
            .await?;

        Ok(refreshed)
    }
}
