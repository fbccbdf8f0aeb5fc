//! Token endpoint

use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use vigil_core::domain::auth::{AccessToken, Credentials};
use vigil_core::dto::auth::{TokenRequest, TokenResponse};

use crate::MonitorClient;
use crate::error::{ClientError, Result};

impl MonitorClient {
    /// Exchange client credentials for a bearer token
    ///
    /// Issues a single form-encoded client-credentials request. There is no
    /// retry: any status other than 200 is returned as [`ClientError::Auth`].
    ///
    /// # Arguments
    /// * `credentials` - Client ID and secret; both must be non-empty
    ///
    /// # Returns
    /// The access token, valid for the rest of the session
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken> {
        if !credentials.is_complete() {
            return Err(ClientError::InvalidRequest(
                "client_id and client_secret must be non-empty".to_string(),
            ));
        }

        debug!(client_id = %credentials.client_id, url = %self.auth_url, "Requesting access token");

        let response = self
            .client
            .post(&self.auth_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&TokenRequest::client_credentials(credentials))
            .send()
            .await?;

        let body = self
            .read_ok_body(response, |status, body| ClientError::Auth { status, body })
            .await?;

        let token_response = TokenResponse::parse(&body)?;
        debug!(
            token_type = ?token_response.token_type,
            expires_in = ?token_response.expires_in,
            "Access token issued"
        );

        Ok(token_response.into_token()?)
    }
}
