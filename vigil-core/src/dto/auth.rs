//! Token endpoint DTOs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::auth::{AccessToken, Credentials};
use crate::error::ParseError;

/// Form body of the client-credentials exchange
#[derive(Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl fmt::Debug for TokenRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl<'a> TokenRequest<'a> {
    pub fn client_credentials(credentials: &'a Credentials) -> Self {
        Self {
            grant_type: "client_credentials",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
        }
    }
}

/// Successful token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Decodes a 200 body from the token endpoint
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))
    }

    pub fn into_token(self) -> Result<AccessToken, ParseError> {
        self.access_token
            .map(AccessToken::new)
            .ok_or(ParseError::MissingToken)
    }
}
