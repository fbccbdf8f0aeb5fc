//! Event sources
//!
//! The convergence loop only needs "give me the entities matching this
//! predicate for this query". `Session` answers that from the monitoring
//! API with a token obtained once up front.

use async_trait::async_trait;
use tracing::info;
use vigil_client::{ClientError, MonitorClient};
use vigil_core::domain::auth::{AccessToken, Credentials};
use vigil_core::domain::entity::{Entity, EntityKind};
use vigil_core::domain::predicate::Predicate;
use vigil_core::domain::query::EventQuery;

/// Source of filtered entities for one poll
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Performs one poll and returns the entities `predicate` holds for
    async fn fetch(
        &self,
        query: &EventQuery,
        predicate: &Predicate,
    ) -> Result<Vec<Entity>, ClientError>;
}

#[async_trait]
impl<'a, T: EventSource + ?Sized> EventSource for &'a T {
    async fn fetch(
        &self,
        query: &EventQuery,
        predicate: &Predicate,
    ) -> Result<Vec<Entity>, ClientError> {
        (**self).fetch(query, predicate).await
    }
}

/// Authenticated connection to the events API for one entity kind
pub struct Session {
    client: MonitorClient,
    token: AccessToken,
    kind: EntityKind,
}

impl Session {
    /// Authenticates once and binds the token to `kind`
    ///
    /// A failed token exchange is returned as is; there is no retry.
    pub async fn open(
        client: MonitorClient,
        credentials: &Credentials,
        kind: EntityKind,
    ) -> Result<Self, ClientError> {
        let token = client.authenticate(credentials).await?;
        info!("Authenticated against {}", client.auth_url());

        Ok(Self::with_token(client, token, kind))
    }

    /// Wraps an existing token
    pub fn with_token(client: MonitorClient, token: AccessToken, kind: EntityKind) -> Self {
        Self {
            client,
            token,
            kind,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Same token and client, different entity kind
    pub fn for_kind(&self, kind: EntityKind) -> Self {
        Self::with_token(self.client.clone(), self.token.clone(), kind)
    }
}

#[async_trait]
impl EventSource for Session {
    async fn fetch(
        &self,
        query: &EventQuery,
        predicate: &Predicate,
    ) -> Result<Vec<Entity>, ClientError> {
        self.client
            .get_events(&self.token, self.kind, query, predicate)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_session_authenticates_once_and_reuses_token() {
        let mut server = mockito::Server::new_async().await;
        let auth = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"session-token"}"#)
            .expect(1)
            .create_async()
            .await;
        let events = server
            .mock("GET", "/acme/events/file")
            .match_header("authorization", "Bearer session-token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data": [{"file": "a.csv", "events": []}]}"#)
            .expect(2)
            .create_async()
            .await;

        let client = MonitorClient::new(server.url(), format!("{}/token", server.url()));
        let session = Session::open(client, &Credentials::new("id", "secret"), EntityKind::File)
            .await
            .unwrap();
        assert_eq!(session.kind(), EntityKind::File);

        let query = EventQuery::new("acme", "prod");
        for _ in 0..2 {
            let files = session
                .fetch(&query, &Predicate::accept_all())
                .await
                .unwrap();
            assert_eq!(files[0].name, "a.csv");
        }

        auth.assert_async().await;
        events.assert_async().await;
    }

    #[tokio::test]
    async fn test_session_open_fails_on_rejected_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = MonitorClient::new(server.url(), format!("{}/token", server.url()));
        let result = Session::open(client, &Credentials::new("id", "bad"), EntityKind::Job).await;

        assert!(matches!(result, Err(ClientError::Auth { status: 401, .. })));
    }
}
