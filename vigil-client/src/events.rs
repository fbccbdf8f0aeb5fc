//! Events endpoint

use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use vigil_core::domain::auth::AccessToken;
use vigil_core::domain::entity::{Entity, EntityKind};
use vigil_core::domain::predicate::Predicate;
use vigil_core::domain::query::EventQuery;
use vigil_core::dto::events::parse_entities;

use crate::MonitorClient;
use crate::error::{ClientError, Result};

impl MonitorClient {
    // =============================================================================
    // Event Polling
    // =============================================================================

    /// Poll the events of one entity kind and keep those matching `predicate`
    ///
    /// Performs exactly one GET. Entities are returned in server order.
    ///
    /// # Arguments
    /// * `token` - Bearer token from [`MonitorClient::authenticate`]
    /// * `kind` - Selects the endpoint and the event label field
    /// * `query` - Customer, environment and optional name/time filters
    /// * `predicate` - Applied to each entity's full event history
    ///
    /// # Errors
    /// * [`ClientError::Poll`] on any status other than 200
    /// * [`ClientError::MalformedResponse`] when the body lacks `data` or an
    ///   entity lacks its name or `events`
    pub async fn get_events(
        &self,
        token: &AccessToken,
        kind: EntityKind,
        query: &EventQuery,
        predicate: &Predicate,
    ) -> Result<Vec<Entity>> {
        let request = self.events_request(token, kind, query)?;
        debug!(url = %request.url(), predicate = predicate.name(), "Polling {} events", kind);

        let response = self.client.execute(request).await?;
        let body = self
            .read_ok_body(response, |status, body| ClientError::Poll { status, body })
            .await?;

        let entities = parse_entities(kind, &body)?;
        let total = entities.len();
        let matching = predicate.filter(entities);

        debug!(
            total,
            matching = matching.len(),
            "Filtered {} events",
            kind
        );

        Ok(matching)
    }

    /// Build the GET request for an events poll without sending it
    ///
    /// Optional query fields are only added when present.
    pub fn events_request(
        &self,
        token: &AccessToken,
        kind: EntityKind,
        query: &EventQuery,
    ) -> Result<reqwest::Request> {
        if token.is_empty() {
            return Err(ClientError::InvalidRequest(
                "access token cannot be empty".to_string(),
            ));
        }
        query.validate().map_err(ClientError::InvalidRequest)?;

        // customer_id is one encoded segment, never extra path or query
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!(
                    "base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(&query.customer_id)
            .push("events")
            .push(kind.path());

        let request = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .query(&query.to_query_pairs(kind))
            .build()?;

        Ok(request)
    }
}
