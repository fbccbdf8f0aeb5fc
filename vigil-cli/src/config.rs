//! Configuration module
//!
//! Connection settings shared by every command: endpoints, credentials and
//! the customer environment to query.

use vigil_client::{MonitorClient, Region};
use vigil_core::domain::auth::Credentials;
use vigil_core::domain::query::EventQuery;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the events API
    pub base_url: String,

    /// Token endpoint of the identity service
    pub auth_url: String,

    /// Client credentials, exchanged once per run
    pub credentials: Credentials,

    /// Customer whose events are queried
    pub customer_id: String,

    /// Customer environment (e.g., "prod")
    pub environment: String,
}

impl Config {
    /// Creates a configuration using a region's default endpoints
    pub fn new(
        region: Region,
        credentials: Credentials,
        customer_id: String,
        environment: String,
    ) -> Self {
        Self {
            base_url: region.base_url(),
            auth_url: region.auth_url(),
            credentials,
            customer_id,
            environment,
        }
    }

    /// Overrides the region's endpoints where given
    pub fn with_endpoints(mut self, base_url: Option<String>, auth_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(auth_url) = auth_url {
            self.auth_url = auth_url;
        }
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.credentials.is_complete() {
            anyhow::bail!("client_id and client_secret cannot be empty");
        }

        if self.customer_id.is_empty() {
            anyhow::bail!("customer_id cannot be empty");
        }

        if self.environment.is_empty() {
            anyhow::bail!("environment cannot be empty");
        }

        for (name, url) in [("base_url", &self.base_url), ("auth_url", &self.auth_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        Ok(())
    }

    pub fn client(&self) -> MonitorClient {
        MonitorClient::new(self.base_url.clone(), self.auth_url.clone())
    }

    /// Unbounded query for the configured customer environment
    pub fn query(&self) -> EventQuery {
        EventQuery::new(self.customer_id.clone(), self.environment.clone())
    }
}
