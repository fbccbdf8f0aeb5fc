//! Vigil HTTP Client
//!
//! A small, type-safe client for the monitoring API: one call to exchange
//! client credentials for a bearer token, one call to poll job or file
//! events.
//!
//! # Example
//!
//! ```no_run
//! use vigil_client::MonitorClient;
//! use vigil_core::domain::auth::Credentials;
//! use vigil_core::domain::entity::EntityKind;
//! use vigil_core::domain::predicate::Predicate;
//! use vigil_core::domain::query::EventQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MonitorClient::for_region(vigil_client::Region::Us);
//!     let token = client
//!         .authenticate(&Credentials::new("client-id", "client-secret"))
//!         .await?;
//!
//!     let running = client
//!         .get_events(
//!             &token,
//!             EntityKind::Job,
//!             &EventQuery::new("some-customer", "prod"),
//!             &Predicate::has_label("RUNNING"),
//!         )
//!         .await?;
//!
//!     println!("{} job(s) running", running.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod auth;
mod events;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, StatusCode};
use std::fmt;
use std::str::FromStr;

/// Hosting region of the monitoring API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    fn code(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
        }
    }

    /// Base URL of the events API
    pub fn base_url(&self) -> String {
        format!("https://{}.monitor.relexsolutions.com/api/v1", self.code())
    }

    /// Token endpoint of the identity service
    pub fn auth_url(&self) -> String {
        format!(
            "https://identity.prod-{}.prod.cc.relexsolutions.com/monitoring_api_prod/connect/token",
            self.code()
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" | "emea" => Ok(Region::Eu),
            other => Err(format!("unknown region '{}' (expected us or eu)", other)),
        }
    }
}

/// HTTP client for the monitoring API
///
/// Holds the two endpoints it talks to:
/// - the identity service's token endpoint
/// - the events API base URL
#[derive(Debug, Clone)]
pub struct MonitorClient {
    /// Base URL of the events API (e.g., "https://us.monitor.relexsolutions.com/api/v1")
    base_url: String,
    /// Full URL of the token endpoint
    auth_url: String,
    /// HTTP client instance
    client: Client,
}

impl MonitorClient {
    /// Create a new client for explicit endpoints
    ///
    /// # Example
    /// ```
    /// use vigil_client::MonitorClient;
    ///
    /// let client = MonitorClient::new("http://localhost:8080/api/v1/", "http://localhost:8081/token");
    /// assert_eq!(client.base_url(), "http://localhost:8080/api/v1");
    /// ```
    pub fn new(base_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        Self::with_client(base_url, auth_url, Client::new())
    }

    /// Create a client for a region's default endpoints
    pub fn for_region(region: Region) -> Self {
        Self::new(region.base_url(), region.auth_url())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        auth_url: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.into(),
            client,
        }
    }

    /// Get the base URL of the events API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the token endpoint URL
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Reads a response, returning its body on 200
    ///
    /// Any other status is turned into an error by `on_status`, which receives
    /// the status code and the body text. A 200 whose body cannot be read is
    /// [`ClientError::RequestFailed`].
    async fn read_ok_body<F>(&self, response: reqwest::Response, on_status: F) -> Result<String>
    where
        F: FnOnce(u16, String) -> ClientError,
    {
        let status = response.status();

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(on_status(status.as_u16(), body));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = MonitorClient::new("http://localhost:8080/api/v1/", "http://localhost/token");
        assert_eq!(client.base_url(), "http://localhost:8080/api/v1");
        assert_eq!(client.auth_url(), "http://localhost/token");
    }

    #[test]
    fn test_region_urls() {
        assert_eq!(
            Region::Us.base_url(),
            "https://us.monitor.relexsolutions.com/api/v1"
        );
        assert_eq!(
            Region::Eu.auth_url(),
            "https://identity.prod-eu.prod.cc.relexsolutions.com/monitoring_api_prod/connect/token"
        );

        let client = MonitorClient::for_region(Region::Eu);
        assert_eq!(client.base_url(), "https://eu.monitor.relexsolutions.com/api/v1");
    }

    /// Serves one response that promises more body than it sends
    async fn truncated_ok_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"data\"")
                .await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_unreadable_ok_body_is_transport_error() {
        let url = truncated_ok_server().await;
        let client = MonitorClient::new(url.clone(), format!("{}/token", url));
        let response = client.client.get(&url).send().await.unwrap();

        let result = client
            .read_ok_body(response, |status, body| ClientError::Poll { status, body })
            .await;

        assert!(matches!(result, Err(ClientError::RequestFailed(_))));
    }

    #[test]
    fn test_region_from_str() {
        assert_eq!("US".parse::<Region>(), Ok(Region::Us));
        assert_eq!("emea".parse::<Region>(), Ok(Region::Eu));
        assert!("apac".parse::<Region>().is_err());
        assert_eq!(Region::default(), Region::Us);
    }
}
