//! Event query parameters

use chrono::{DateTime, Duration, Utc};

use super::entity::EntityKind;

/// Parameters of one events poll
///
/// Optional fields left as `None` are not sent, leaving the server's
/// defaults in charge of that dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub customer_id: String,
    pub environment: String,
    pub entity_name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl EventQuery {
    /// Creates an unbounded query for a customer environment
    pub fn new(customer_id: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            environment: environment.into(),
            entity_name: None,
            start: None,
            end: None,
        }
    }

    /// Narrows the query to a single entity
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    pub fn with_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Window covering `lookback` up to `now`
    ///
    /// Returns `None` when `now - lookback` falls outside the representable
    /// date range.
    pub fn with_lookback(self, now: DateTime<Utc>, lookback: Duration) -> Option<Self> {
        let start = now.checked_sub_signed(lookback)?;
        Some(self.with_window(start, now))
    }

    /// Validates the query
    pub fn validate(&self) -> Result<(), String> {
        if self.customer_id.is_empty() {
            return Err("customer_id cannot be empty".to_string());
        }

        if self.environment.is_empty() {
            return Err("environment cannot be empty".to_string());
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!(
                    "start_timestamp {} is after end_timestamp {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                ));
            }
        }

        Ok(())
    }

    /// Outbound query parameters for `kind`, in a stable order
    ///
    /// Timestamps are rendered as RFC 3339 (`2024-10-30T12:00:00+00:00`).
    pub fn to_query_pairs(&self, kind: EntityKind) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("env", self.environment.clone())];

        if let Some(name) = &self.entity_name {
            pairs.push((kind.name_param(), name.clone()));
        }
        if let Some(start) = self.start {
            pairs.push(("start_timestamp", start.to_rfc3339()));
        }
        if let Some(end) = self.end {
            pairs.push(("end_timestamp", end.to_rfc3339()));
        }

        pairs
    }
}
