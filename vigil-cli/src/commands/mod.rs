//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod events;
mod watch;

pub use events::EventsArgs;
pub use watch::WatchArgs;

use anyhow::Result;
use chrono::{TimeDelta, Utc};
use clap::Subcommand;
use std::process::ExitCode;
use vigil_core::domain::entity::EntityKind;
use vigil_core::domain::query::EventQuery;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Wait until every expected job or file carries the done label
    Watch(WatchArgs),
    /// Poll once and list the jobs or files matching a label
    Events(EventsArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Returns
/// The process exit code on a handled outcome, or the error that stopped the run
pub async fn handle_command(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Watch(args) => watch::handle_watch(args, config).await,
        Commands::Events(args) => events::handle_events(args, config).await,
    }
}

/// Labels marking an entity as in progress and as done
pub fn default_labels(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::Job => ("RUNNING", "COMPLETED"),
        EntityKind::File => ("File received by RELEX", "File processing finished by RELEX"),
    }
}

/// Window length for `lookback_hours`, rejecting non-positive and out-of-range values
fn lookback(lookback_hours: i64) -> Result<TimeDelta> {
    if lookback_hours <= 0 {
        anyhow::bail!("lookback must be at least one hour");
    }
    TimeDelta::try_hours(lookback_hours)
        .ok_or_else(|| anyhow::anyhow!("lookback of {} hours is out of range", lookback_hours))
}

/// Query over the last `lookback_hours`, optionally narrowed to one name
fn lookback_query(config: &Config, lookback_hours: i64, name: Option<String>) -> Result<EventQuery> {
    let window = lookback(lookback_hours)?;

    let mut query = config
        .query()
        .with_lookback(Utc::now(), window)
        .ok_or_else(|| anyhow::anyhow!("lookback of {} hours is out of range", lookback_hours))?;
    query.entity_name = name;

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_client::Region;
    use vigil_core::domain::auth::Credentials;

    fn config() -> Config {
        Config::new(
            Region::Us,
            Credentials::new("id", "secret"),
            "acme".to_string(),
            "prod".to_string(),
        )
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(default_labels(EntityKind::Job), ("RUNNING", "COMPLETED"));
        assert_eq!(
            default_labels(EntityKind::File).1,
            "File processing finished by RELEX"
        );
    }

    #[test]
    fn test_lookback_query() {
        let query = lookback_query(&config(), 24, Some("A".to_string())).unwrap();
        assert_eq!(query.entity_name.as_deref(), Some("A"));
        assert_eq!(
            query.end.unwrap() - query.start.unwrap(),
            TimeDelta::hours(24)
        );
        assert!(query.validate().is_ok());

        assert!(lookback_query(&config(), 0, None).is_err());
    }

    #[test]
    fn test_out_of_range_lookback_is_rejected() {
        // Fits a TimeDelta but reaches before the earliest representable date
        assert!(lookback_query(&config(), 10_000_000_000, None).is_err());
        // Does not fit a TimeDelta at all
        assert!(lookback_query(&config(), i64::MAX, None).is_err());
        assert!(lookback(i64::MAX).is_err());
        assert_eq!(lookback(2).unwrap(), TimeDelta::hours(2));
    }
}
