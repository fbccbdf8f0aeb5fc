//! Watch command
//!
//! Authenticates once, shows which expected entities are already in
//! progress, then polls until all of them carry the done label or the
//! retry budget runs out.

use anyhow::Result;
use clap::Args;
use colored::*;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use vigil_core::domain::entity::EntityKind;
use vigil_core::domain::predicate::Predicate;
use vigil_watch::{
    ConvergenceLoop, EventSource, RetryPolicy, Session, TokioClock, WatchError,
};

use super::{default_labels, lookback, lookback_query};
use crate::config::Config;
use crate::output::{ConsoleProgress, format_duration, print_names};

/// Exit code reported when the retry budget runs out
const TIMEOUT_EXIT_CODE: u8 = 2;

/// Arguments of `vigil watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Entity kind to watch (job or file)
    pub kind: EntityKind,

    /// Name expected to reach the done label (repeat for several)
    #[arg(short, long = "expect", required = true)]
    pub expected: Vec<String>,

    /// Label of in-progress entities shown before waiting
    #[arg(long)]
    pub progress_label: Option<String>,

    /// Label every expected entity must carry
    #[arg(long)]
    pub done_label: Option<String>,

    /// Only query events of this job or file
    #[arg(long)]
    pub name: Option<String>,

    /// Hours of history to query
    #[arg(long, default_value_t = 24)]
    pub lookback_hours: i64,

    /// Move the window forward with every poll instead of fixing it at start
    #[arg(long)]
    pub sliding: bool,

    /// Seconds between polls
    #[arg(long, default_value_t = 300)]
    pub interval_secs: u64,

    /// Polls allowed after the first one
    #[arg(long, default_value_t = 12)]
    pub max_retries: u32,
}

impl WatchArgs {
    fn policy(&self) -> Result<RetryPolicy> {
        if self.interval_secs == 0 {
            anyhow::bail!("poll interval must be greater than 0");
        }
        let policy = RetryPolicy::new(Duration::from_secs(self.interval_secs), self.max_retries);
        if policy.budget().is_none() {
            anyhow::bail!(
                "{} retries of {}s exceed the longest supported wait",
                self.max_retries,
                self.interval_secs
            );
        }
        Ok(policy)
    }

    fn labels(&self) -> (String, String) {
        let (progress, done) = default_labels(self.kind);
        (
            self.progress_label.clone().unwrap_or_else(|| progress.to_string()),
            self.done_label.clone().unwrap_or_else(|| done.to_string()),
        )
    }
}

/// Handle `vigil watch`
pub async fn handle_watch(args: WatchArgs, config: &Config) -> Result<ExitCode> {
    let policy = args.policy()?;
    let budget = policy.budget().unwrap_or(Duration::MAX);
    let (progress_label, done_label) = args.labels();
    let query = lookback_query(config, args.lookback_hours, args.name.clone())?;
    let plural = args.kind.plural();

    let session = Session::open(config.client(), &config.credentials, args.kind)
        .await
        .map_err(WatchError::from)?;

    // Snapshot of what is currently in progress
    let in_progress: Vec<String> = session
        .fetch(&query, &Predicate::has_label(&progress_label))
        .await
        .map_err(WatchError::from)?
        .into_iter()
        .map(|e| e.name)
        .collect();

    print_names(&format!("Expected {}", plural), &args.expected);
    print_names(
        &format!("{} with '{}'", capitalize(plural), progress_label),
        &in_progress,
    );

    println!();
    println!(
        "{}",
        format!(
            "Waiting up to {} for {} {} to reach '{}'",
            format_duration(budget),
            args.expected.len(),
            plural,
            done_label
        )
        .bold()
    );

    let mut watcher = ConvergenceLoop::new(session, TokioClock, policy);
    if args.sliding {
        watcher = watcher.with_sliding_window(lookback(args.lookback_hours)?);
    }

    let mut progress = ConsoleProgress::new(args.kind, done_label.clone());
    let outcome = watcher
        .wait_for_completion(
            &args.expected,
            &query,
            &Predicate::has_label(&done_label),
            &mut progress,
        )
        .await;
    let polls = outcome.polls();

    println!();
    match outcome.into_result() {
        Ok(_) => {
            info!(polls, "Watch converged");
            println!(
                "{}",
                format!("All {} have reached '{}'.", plural, done_label)
                    .green()
                    .bold()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(WatchError::TimeoutExceeded { polls, missing }) => {
            println!(
                "{}",
                format!(
                    "Timeout reached after {} poll(s). Not all {} have reached '{}'.",
                    polls, plural, done_label
                )
                .yellow()
                .bold()
            );
            print_names("Missing", &missing);
            Ok(ExitCode::from(TIMEOUT_EXIT_CODE))
        }
        Err(err) => Err(err.into()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use vigil_client::Region;
    use vigil_core::domain::auth::Credentials;

    fn args(kind: EntityKind) -> WatchArgs {
        WatchArgs {
            kind,
            expected: vec!["A".to_string()],
            progress_label: None,
            done_label: None,
            name: None,
            lookback_hours: 24,
            sliding: false,
            interval_secs: 300,
            max_retries: 12,
        }
    }

    #[test]
    fn test_default_policy_from_args() {
        let policy = args(EntityKind::Job).policy().unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut args = args(EntityKind::Job);
        args.interval_secs = 0;
        assert!(args.policy().is_err());
    }

    #[test]
    fn test_overflowing_budget_is_rejected() {
        let mut args = args(EntityKind::Job);
        args.interval_secs = u64::MAX / 4;
        assert!(args.policy().is_err());

        args.max_retries = 0;
        assert!(args.policy().is_ok());
    }

    #[test]
    fn test_labels_fall_back_to_kind_defaults() {
        let (progress, done) = args(EntityKind::File).labels();
        assert_eq!(progress, "File received by RELEX");
        assert_eq!(done, "File processing finished by RELEX");

        let mut custom = args(EntityKind::Job);
        custom.done_label = Some("FAILED".to_string());
        assert_eq!(custom.labels(), ("RUNNING".to_string(), "FAILED".to_string()));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("jobs"), "Jobs");
        assert_eq!(capitalize(""), "");
    }

    // =============================================================================
    // Handler against a mock monitoring API
    // =============================================================================

    fn config_for(server: &mockito::ServerGuard) -> Config {
        Config::new(
            Region::Us,
            Credentials::new("id", "secret"),
            "acme".to_string(),
            "prod".to_string(),
        )
        .with_endpoints(Some(server.url()), Some(format!("{}/token", server.url())))
    }

    fn quick_args(expected: &[&str]) -> WatchArgs {
        WatchArgs {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            interval_secs: 1,
            max_retries: 0,
            ..args(EntityKind::Job)
        }
    }

    async fn mock_token(server: &mut mockito::ServerGuard, status: usize) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .with_status(status)
            .with_body(r#"{"access_token": "tok", "token_type": "Bearer"}"#)
            .expect(1)
            .create_async()
            .await
    }

    async fn mock_events(server: &mut mockito::ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("GET", "/acme/events/job")
            .match_query(Matcher::UrlEncoded("env".into(), "prod".into()))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"name": "A", "events": [{"status": "RUNNING"}, {"status": "COMPLETED"}]},
                    {"name": "B", "events": [{"status": "RUNNING"}]}
                ]}"#,
            )
            .expect(hits)
            .create_async()
            .await
    }

    fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
        format!("{:?}", actual) == format!("{:?}", expected)
    }

    #[tokio::test]
    async fn test_watch_converged_exits_successfully() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, 200).await;
        // One informational poll, then one loop poll
        let events = mock_events(&mut server, 2).await;

        let code = handle_watch(quick_args(&["A"]), &config_for(&server))
            .await
            .unwrap();

        assert!(same_code(code, ExitCode::SUCCESS));
        token.assert_async().await;
        events.assert_async().await;
    }

    #[tokio::test]
    async fn test_watch_timeout_exits_with_timeout_code() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, 200).await;
        let events = mock_events(&mut server, 2).await;

        let code = handle_watch(quick_args(&["A", "B"]), &config_for(&server))
            .await
            .unwrap();

        assert!(same_code(code, ExitCode::from(TIMEOUT_EXIT_CODE)));
        token.assert_async().await;
        events.assert_async().await;
    }

    #[tokio::test]
    async fn test_watch_rejected_credentials_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, 401).await;
        let events = mock_events(&mut server, 0).await;

        let result = handle_watch(quick_args(&["A"]), &config_for(&server)).await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WatchError>(),
            Some(WatchError::Auth { status: 401, .. })
        ));
        token.assert_async().await;
        events.assert_async().await;
    }
}
