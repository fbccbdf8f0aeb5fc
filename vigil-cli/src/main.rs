//! Vigil CLI
//!
//! Command-line interface for watching job and file processing events on
//! the monitoring API.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::Config;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_client::Region;
use vigil_core::domain::auth::Credentials;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Watch job and file processing events on the monitoring API", long_about = None)]
struct Cli {
    /// Hosting region selecting the default endpoints (us or eu)
    #[arg(long, env = "VIGIL_REGION", default_value = "us")]
    region: Region,

    /// Override the events API base URL
    #[arg(long, env = "VIGIL_BASE_URL")]
    base_url: Option<String>,

    /// Override the token endpoint URL
    #[arg(long, env = "VIGIL_AUTH_URL")]
    auth_url: Option<String>,

    /// OAuth client ID
    #[arg(long, env = "VIGIL_CLIENT_ID")]
    client_id: String,

    /// OAuth client secret
    #[arg(long, env = "VIGIL_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Customer identifier
    #[arg(long, env = "VIGIL_CUSTOMER_ID")]
    customer: String,

    /// Customer environment
    #[arg(long = "env", env = "VIGIL_ENV", default_value = "prod")]
    environment: String,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let config = Config::new(
            self.region,
            Credentials::new(self.client_id.clone(), self.client_secret.clone()),
            self.customer.clone(),
            self.environment.clone(),
        )
        .with_endpoints(self.base_url.clone(), self.auth_url.clone());

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,vigil_watch=info,vigil_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "An error occurred:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.config()?;
    info!(
        "Loaded configuration: customer={}, env={}, base_url={}",
        config.customer_id, config.environment, config.base_url
    );

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use vigil_core::domain::entity::EntityKind;

    const BASE: [&str; 7] = [
        "vigil",
        "--client-id",
        "id",
        "--client-secret",
        "secret",
        "--customer",
        "acme",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::try_parse_from(BASE.iter().chain(extra)).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch() {
        let cli = parse(&["watch", "file", "--expect", "a.csv", "-e", "b.csv", "--sliding"]);

        match &cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.kind, EntityKind::File);
                assert_eq!(args.expected, vec!["a.csv", "b.csv"]);
                assert!(args.sliding);
                assert_eq!(args.interval_secs, 300);
                assert_eq!(args.max_retries, 12);
            }
            _ => panic!("expected watch command"),
        }

        let config = cli.config().unwrap();
        assert_eq!(config.environment, "prod");
        assert_eq!(config.base_url, Region::Us.base_url());
    }

    #[test]
    fn test_watch_requires_expected_names() {
        let result = Cli::try_parse_from(BASE.iter().chain(&["watch", "job"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_events_with_region_and_override() {
        let cli = parse(&[
            "--region",
            "eu",
            "--auth-url",
            "http://localhost:9000/token",
            "events",
            "jobs",
            "--label",
            "FAILED",
        ]);

        assert_eq!(cli.region, Region::Eu);
        match &cli.command {
            Commands::Events(args) => {
                assert_eq!(args.kind, EntityKind::Job);
                assert_eq!(args.label.as_deref(), Some("FAILED"));
            }
            _ => panic!("expected events command"),
        }

        let config = cli.config().unwrap();
        assert_eq!(config.base_url, Region::Eu.base_url());
        assert_eq!(config.auth_url, "http://localhost:9000/token");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Cli::try_parse_from(BASE.iter().chain(&["events", "pipeline"]));
        assert!(result.is_err());
    }
}
