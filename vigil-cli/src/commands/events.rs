//! Events command
//!
//! One authenticated poll, printing the matching jobs or files.

use anyhow::Result;
use clap::Args;
use colored::*;
use serde_json::json;
use std::process::ExitCode;
use vigil_core::domain::entity::{Entity, EntityKind};
use vigil_core::domain::predicate::Predicate;
use vigil_watch::{EventSource, Session, WatchError};

use super::lookback_query;
use crate::config::Config;
use crate::output::print_entity;

/// Arguments of `vigil events`
#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Entity kind to list (job or file)
    pub kind: EntityKind,

    /// Only list entities with an event carrying this label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Only query events of this job or file
    #[arg(long)]
    pub name: Option<String>,

    /// Hours of history to query
    #[arg(long, default_value_t = 24)]
    pub lookback_hours: i64,

    /// Print JSON instead of a listing
    #[arg(long)]
    pub json: bool,
}

/// Handle `vigil events`
pub async fn handle_events(args: EventsArgs, config: &Config) -> Result<ExitCode> {
    let query = lookback_query(config, args.lookback_hours, args.name.clone())?;
    let predicate = match &args.label {
        Some(label) => Predicate::has_label(label),
        None => Predicate::accept_all(),
    };

    let session = Session::open(config.client(), &config.credentials, args.kind)
        .await
        .map_err(WatchError::from)?;
    let entities = session
        .fetch(&query, &predicate)
        .await
        .map_err(WatchError::from)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&entities))?);
        return Ok(ExitCode::SUCCESS);
    }

    if entities.is_empty() {
        println!("{}", format!("No {} found.", args.kind.plural()).yellow());
    } else {
        println!(
            "{}",
            format!("Found {} {} ({}):", entities.len(), noun(args.kind, entities.len()), predicate.name())
                .bold()
        );
        println!();
        for entity in &entities {
            print_entity(entity);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn noun(kind: EntityKind, count: usize) -> &'static str {
    if count == 1 { kind.path() } else { kind.plural() }
}

fn to_json(entities: &[Entity]) -> serde_json::Value {
    entities
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "labels": e.labels().collect::<Vec<_>>(),
            })
        })
        .collect()
}
