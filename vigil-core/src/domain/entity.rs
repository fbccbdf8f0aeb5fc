//! Entity domain types
//!
//! Jobs and files share one shape: a name and an ordered list of events.
//! They differ only in where the API puts things, which `EntityKind` records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of entity tracked by the monitoring API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Job,
    File,
}

impl EntityKind {
    /// Endpoint sub-path under `/{customer_id}/events/`
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Job => "job",
            EntityKind::File => "file",
        }
    }

    /// Event field holding the label predicates match against
    pub fn label_field(&self) -> &'static str {
        match self {
            EntityKind::Job => "status",
            EntityKind::File => "title",
        }
    }

    /// Entity field holding the entity's name
    pub fn name_field(&self) -> &'static str {
        match self {
            EntityKind::Job => "name",
            EntityKind::File => "file",
        }
    }

    /// Query parameter used to narrow a poll to one entity
    pub fn name_param(&self) -> &'static str {
        match self {
            EntityKind::Job => "job_id",
            EntityKind::File => "file_name",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Job => "jobs",
            EntityKind::File => "files",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "job" | "jobs" => Ok(EntityKind::Job),
            "file" | "files" => Ok(EntityKind::File),
            other => Err(format!("unknown entity kind '{}' (expected job or file)", other)),
        }
    }
}

/// Single event in an entity's history
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Status (jobs) or title (files); absent if the API omitted it
    pub label: Option<String>,
    /// All fields as returned by the API
    pub fields: Map<String, Value>,
}

impl Event {
    /// Builds an event from its raw fields, reading the label `kind` uses
    pub fn from_fields(kind: EntityKind, fields: Map<String, Value>) -> Self {
        let label = fields
            .get(kind.label_field())
            .and_then(Value::as_str)
            .map(str::to_string);

        Self { label, fields }
    }
}

/// A job or file together with its event history, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub name: String,
    pub events: Vec<Event>,
}

impl Entity {
    /// Labels of all events that carry one, in order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| e.label.as_deref())
    }

    /// True if any event carries `label`
    pub fn has_label(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }

    /// Label of the most recent labelled event
    pub fn latest_label(&self) -> Option<&str> {
        self.labels().last()
    }
}
