//! Events endpoint DTOs

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::entity::{Entity, EntityKind, Event};
use crate::error::ParseError;

/// Body of a 200 events response
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    pub data: Option<Vec<RawEntity>>,
}

/// One element of `data` as sent by the API
///
/// Jobs are named by `name` and files by `file`; both are read so the
/// caller's kind decides which one counts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub name: Option<String>,
    pub file: Option<String>,
    pub events: Option<Vec<Map<String, Value>>>,
}

impl RawEntity {
    /// Converts to the domain type, `index` locating the entry in errors
    pub fn into_entity(self, kind: EntityKind, index: usize) -> Result<Entity, ParseError> {
        let name = match kind {
            EntityKind::Job => self.name,
            EntityKind::File => self.file,
        }
        .ok_or(ParseError::MissingField {
            index,
            field: kind.name_field(),
        })?;

        let events = self
            .events
            .ok_or(ParseError::MissingField {
                index,
                field: "events",
            })?
            .into_iter()
            .map(|fields| Event::from_fields(kind, fields))
            .collect();

        Ok(Entity { kind, name, events })
    }
}

/// Decodes the entities under `data` in a 200 events body
///
/// A missing or null `data` is an error rather than an empty list: an empty
/// poll and a broken response must stay distinguishable.
pub fn parse_entities(kind: EntityKind, body: &str) -> Result<Vec<Entity>, ParseError> {
    let response: EventsResponse =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    response
        .data
        .ok_or(ParseError::MissingData)?
        .into_iter()
        .enumerate()
        .map(|(index, raw)| raw.into_entity(kind, index))
        .collect()
}
