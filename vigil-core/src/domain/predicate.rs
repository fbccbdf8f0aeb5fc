//! Entity predicates
//!
//! A predicate classifies an entity by looking at its whole event history.
//! There is no implicit default: callers wanting every entity ask for
//! [`Predicate::accept_all`] by name.

use std::fmt;
use std::sync::Arc;

use super::entity::Entity;

type Check = dyn Fn(&Entity) -> bool + Send + Sync;

/// Named, cloneable pure function from an entity to a boolean
#[derive(Clone)]
pub struct Predicate {
    name: String,
    check: Arc<Check>,
}

impl Predicate {
    /// Wraps an arbitrary check under a descriptive name
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Entity) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Holds for every entity
    pub fn accept_all() -> Self {
        Self::new("accept all", |_| true)
    }

    /// Holds when any event carries `label`
    pub fn has_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let name = format!("has label '{}'", label);
        Self::new(name, move |entity| entity.has_label(&label))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, entity: &Entity) -> bool {
        (self.check)(entity)
    }

    /// Keeps the entities this predicate holds for, preserving order
    pub fn filter(&self, entities: Vec<Entity>) -> Vec<Entity> {
        entities.into_iter().filter(|e| self.evaluate(e)).collect()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}
