//! Events and actions.

use std::collections::BTreeMap;

use eql_core::Value;
use serde::{Deserialize, Serialize};

/// A named kind of event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub name: String,
}

/// A state change of one object at one point in time.
///
/// `data` is keyed by property id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: i64,
    pub action_id: Option<i64>,
    pub data: BTreeMap<i64, Value>,
}

impl Event {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action_id: i64) -> Self {
        self.action_id = Some(action_id);
        self
    }

    pub fn with_value(mut self, property_id: i64, value: impl Into<Value>) -> Self {
        self.data.insert(property_id, value.into());
        self
    }

    pub fn get(&self, property_id: i64) -> Option<&Value> {
        self.data.get(&property_id)
    }

    /// Fold `other` into this event; values in `other` win.
    pub fn merge(&mut self, other: Event) {
        if other.action_id.is_some() {
            self.action_id = other.action_id;
        }
        self.data.extend(other.data);
    }
}
