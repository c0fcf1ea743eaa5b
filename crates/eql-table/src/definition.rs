//! Serializable description of a table and its contents.
//!
//! Events name their properties and action instead of using ids, which keeps
//! hand-written fixtures readable:
//!
//! ```json
//! {
//!   "name": "users",
//!   "properties": [{ "name": "plan", "dataType": "factor" }],
//!   "actions": ["signup"],
//!   "events": [{ "object": "u1", "timestamp": 1, "action": "signup", "data": { "plan": "pro" } }]
//! }
//! ```

use std::collections::BTreeMap;

use eql_core::Value;
use serde::{Deserialize, Serialize};

use crate::{DataKind, Event, MemoryTable, Table, TableError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: DataKind,
    #[serde(default)]
    pub transient: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub object: String,
    pub timestamp: i64,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl TableDefinition {
    /// Create the described table, its schema, actions and events.
    pub fn build(&self) -> Result<MemoryTable, TableError> {
        let mut table = MemoryTable::new(&self.name);
        for property in &self.properties {
            table.create_property(&property.name, property.data_type, property.transient)?;
        }
        for action in &self.actions {
            table.create_action(action)?;
        }
        for event in &self.events {
            let mut stored = Event::new(event.timestamp);
            if let Some(name) = &event.action {
                let action = table
                    .action_by_name(name)
                    .ok_or_else(|| TableError::ActionNotFound(name.clone()))?;
                stored.action_id = Some(action.id);
            }
            for (name, value) in &event.data {
                let property = table
                    .schema()
                    .property(name)
                    .ok_or_else(|| TableError::PropertyNotFound(name.clone()))?;
                stored.data.insert(property.id, value.clone());
            }
            table.insert_event(&event.object, stored)?;
        }
        Ok(table)
    }
}
