//! An in-memory [`Table`] implementation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::property::is_word_char;
use crate::{Action, DataKind, Event, Property, Schema, Table, TableError};

/// A table held entirely in memory, with objects in key order and each
/// object's events in timestamp order.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    name: String,
    schema: Schema,
    actions: Vec<Action>,
    objects: BTreeMap<String, Vec<Event>>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn create_property(
        &mut self,
        name: &str,
        data_type: DataKind,
        transient: bool,
    ) -> Result<Property, TableError> {
        let property = self.schema.add(name, data_type, transient)?.clone();
        debug!(table = %self.name, property = %property.name, id = property.id, "created property");
        Ok(property)
    }

    pub fn rename_property(&mut self, old_name: &str, new_name: &str) -> Result<Property, TableError> {
        let property = self.schema.rename(old_name, new_name)?.clone();
        debug!(table = %self.name, from = old_name, to = %property.name, "renamed property");
        Ok(property)
    }

    /// Remove a property and drop its values from every stored event.
    pub fn delete_property(&mut self, name: &str) -> Result<(), TableError> {
        let property = self.schema.remove(name)?;
        for event in self.objects.values_mut().flatten() {
            event.data.remove(&property.id);
        }
        debug!(table = %self.name, property = %property.name, id = property.id, "deleted property");
        Ok(())
    }

    /// Register an action; ids are assigned 1, 2, 3...
    pub fn create_action(&mut self, name: &str) -> Result<Action, TableError> {
        if name.is_empty() || !name.chars().all(|c| is_word_char(c) || c == '.' || c == '-') {
            return Err(TableError::InvalidActionName(name.to_string()));
        }
        if self.action_by_name(name).is_some() {
            return Err(TableError::ActionExists(name.to_string()));
        }
        let action = Action {
            id: self.actions.len() as i64 + 1,
            name: name.to_string(),
        };
        self.actions.push(action.clone());
        debug!(table = %self.name, action = %action.name, id = action.id, "created action");
        Ok(action)
    }

    /// Store `event` for `object_id`.
    ///
    /// Values are cast to their property's type. An event at a timestamp the
    /// object already has is merged into the existing one.
    pub fn insert_event(&mut self, object_id: &str, mut event: Event) -> Result<(), TableError> {
        if object_id.is_empty() {
            return Err(TableError::InvalidObjectId(object_id.to_string()));
        }
        if let Some(action_id) = event.action_id
            && self.action(action_id).is_none()
        {
            return Err(TableError::ActionNotFound(action_id.to_string()));
        }
        let mut data = BTreeMap::new();
        for (id, value) in std::mem::take(&mut event.data) {
            let property = self
                .schema
                .property_by_id(id)
                .ok_or_else(|| TableError::PropertyNotFound(id.to_string()))?;
            data.insert(id, property.cast(value));
        }
        event.data = data;

        let events = self.objects.entry(object_id.to_string()).or_default();
        match events.binary_search_by_key(&event.timestamp, |e| e.timestamp) {
            Ok(index) => events[index].merge(event),
            Err(index) => events.insert(index, event),
        }
        Ok(())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn event_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn get(&self, object_id: &str) -> Option<&[Event]> {
        self.objects.get(object_id).map(Vec::as_slice)
    }

    fn scan(&self) -> Box<dyn Iterator<Item = (&str, &[Event])> + '_> {
        Box::new(self.objects.iter().map(|(id, events)| (id.as_str(), events.as_slice())))
    }

    fn action(&self, id: i64) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    fn action_by_name(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    fn create_property(&mut self, name: &str, data_type: DataKind, transient: bool) -> Result<Property, TableError> {
        MemoryTable::create_property(self, name, data_type, transient)
    }

    fn rename_property(&mut self, old_name: &str, new_name: &str) -> Result<Property, TableError> {
        MemoryTable::rename_property(self, old_name, new_name)
    }

    fn delete_property(&mut self, name: &str) -> Result<(), TableError> {
        MemoryTable::delete_property(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eql_core::Value;

    fn table() -> MemoryTable {
        let mut table = MemoryTable::new("users");
        table.create_property("plan", DataKind::Factor, false).unwrap();
        table.create_property("price", DataKind::Float, false).unwrap();
        table.create_action("signup").unwrap();
        table
    }

    #[test]
    fn events_are_kept_in_timestamp_order() {
        let mut table = table();
        table.insert_event("u1", Event::new(30)).unwrap();
        table.insert_event("u1", Event::new(10)).unwrap();
        table.insert_event("u1", Event::new(20)).unwrap();
        let timestamps: Vec<i64> = table.get("u1").unwrap().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
    }

    #[test]
    fn objects_scan_in_key_order() {
        let mut table = table();
        table.insert_event("b", Event::new(1)).unwrap();
        table.insert_event("a", Event::new(1)).unwrap();
        let keys: Vec<&str> = table.scan().map(|(id, _)| id).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(table.object_count(), 2);
        assert_eq!(table.event_count(), 2);
    }

    #[test]
    fn values_are_cast_and_merged() {
        let mut table = table();
        table
            .insert_event("u1", Event::new(5).with_action(1).with_value(2, 3i64))
            .unwrap();
        table.insert_event("u1", Event::new(5).with_value(1, "pro")).unwrap();
        let events = table.get("u1").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get(2), Some(&Value::Float(3.0)));
        assert_eq!(events[0].get(1), Some(&Value::from("pro")));
        assert_eq!(events[0].action_id, Some(1));
    }

    #[test]
    fn insert_rejects_unknown_references() {
        let mut table = table();
        assert_eq!(
            table.insert_event("u1", Event::new(1).with_value(9, 1i64)),
            Err(TableError::PropertyNotFound("9".into()))
        );
        assert_eq!(
            table.insert_event("u1", Event::new(1).with_action(7)),
            Err(TableError::ActionNotFound("7".into()))
        );
        assert!(table.get("u1").is_none());
    }

    #[test]
    fn actions() {
        let mut table = table();
        assert_eq!(table.create_action("checkout").unwrap().id, 2);
        assert_eq!(table.action(2).unwrap().name, "checkout");
        assert_eq!(table.action_by_name("signup").unwrap().id, 1);
        assert!(table.action(3).is_none());
        assert_eq!(
            table.create_action("signup"),
            Err(TableError::ActionExists("signup".into()))
        );
    }

    #[test]
    fn delete_property_drops_values() {
        let mut table = table();
        table.insert_event("u1", Event::new(1).with_value(1, "free")).unwrap();
        table.delete_property("plan").unwrap();
        assert!(table.get("u1").unwrap()[0].data.is_empty());
        assert!(table.schema().property("plan").is_none());
    }

    #[test]
    fn schema_changes_through_the_trait() {
        let mut table = table();
        table.insert_event("u1", Event::new(1).with_value(2, 9.5)).unwrap();
        let dynamic: &mut dyn Table = &mut table;

        let renamed = dynamic.rename_property("price", "amount").unwrap();
        assert_eq!((renamed.id, renamed.name.as_str()), (2, "amount"));
        assert_eq!(dynamic.get("u1").unwrap()[0].get(2), Some(&Value::Float(9.5)));

        let created = dynamic.create_property("seen", DataKind::Boolean, true).unwrap();
        assert_eq!(created.id, -1);
        assert_eq!(
            dynamic.rename_property("plan", "seen"),
            Err(TableError::PropertyExists("seen".into()))
        );
        assert_eq!(
            dynamic.delete_property("price"),
            Err(TableError::PropertyNotFound("price".into()))
        );
        dynamic.delete_property("amount").unwrap();
        assert_eq!(dynamic.schema().len(), 2);
    }
}
