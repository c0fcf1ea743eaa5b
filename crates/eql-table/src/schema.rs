//! Ordered property list of a table.

use serde::{Deserialize, Serialize};

use crate::{DataKind, Property, TableError};

/// The properties of a table, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    properties: Vec<Property>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_by_id(&self, id: i64) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// Add a property. Permanent properties are numbered 1, 2, 3...; transient
    /// ones -1, -2, -3... Each new id continues from the current extreme.
    pub fn add(&mut self, name: &str, data_type: DataKind, transient: bool) -> Result<&Property, TableError> {
        Property::validate_name(name)?;
        if self.property(name).is_some() {
            return Err(TableError::PropertyExists(name.to_string()));
        }
        let id = if transient {
            self.properties.iter().map(|p| p.id).min().unwrap_or(0).min(0) - 1
        } else {
            self.properties.iter().map(|p| p.id).max().unwrap_or(0).max(0) + 1
        };
        self.properties.push(Property {
            id,
            name: name.to_string(),
            data_type,
            transient,
        });
        Ok(&self.properties[self.properties.len() - 1])
    }

    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<&Property, TableError> {
        Property::validate_name(new_name)?;
        if self.property(new_name).is_some() {
            return Err(TableError::PropertyExists(new_name.to_string()));
        }
        let property = self
            .properties
            .iter_mut()
            .find(|p| p.name == old_name)
            .ok_or_else(|| TableError::PropertyNotFound(old_name.to_string()))?;
        property.name = new_name.to_string();
        Ok(property)
    }

    pub fn remove(&mut self, name: &str) -> Result<Property, TableError> {
        let index = self
            .properties
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| TableError::PropertyNotFound(name.to_string()))?;
        Ok(self.properties.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_and_transient_ids() {
        let mut schema = Schema::new();
        assert_eq!(schema.add("firstName", DataKind::String, false).unwrap().id, 1);
        assert_eq!(schema.add("lastName", DataKind::Factor, false).unwrap().id, 2);
        assert_eq!(schema.add("myNum", DataKind::Integer, true).unwrap().id, -1);
        assert_eq!(schema.add("myFloat", DataKind::Float, true).unwrap().id, -2);
        assert_eq!(schema.add("myBool", DataKind::Boolean, false).unwrap().id, 3);
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.property_by_id(-2).unwrap().name, "myFloat");
    }

    #[test]
    fn duplicate_and_invalid_names() {
        let mut schema = Schema::new();
        schema.add("prop", DataKind::Integer, false).unwrap();
        assert_eq!(
            schema.add("prop", DataKind::Float, false),
            Err(TableError::PropertyExists("prop".into()))
        );
        assert_eq!(
            schema.add("my•prop", DataKind::Integer, false),
            Err(TableError::InvalidPropertyName("my•prop".into()))
        );
    }

    #[test]
    fn rename_and_remove() {
        let mut schema = Schema::new();
        schema.add("prop", DataKind::Integer, false).unwrap();
        schema.add("prop2", DataKind::Integer, false).unwrap();

        assert_eq!(
            schema.rename("prop", "prop2"),
            Err(TableError::PropertyExists("prop2".into()))
        );
        assert_eq!(
            schema.rename("missing", "other"),
            Err(TableError::PropertyNotFound("missing".into()))
        );
        let renamed = schema.rename("prop", "prop3").unwrap();
        assert_eq!((renamed.id, renamed.name.as_str()), (1, "prop3"));

        let removed = schema.remove("prop2").unwrap();
        assert_eq!(removed.id, 2);
        assert!(schema.property("prop2").is_none());
        assert_eq!(schema.add("prop4", DataKind::Float, false).unwrap().id, 2);
    }
}
