//! Schema management messages.
//!
//! Each message answers with the affected property, or with an
//! [`ErrorResponse`] when the table rejects the change.

use std::collections::BTreeMap;
use std::io::Write;

use eql_table::{DataKind, Table, TableError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec;
use crate::error::ProtocolError;
use crate::header::MessageKind;
use crate::message::Message;
use crate::query::ErrorResponse;

/// List every property of the table, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPropertiesMessage {}

/// Look up a property by name; an empty map when there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPropertyMessage {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePropertyMessage {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: DataKind,
    #[serde(default)]
    pub transient: bool,
}

/// Rename the property `name` to `new_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePropertyMessage {
    pub name: String,
    #[serde(rename = "newName")]
    pub new_name: String,
}

/// Delete a property and its stored values. Answers with an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePropertyMessage {
    pub name: String,
}

fn respond<T: Serialize>(
    table: &dyn Table,
    outcome: Result<T, TableError>,
    output: &mut impl Write,
) -> Result<(), ProtocolError> {
    match outcome {
        Ok(value) => codec::encode(output, &value)?,
        Err(error) => {
            warn!(table = table.name(), %error, "schema change rejected");
            codec::encode(output, &ErrorResponse { message: error.to_string() })?
        }
    }
    Ok(())
}

impl Message for GetPropertiesMessage {
    const KIND: MessageKind = MessageKind::GetProperties;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        let properties: Vec<_> = table.schema().iter().collect();
        codec::encode(output, &properties)?;
        Ok(())
    }
}

impl Message for GetPropertyMessage {
    const KIND: MessageKind = MessageKind::GetProperty;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        match table.schema().property(&self.name) {
            Some(property) => codec::encode(output, property)?,
            None => {
                debug!(table = table.name(), property = %self.name, "property not found");
                codec::encode(output, &BTreeMap::<String, i64>::new())?
            }
        }
        Ok(())
    }
}

impl Message for CreatePropertyMessage {
    const KIND: MessageKind = MessageKind::CreateProperty;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        let outcome = table.create_property(&self.name, self.data_type, self.transient);
        respond(table, outcome, output)
    }
}

impl Message for UpdatePropertyMessage {
    const KIND: MessageKind = MessageKind::UpdateProperty;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        let outcome = table.rename_property(&self.name, &self.new_name);
        respond(table, outcome, output)
    }
}

impl Message for DeletePropertyMessage {
    const KIND: MessageKind = MessageKind::DeleteProperty;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        let outcome = table
            .delete_property(&self.name)
            .map(|()| BTreeMap::<String, i64>::new());
        respond(table, outcome, output)
    }
}

#[cfg(test)]
mod tests {
    use eql_core::SerializationError;
    use eql_table::{MemoryTable, Property};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn table() -> MemoryTable {
        let mut table = MemoryTable::new("users");
        table.create_property("plan", DataKind::Factor, false).unwrap();
        table.create_property("age", DataKind::Integer, false).unwrap();
        table
    }

    fn respond_to<M: Message>(message: &M, table: &mut MemoryTable) -> Vec<u8> {
        let mut output = Vec::new();
        message.process(table, &mut output).unwrap();
        output
    }

    #[test]
    fn lists_properties_in_creation_order() {
        let output = respond_to(&GetPropertiesMessage {}, &mut table());
        let properties: Vec<Property> = codec::decode(&mut output.as_slice()).unwrap();
        let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["plan", "age"]);
        assert_eq!(properties[1].data_type, DataKind::Integer);
    }

    #[test]
    fn get_by_name() {
        let mut table = table();
        let output = respond_to(&GetPropertyMessage { name: "age".into() }, &mut table);
        let property: Property = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(property.id, 2);

        let output = respond_to(&GetPropertyMessage { name: "missing".into() }, &mut table);
        let map: BTreeMap<String, i64> = codec::decode(&mut output.as_slice()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn create_assigns_ids() {
        let mut table = table();
        let message = CreatePropertyMessage {
            name: "country".into(),
            data_type: DataKind::String,
            transient: true,
        };
        let output = respond_to(&message, &mut table);
        let property: Property = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!((property.id, property.transient), (-1, true));
        assert!(table.schema().property("country").is_some());

        let output = respond_to(&message, &mut table);
        let response: ErrorResponse = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(response.message, "property already exists: country");
    }

    #[test]
    fn update_renames_in_place() {
        let mut table = table();
        let message = UpdatePropertyMessage {
            name: "plan".into(),
            new_name: "tier".into(),
        };
        let output = respond_to(&message, &mut table);
        let property: Property = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!((property.id, property.name.as_str()), (1, "tier"));

        let output = respond_to(&message, &mut table);
        let response: ErrorResponse = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(response.message, "property not found: plan");
    }

    #[test]
    fn update_rejects_invalid_names() {
        let message = UpdatePropertyMessage {
            name: "plan".into(),
            new_name: "has space".into(),
        };
        let output = respond_to(&message, &mut table());
        let response: ErrorResponse = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(response.message, "invalid property name: has space");
    }

    #[test]
    fn delete_removes_the_property() {
        let mut table = table();
        let message = DeletePropertyMessage { name: "age".into() };
        let output = respond_to(&message, &mut table);
        let map: BTreeMap<String, i64> = codec::decode(&mut output.as_slice()).unwrap();
        assert!(map.is_empty());
        assert_eq!(table.schema().len(), 1);

        let output = respond_to(&message, &mut table);
        let response: ErrorResponse = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(response.message, "property not found: age");
    }

    #[test]
    fn unknown_data_type_is_malformed() {
        let bytes = codec::to_vec(&BTreeMap::from([("name", "x"), ("dataType", "decimal")])).unwrap();
        let err = CreatePropertyMessage::unpack(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SerializationError::Malformed(_)), "{err:?}");
    }

    proptest! {
        #[test]
        fn pack_unpack_round_trip(name in "[a-z_]{1,12}", new_name in "[a-z_]{1,12}", transient in any::<bool>()) {
            let create = CreatePropertyMessage { name: name.clone(), data_type: DataKind::Float, transient };
            let mut bytes = Vec::new();
            create.pack(&mut bytes).unwrap();
            prop_assert_eq!(CreatePropertyMessage::unpack(&mut bytes.as_slice()).unwrap(), create);

            let update = UpdatePropertyMessage { name, new_name };
            let mut bytes = Vec::new();
            update.pack(&mut bytes).unwrap();
            prop_assert_eq!(UpdatePropertyMessage::unpack(&mut bytes.as_slice()).unwrap(), update);
        }
    }
}
