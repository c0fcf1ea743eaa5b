//! Table engine capability consumed by compiled EQL queries.
//!
//! Compiled queries only see the read side of the [`Table`] trait: fetch the
//! events of an object by key, iterate every object, and look up schema and
//! actions. Protocol messages also manage the schema through it.
//! [`MemoryTable`] is the in-process implementation used by the CLI and tests.

mod definition;
mod error;
mod event;
mod memory;
mod property;
mod schema;

pub use definition::{EventDefinition, PropertyDefinition, TableDefinition};
pub use error::TableError;
pub use event::{Action, Event};
pub use memory::MemoryTable;
pub use property::{DataKind, Property};
pub use schema::Schema;

/// Access to one table.
///
/// Implementations must be safe to share between threads; compiled queries
/// only ever read through this interface.
pub trait Table: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> &Schema;

    /// Events of one object in timestamp order.
    fn get(&self, object_id: &str) -> Option<&[Event]>;

    /// Every object with its events, objects in key order.
    fn scan(&self) -> Box<dyn Iterator<Item = (&str, &[Event])> + '_>;

    fn action(&self, id: i64) -> Option<&Action>;

    fn action_by_name(&self, name: &str) -> Option<&Action>;

    fn create_property(&mut self, name: &str, data_type: DataKind, transient: bool) -> Result<Property, TableError>;

    /// Rename a property; its id and stored values are kept.
    fn rename_property(&mut self, old_name: &str, new_name: &str) -> Result<Property, TableError>;

    /// Remove a property and drop its values from every stored event.
    fn delete_property(&mut self, name: &str) -> Result<(), TableError>;
}
