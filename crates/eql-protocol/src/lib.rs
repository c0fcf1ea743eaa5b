//! Request/response messages executed against a table.
//!
//! A request is a [`MessageHeader`] followed by a message body, both encoded
//! as MessagePack maps. [`dispatch`] reads one request, routes it to the
//! message type named by the header and writes the response.
//!
//! ```
//! use eql_protocol::{GetActionMessage, dispatch, write_request};
//! use eql_table::MemoryTable;
//!
//! let mut table = MemoryTable::new("users");
//! table.create_action("signup").unwrap();
//!
//! let mut request = Vec::new();
//! write_request(&GetActionMessage { action_id: 1 }, &mut request).unwrap();
//! let mut response = Vec::new();
//! dispatch(&mut request.as_slice(), &mut table, &mut response).unwrap();
//! assert!(!response.is_empty());
//! ```

pub mod codec;
mod dispatch;
mod error;
mod get_action;
mod header;
mod message;
mod property;
mod query;

pub use dispatch::{MAX_BODY_LENGTH, dispatch};
pub use error::ProtocolError;
pub use get_action::GetActionMessage;
pub use header::{MessageHeader, MessageKind, PROTOCOL_VERSION};
pub use message::{Message, write_request};
pub use property::{
    CreatePropertyMessage, DeletePropertyMessage, GetPropertiesMessage, GetPropertyMessage, UpdatePropertyMessage,
};
pub use query::{ErrorResponse, QUERY_MODULE, QueryMessage};
