use std::io::{Read, Write};

use eql_core::SerializationError;
use eql_table::Table;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::error::ProtocolError;
use crate::header::{MessageHeader, MessageKind};

/// A request that can be decoded, answered against a table and re-encoded.
pub trait Message: Serialize + DeserializeOwned {
    const KIND: MessageKind;

    /// Decode a message body. Builds a fresh value; nothing is modified on failure.
    fn unpack(reader: &mut impl Read) -> Result<Self, SerializationError> {
        codec::decode(reader)
    }

    fn pack(&self, writer: &mut impl Write) -> Result<(), SerializationError> {
        codec::encode(writer, self)
    }

    /// Answer the message against `table`, writing the response to `output`.
    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError>;
}

/// Write `message` as a complete request: header, then body.
pub fn write_request<M: Message>(message: &M, writer: &mut impl Write) -> Result<(), SerializationError> {
    let mut body = Vec::new();
    message.pack(&mut body)?;
    let length = u32::try_from(body.len())
        .map_err(|_| SerializationError::Encode(format!("message body of {} bytes is too long", body.len())))?;
    codec::encode(writer, &MessageHeader::new(M::KIND, length))?;
    writer.write_all(&body)?;
    Ok(())
}
