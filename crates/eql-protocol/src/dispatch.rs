use std::io::{Read, Write};

use eql_core::SerializationError;
use eql_table::Table;
use tracing::{info, warn};

use crate::codec;
use crate::error::ProtocolError;
use crate::get_action::GetActionMessage;
use crate::header::{MessageHeader, MessageKind, PROTOCOL_VERSION};
use crate::message::Message;
use crate::property::{
    CreatePropertyMessage, DeletePropertyMessage, GetPropertiesMessage, GetPropertyMessage, UpdatePropertyMessage,
};
use crate::query::QueryMessage;

/// Largest message body accepted by [`dispatch`].
pub const MAX_BODY_LENGTH: u32 = 16 * 1024 * 1024;

/// Read one request from `reader`, answer it against `table` and write the
/// response to `writer`. Returns the kind of message that was processed.
pub fn dispatch(
    reader: &mut impl Read,
    table: &mut dyn Table,
    writer: &mut impl Write,
) -> Result<MessageKind, ProtocolError> {
    let result = read_and_process(reader, table, writer);
    match &result {
        Ok(kind) => info!(table = table.name(), ?kind, "processed message"),
        Err(error) => warn!(table = table.name(), %error, "failed to process message"),
    }
    result
}

fn read_and_process(
    reader: &mut impl Read,
    table: &mut dyn Table,
    writer: &mut impl Write,
) -> Result<MessageKind, ProtocolError> {
    let header: MessageHeader = codec::decode(reader)?;
    if header.version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(header.version));
    }
    let kind = header.message_kind()?;
    if header.length > MAX_BODY_LENGTH {
        return Err(ProtocolError::BodyTooLarge {
            length: header.length,
            limit: MAX_BODY_LENGTH,
        });
    }

    let mut body = vec![0; header.length as usize];
    reader.read_exact(&mut body).map_err(codec::io_error)?;

    match kind {
        MessageKind::GetAction => process::<GetActionMessage>(&body, table, writer)?,
        MessageKind::Query => process::<QueryMessage>(&body, table, writer)?,
        MessageKind::GetProperties => process::<GetPropertiesMessage>(&body, table, writer)?,
        MessageKind::GetProperty => process::<GetPropertyMessage>(&body, table, writer)?,
        MessageKind::CreateProperty => process::<CreatePropertyMessage>(&body, table, writer)?,
        MessageKind::UpdateProperty => process::<UpdatePropertyMessage>(&body, table, writer)?,
        MessageKind::DeleteProperty => process::<DeletePropertyMessage>(&body, table, writer)?,
    }
    Ok(kind)
}

/// Decode a whole body as `M` and answer it. Bytes left over after the
/// message make the body malformed.
fn process<M: Message>(body: &[u8], table: &mut dyn Table, writer: &mut impl Write) -> Result<(), ProtocolError> {
    let mut rest = body;
    let message = M::unpack(&mut rest)?;
    if !rest.is_empty() {
        let trailing = rest.len();
        return Err(SerializationError::Malformed(format!("{trailing} trailing bytes after message body")).into());
    }
    message.process(table, writer)
}

#[cfg(test)]
mod tests {
    use eql_table::{Action, MemoryTable, Property};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::write_request;

    fn table() -> MemoryTable {
        let mut table = MemoryTable::new("users");
        table.create_action("signup").unwrap();
        table
    }

    #[test]
    fn routes_by_kind() {
        let mut request = Vec::new();
        write_request(&GetActionMessage { action_id: 1 }, &mut request).unwrap();
        write_request(&QueryMessage::new("return 1;"), &mut request).unwrap();

        let mut table = table();
        let mut reader = request.as_slice();
        let mut output = Vec::new();
        assert_eq!(dispatch(&mut reader, &mut table, &mut output).unwrap(), MessageKind::GetAction);
        let action: Action = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(action.name, "signup");

        output.clear();
        assert_eq!(dispatch(&mut reader, &mut table, &mut output).unwrap(), MessageKind::Query);
        assert!(reader.is_empty());
    }

    #[test]
    fn schema_messages_change_the_table() {
        let mut request = Vec::new();
        let create = CreatePropertyMessage {
            name: "plan".into(),
            data_type: eql_table::DataKind::Factor,
            transient: false,
        };
        write_request(&create, &mut request).unwrap();
        write_request(&UpdatePropertyMessage { name: "plan".into(), new_name: "tier".into() }, &mut request).unwrap();
        write_request(&GetPropertiesMessage {}, &mut request).unwrap();

        let mut table = table();
        let mut reader = request.as_slice();
        let mut output = Vec::new();
        assert_eq!(dispatch(&mut reader, &mut table, &mut output).unwrap(), MessageKind::CreateProperty);
        assert_eq!(dispatch(&mut reader, &mut table, &mut output).unwrap(), MessageKind::UpdateProperty);
        output.clear();
        assert_eq!(dispatch(&mut reader, &mut table, &mut output).unwrap(), MessageKind::GetProperties);
        let properties: Vec<Property> = codec::decode(&mut output.as_slice()).unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name, "tier");
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut body = Vec::new();
        GetActionMessage { action_id: 1 }.pack(&mut body).unwrap();
        body.extend_from_slice(&[0xc0, 0xc0]);
        let mut request = Vec::new();
        codec::encode(&mut request, &MessageHeader::new(MessageKind::GetAction, body.len() as u32)).unwrap();
        request.extend_from_slice(&body);

        let mut output = Vec::new();
        let err = dispatch(&mut request.as_slice(), &mut table(), &mut output).unwrap_err();
        assert!(matches!(err, ProtocolError::Serialization(SerializationError::Malformed(_))), "{err:?}");
        assert!(output.is_empty());
    }

    #[test]
    fn unknown_kind() {
        let mut request = Vec::new();
        codec::encode(&mut request, &MessageHeader { version: PROTOCOL_VERSION, kind: 70, length: 0 }).unwrap();
        let err = dispatch(&mut request.as_slice(), &mut table(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::Serialization(SerializationError::UnknownKind(70))), "{err:?}");
    }

    #[test]
    fn version_mismatch() {
        let mut request = Vec::new();
        codec::encode(&mut request, &MessageHeader { version: 9, kind: 1, length: 0 }).unwrap();
        let err = dispatch(&mut request.as_slice(), &mut table(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedVersion(9)), "{err:?}");
    }

    #[test]
    fn short_body_is_truncated() {
        let mut request = Vec::new();
        write_request(&GetActionMessage { action_id: 1 }, &mut request).unwrap();
        request.truncate(request.len() - 1);
        let mut output = Vec::new();
        let err = dispatch(&mut request.as_slice(), &mut table(), &mut output).unwrap_err();
        assert!(matches!(err, ProtocolError::Serialization(SerializationError::Truncated)), "{err:?}");
        assert!(output.is_empty());
    }

    #[test]
    fn oversized_body_is_rejected_before_reading() {
        let mut request = Vec::new();
        let header = MessageHeader::new(MessageKind::Query, MAX_BODY_LENGTH + 1);
        codec::encode(&mut request, &header).unwrap();
        let err = dispatch(&mut request.as_slice(), &mut table(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::BodyTooLarge { .. }), "{err:?}");
    }
}
