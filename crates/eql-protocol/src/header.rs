use eql_core::SerializationError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum MessageKind {
    GetAction = 1,
    Query = 2,
    GetProperties = 3,
    GetProperty = 4,
    CreateProperty = 5,
    UpdateProperty = 6,
    DeleteProperty = 7,
}

/// Prefix of every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub version: u32,
    pub kind: u32,
    /// Byte length of the body that follows the header.
    pub length: u32,
}

impl MessageHeader {
    pub fn new(kind: MessageKind, length: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind: kind.into(),
            length,
        }
    }

    pub fn message_kind(&self) -> Result<MessageKind, SerializationError> {
        MessageKind::try_from(self.kind).map_err(|_| SerializationError::UnknownKind(self.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes() {
        assert_eq!(MessageHeader::new(MessageKind::Query, 3).kind, 2);
        assert_eq!(MessageHeader::new(MessageKind::GetAction, 0).message_kind().unwrap(), MessageKind::GetAction);
        assert_eq!(MessageHeader::new(MessageKind::DeleteProperty, 0).kind, 7);

        let unknown = MessageHeader { version: 1, kind: 99, length: 0 };
        assert!(matches!(unknown.message_kind(), Err(SerializationError::UnknownKind(99))));
    }
}
