//! MessagePack encoding shared by headers, messages and responses.
//!
//! Structs are written as maps keyed by field name, so fields can be added
//! without breaking older readers.

use std::io::{ErrorKind, Read, Write};

use eql_core::SerializationError;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn encode<T: Serialize + ?Sized>(writer: &mut impl Write, value: &T) -> Result<(), SerializationError> {
    rmp_serde::encode::write_named(writer, value).map_err(|e| SerializationError::Encode(e.to_string()))
}

pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    encode(&mut buffer, value)?;
    Ok(buffer)
}

/// Decode one value from `reader`.
///
/// Input that ends early is [`SerializationError::Truncated`]; input that is
/// not a valid encoding of `T` is [`SerializationError::Malformed`].
pub fn decode<T: DeserializeOwned>(reader: &mut impl Read) -> Result<T, SerializationError> {
    rmp_serde::from_read(reader).map_err(decode_error)
}

fn decode_error(error: rmp_serde::decode::Error) -> SerializationError {
    use rmp_serde::decode::Error;
    match error {
        Error::InvalidMarkerRead(io) | Error::InvalidDataRead(io) => io_error(io),
        other => SerializationError::Malformed(other.to_string()),
    }
}

pub(crate) fn io_error(error: std::io::Error) -> SerializationError {
    if error.kind() == ErrorKind::UnexpectedEof {
        SerializationError::Truncated
    } else {
        SerializationError::Io(error)
    }
}
