use eql_core::SerializationError;
use thiserror::Error;

/// Failure to read, route or answer a request.
///
/// Query compile and execution errors are not protocol errors; they are
/// answered with an [`ErrorResponse`](crate::ErrorResponse).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u32),

    #[error("message body of {length} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { length: u32, limit: u32 },
}
