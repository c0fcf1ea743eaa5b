//! Errors raised by table operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("invalid property name: {0}")]
    InvalidPropertyName(String),

    #[error("invalid data type: {0}")]
    InvalidDataType(String),

    #[error("property already exists: {0}")]
    PropertyExists(String),

    #[error("property not found: {0}")]
    PropertyNotFound(String),

    #[error("invalid action name: {0}")]
    InvalidActionName(String),

    #[error("action already exists: {0}")]
    ActionExists(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),
}
