//! Core types shared by every stage of the EQL pipeline.
//!
//! - [`Span`]: source positions
//! - [`DataType`]: resolved types attached to syntax nodes
//! - [`Value`]: dynamically typed table and result values
//! - [`error`]: the error taxonomy from syntax errors to serialization errors

pub mod data_type;
pub mod error;
pub mod span;
pub mod value;

pub use data_type::{ClassType, DataType, EVENT_CLASS, FunctionType};
pub use error::{
    CompileError, CompileErrorCategory, CompileErrors, EqlError, ExecutionError,
    InternalCompilerError, LexError, SerializationError, SymbolKind, SyntaxError,
    SyntaxErrorKind,
};
pub use span::Span;
pub use value::Value;
