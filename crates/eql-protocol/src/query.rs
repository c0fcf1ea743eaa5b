use std::io::Write;

use eql_compiler::Compiler;
use eql_core::EqlError;
use eql_table::Table;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec;
use crate::error::ProtocolError;
use crate::header::MessageKind;
use crate::message::Message;

/// Module name given to queries compiled from messages.
pub const QUERY_MODULE: &str = "query";

/// Compile `source` against the table's schema and run it over every event.
///
/// Responds with the [`ResultSet`](eql_compiler::ResultSet), or with an
/// [`ErrorResponse`] when the query fails to compile or execute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMessage {
    pub source: String,
    /// Call depth limit; the compiler default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,
}

impl QueryMessage {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            max_call_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl Message for QueryMessage {
    const KIND: MessageKind = MessageKind::Query;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        let table: &dyn Table = table;
        let mut compiler = Compiler::new();
        if let Some(depth) = self.max_call_depth {
            compiler = compiler.with_max_call_depth(depth);
        }
        let outcome = compiler
            .compile(QUERY_MODULE, &self.source, table.schema())
            .and_then(|query| query.execute(table).map_err(EqlError::from));

        match outcome {
            Ok(result) => {
                debug!(table = table.name(), rows = result.len(), "query answered");
                codec::encode(output, &result)?;
            }
            Err(error) => {
                warn!(table = table.name(), %error, "query failed");
                codec::encode(output, &ErrorResponse { message: error.to_string() })?;
            }
        }
        Ok(())
    }
}
