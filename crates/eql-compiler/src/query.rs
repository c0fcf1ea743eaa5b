//! The executable output of code generation.

use eql_core::{DataType, ExecutionError};
use eql_table::Table;
use tracing::debug;

use crate::bytecode::{BytecodeChunk, ConstantPool};
use crate::result::ResultSet;
use crate::vm::Machine;

/// Default limit on nested method calls during execution.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Highest call depth limit a query accepts; larger requests are clamped.
pub const MAX_CALL_DEPTH_CEILING: usize = 4096;

pub(crate) fn clamp_call_depth(depth: usize) -> usize {
    depth.clamp(1, MAX_CALL_DEPTH_CEILING)
}

/// One compiled function: the main function or a class method.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    /// `Class.method`, or empty for the main function.
    pub name: String,
    /// Values popped from the caller's stack: receiver plus parameters.
    pub arity: usize,
    /// Local slots in the frame, arguments included.
    pub local_count: usize,
    pub chunk: BytecodeChunk,
}

/// Field layout of a user class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayout {
    pub name: String,
    pub fields: Vec<(String, DataType)>,
}

/// A query compiled against one table schema.
///
/// Immutable once generated, so one query may run concurrently against
/// any number of tables.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub(crate) module: String,
    pub(crate) functions: Vec<CompiledFunction>,
    pub(crate) main: Option<usize>,
    pub(crate) classes: Vec<ClassLayout>,
    pub(crate) constants: ConstantPool,
    /// Event fields read by the query, indexed by `GetEventField`.
    pub(crate) event_fields: Vec<(String, DataType)>,
    pub(crate) return_type: DataType,
    pub(crate) max_call_depth: usize,
}

impl CompiledQuery {
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Type of the values the query returns; `Void` if it returns none.
    pub fn return_type(&self) -> &DataType {
        &self.return_type
    }

    pub fn functions(&self) -> &[CompiledFunction] {
        &self.functions
    }

    pub fn classes(&self) -> &[ClassLayout] {
        &self.classes
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn event_fields(&self) -> &[(String, DataType)] {
        &self.event_fields
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Set the call depth limit, clamped to `1..=MAX_CALL_DEPTH_CEILING`.
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = clamp_call_depth(depth);
        self
    }

    /// Result columns: object id, timestamp, then the returned value or,
    /// for a class return type, one column per field.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["id".to_string(), "timestamp".to_string()];
        match self.returned_class() {
            Some(class) => columns.extend(class.fields.iter().map(|(name, _)| name.clone())),
            None => columns.push("value".to_string()),
        }
        columns
    }

    pub(crate) fn returned_class(&self) -> Option<&ClassLayout> {
        let class = self.return_type.as_class()?;
        self.classes.iter().find(|c| c.name == class.name)
    }

    /// Run the main function once per event of `table`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn execute(&self, table: &dyn Table) -> Result<ResultSet, ExecutionError> {
        let mut result = ResultSet::new(self.columns());
        if let Some(main) = self.main {
            let mut machine = Machine::new(self, table);
            for (object_id, events) in table.scan() {
                for event in events {
                    if let Some(row) = machine.run_event(main, object_id, event)? {
                        result.rows.push(row);
                    }
                }
            }
        }
        debug!(module = %self.module, table = table.name(), rows = result.rows.len(), "executed query");
        Ok(result)
    }

    /// Human-readable listing of every function's bytecode.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for function in &self.functions {
            let name = if function.name.is_empty() { "<main>" } else { &function.name };
            out.push_str(&format!("== {name} (arity {}, locals {}) ==\n", function.arity, function.local_count));
            out.push_str(&function.chunk.disassemble());
        }
        out
    }
}
